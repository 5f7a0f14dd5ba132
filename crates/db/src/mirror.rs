//! Local mirror database (SQLite).
//!
//! The mirror is disposable: its schema is created idempotently on open and
//! its content is replaced wholesale by the synchronizer. It holds
//! restaurants, their offerings, and the derived rating aggregates. Review
//! rows never land here.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub type MirrorPool = sqlx::SqlitePool;

/// Bumped whenever the mirror layout changes. A file with another version
/// is dropped and rebuilt on the next sync.
const MIRROR_SCHEMA_VERSION: i64 = 2;

const DROP_MIRROR_SCHEMA: &str = "
DROP TABLE IF EXISTS mirror_offerings;
DROP TABLE IF EXISTS mirror_restaurants;
DROP TABLE IF EXISTS mirror_sync_state;
";

/// Mirror schema. Every filterable column is indexed.
const MIRROR_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS mirror_restaurants (
    id            INTEGER PRIMARY KEY,
    name          TEXT    NOT NULL,
    name_folded   TEXT    NOT NULL,
    name_sort     TEXT    NOT NULL,
    cuisine       TEXT    NOT NULL,
    location      TEXT    NOT NULL,
    link          TEXT,
    avg_rating    REAL,
    review_count  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS mirror_offerings (
    restaurant_id  INTEGER NOT NULL,
    day            TEXT    NOT NULL,
    day_order      INTEGER NOT NULL,
    time_slot      TEXT    NOT NULL,
    slot_order     INTEGER NOT NULL,
    price          INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS mirror_sync_state (
    id           INTEGER PRIMARY KEY CHECK (id = 1),
    synced_at    TEXT    NOT NULL,
    restaurants  INTEGER NOT NULL,
    offerings    INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_mirror_restaurants_name
    ON mirror_restaurants (name_folded);
CREATE INDEX IF NOT EXISTS idx_mirror_restaurants_name_sort
    ON mirror_restaurants (name_sort);
CREATE INDEX IF NOT EXISTS idx_mirror_restaurants_cuisine
    ON mirror_restaurants (cuisine);
CREATE INDEX IF NOT EXISTS idx_mirror_restaurants_location
    ON mirror_restaurants (location);
CREATE INDEX IF NOT EXISTS idx_mirror_restaurants_rating
    ON mirror_restaurants (avg_rating);
CREATE INDEX IF NOT EXISTS idx_mirror_offerings_restaurant
    ON mirror_offerings (restaurant_id, day, time_slot, price);
CREATE INDEX IF NOT EXISTS idx_mirror_offerings_day
    ON mirror_offerings (day);
CREATE INDEX IF NOT EXISTS idx_mirror_offerings_time_slot
    ON mirror_offerings (time_slot);
CREATE INDEX IF NOT EXISTS idx_mirror_offerings_price
    ON mirror_offerings (price);
";

/// Open (creating if needed) the mirror file at `path` and ensure its schema.
pub async fn open_mirror(path: &Path) -> Result<MirrorPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    tracing::debug!(path = %path.display(), "Mirror database opened");
    Ok(pool)
}

/// Open a private in-memory mirror.
///
/// Limited to one connection that is never recycled, since every SQLite
/// in-memory connection is its own database.
pub async fn open_mirror_in_memory() -> Result<MirrorPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Create mirror tables and indexes if they do not exist.
///
/// A mirror written by an older layout is discarded first, including its
/// sync state, so the next search rebuilds it.
pub async fn init_schema(pool: &MirrorPool) -> Result<(), sqlx::Error> {
    let (version,): (i64,) = sqlx::query_as("PRAGMA user_version").fetch_one(pool).await?;
    if version != MIRROR_SCHEMA_VERSION {
        if version != 0 {
            tracing::info!(
                found = version,
                expected = MIRROR_SCHEMA_VERSION,
                "Mirror layout changed, rebuilding",
            );
        }
        sqlx::raw_sql(DROP_MIRROR_SCHEMA).execute(pool).await?;
    }

    sqlx::raw_sql(MIRROR_SCHEMA).execute(pool).await?;
    sqlx::raw_sql(&format!("PRAGMA user_version = {MIRROR_SCHEMA_VERSION}"))
        .execute(pool)
        .await?;
    Ok(())
}
