//! Storage layer: the authoritative PostgreSQL store and the local SQLite
//! mirror.
//!
//! Repositories are zero-sized structs taking a pool as their first
//! argument. The [`remote::RemoteStore`] trait wraps the PostgreSQL
//! repositories for callers that must also run against an in-memory store.

pub mod mirror;
pub mod models;
pub mod remote;
pub mod repositories;

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

pub use mirror::{open_mirror, open_mirror_in_memory, MirrorPool};

pub type DbPool = sqlx::PgPool;

/// Default wait for a remote connection before a call fails.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

/// Create a connection pool for the remote store.
///
/// `acquire_timeout` bounds how long any remote call waits for a
/// connection, so an unreachable server fails fast instead of stalling
/// requests.
pub async fn create_pool(
    options: PgConnectOptions,
    acquire_timeout: Duration,
) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(acquire_timeout)
        .connect_with(options)
        .await
}

/// Round-trip a trivial query to confirm the remote store is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending remote-store migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
