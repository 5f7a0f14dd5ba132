//! Repository for the local mirror tables.
//!
//! Every read is a single statement: filter predicates are pushed into SQL
//! and each restaurant's offerings are gathered with a JSON aggregate in the
//! same query.

use std::collections::BTreeMap;

use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use spice_core::filter::{FilterField, FilterSpec, SortKey};
use spice_core::restaurant::{sort_offerings, Offering};
use spice_core::text::{fold_case, sort_key};
use spice_core::types::{DbId, Timestamp};

use crate::models::restaurant::{Restaurant, RestaurantName, RestaurantRow};
use crate::models::sync_state::SyncState;

/// Rows per multi-row INSERT during a snapshot load.
const INSERT_CHUNK: usize = 500;

/// Restaurant columns plus an `offerings_json` array for each row.
const RESTAURANT_SELECT: &str = "\
    SELECT r.id, r.name, r.cuisine, r.location, r.link, r.avg_rating, r.review_count, \
           (SELECT json_group_array(json_object( \
                       'day', o.day, 'time_slot', o.time_slot, 'price', o.price)) \
            FROM mirror_offerings o \
            WHERE o.restaurant_id = r.id) AS offerings_json \
    FROM mirror_restaurants r";

/// Every filterable field's distinct values in one compound statement.
///
/// `ord` orders days and time slots by their display position and prices
/// numerically. Text fields are re-sorted by [`sort_key`] after loading.
const DISTINCT_VALUES: &str = "\
    SELECT field, value FROM ( \
        SELECT 'name' AS field, name AS value, 0 AS ord \
            FROM mirror_restaurants WHERE trim(name) <> '' \
        UNION SELECT 'cuisine', cuisine, 0 \
            FROM mirror_restaurants WHERE trim(cuisine) <> '' \
        UNION SELECT 'location', location, 0 \
            FROM mirror_restaurants WHERE trim(location) <> '' \
        UNION SELECT 'day', day, day_order FROM mirror_offerings \
        UNION SELECT 'time', time_slot, slot_order FROM mirror_offerings \
        UNION SELECT 'price', CAST(price AS TEXT), price FROM mirror_offerings \
    ) \
    ORDER BY field, ord, value";

#[derive(FromRow)]
struct RestaurantJsonRow {
    id: DbId,
    name: String,
    cuisine: String,
    location: String,
    link: Option<String>,
    avg_rating: Option<f64>,
    review_count: i64,
    offerings_json: String,
}

impl RestaurantJsonRow {
    fn into_restaurant(self) -> Result<Restaurant, sqlx::Error> {
        let mut offerings: Vec<Offering> = serde_json::from_str(&self.offerings_json)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        sort_offerings(&mut offerings);

        Ok(Restaurant {
            id: self.id,
            name: self.name,
            cuisine: self.cuisine,
            location: self.location,
            link: self.link,
            avg_rating: self.avg_rating,
            review_count: self.review_count,
            offerings,
        })
    }
}

/// Provides snapshot replacement and filtered reads for the mirror.
pub struct MirrorRepo;

impl MirrorRepo {
    /// Replace the entire mirror content with a new snapshot.
    ///
    /// Runs in one transaction: on any error the previous snapshot stays in
    /// place. Returns the number of rows loaded (restaurants plus offerings).
    pub async fn replace_snapshot(
        pool: &SqlitePool,
        restaurants: &[RestaurantRow],
        offerings: &[(DbId, Offering)],
        synced_at: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM mirror_offerings")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM mirror_restaurants")
            .execute(&mut *tx)
            .await?;

        let mut rows_copied: u64 = 0;

        for chunk in restaurants.chunks(INSERT_CHUNK) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO mirror_restaurants \
                    (id, name, name_folded, name_sort, cuisine, location, link, \
                     avg_rating, review_count) ",
            );
            qb.push_values(chunk, |mut row, r| {
                row.push_bind(r.id)
                    .push_bind(r.name.clone())
                    .push_bind(fold_case(&r.name))
                    .push_bind(sort_key(&r.name))
                    .push_bind(r.cuisine.clone())
                    .push_bind(r.location.clone())
                    .push_bind(r.link.clone())
                    .push_bind(r.avg_rating)
                    .push_bind(r.review_count);
            });
            rows_copied += qb.build().execute(&mut *tx).await?.rows_affected();
        }

        for chunk in offerings.chunks(INSERT_CHUNK) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO mirror_offerings \
                    (restaurant_id, day, day_order, time_slot, slot_order, price) ",
            );
            qb.push_values(chunk, |mut row, (restaurant_id, o)| {
                row.push_bind(*restaurant_id)
                    .push_bind(o.day.as_str())
                    .push_bind(o.day.ordinal())
                    .push_bind(o.time_slot.as_str())
                    .push_bind(o.time_slot.ordinal())
                    .push_bind(o.price);
            });
            rows_copied += qb.build().execute(&mut *tx).await?.rows_affected();
        }

        sqlx::query(
            "INSERT OR REPLACE INTO mirror_sync_state (id, synced_at, restaurants, offerings) \
             VALUES (1, ?, ?, ?)",
        )
        .bind(synced_at)
        .bind(restaurants.len() as i64)
        .bind(offerings.len() as i64)
        .execute(&mut *tx)
        .await?;

        // Refresh planner statistics for the filter indexes.
        sqlx::query("ANALYZE").execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(rows_copied)
    }

    /// The state recorded by the last successful snapshot, if any.
    pub async fn sync_state(pool: &SqlitePool) -> Result<Option<SyncState>, sqlx::Error> {
        sqlx::query_as::<_, SyncState>(
            "SELECT synced_at, restaurants, offerings FROM mirror_sync_state WHERE id = 1",
        )
        .fetch_optional(pool)
        .await
    }

    /// Restaurants matching every predicate in `spec`, in one query.
    ///
    /// The name matches as a case-insensitive substring of the folded name.
    /// Day, time slot and price bounds must all hold on the same offering.
    pub async fn search(
        pool: &SqlitePool,
        spec: &FilterSpec,
    ) -> Result<Vec<Restaurant>, sqlx::Error> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(RESTAURANT_SELECT);
        qb.push(" WHERE 1 = 1");

        if let Some(name) = &spec.name {
            qb.push(" AND r.name_folded LIKE ")
                .push_bind(like_pattern(&fold_case(name)))
                .push(" ESCAPE '\\'");
        }
        push_in_list(&mut qb, "r.cuisine", &spec.cuisines);
        push_in_list(&mut qb, "r.location", &spec.locations);
        if let Some(min_rating) = spec.min_rating {
            qb.push(" AND r.avg_rating >= ").push_bind(min_rating);
        }

        if spec.constrains_offerings() {
            qb.push(
                " AND EXISTS (SELECT 1 FROM mirror_offerings f WHERE f.restaurant_id = r.id",
            );
            if let Some(day) = spec.day {
                qb.push(" AND f.day = ").push_bind(day.as_str());
            }
            if let Some(slot) = spec.time_slot {
                qb.push(" AND f.time_slot = ").push_bind(slot.as_str());
            }
            if let Some(min_price) = spec.min_price {
                qb.push(" AND f.price >= ").push_bind(min_price);
            }
            if let Some(max_price) = spec.max_price {
                qb.push(" AND f.price <= ").push_bind(max_price);
            }
            qb.push(")");
        }

        qb.push(match spec.sort {
            SortKey::Id => " ORDER BY r.id",
            SortKey::Name => " ORDER BY r.name_sort, r.id",
            SortKey::Rating => " ORDER BY r.avg_rating IS NULL, r.avg_rating DESC, r.id",
        });

        qb.build_query_as::<RestaurantJsonRow>()
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(RestaurantJsonRow::into_restaurant)
            .collect()
    }

    /// Find one mirrored restaurant by id.
    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<Restaurant>, sqlx::Error> {
        let query = format!("{RESTAURANT_SELECT} WHERE r.id = ?");
        sqlx::query_as::<_, RestaurantJsonRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(RestaurantJsonRow::into_restaurant)
            .transpose()
    }

    /// Id/name pairs ordered by name, for restaurant pickers.
    pub async fn list_names(pool: &SqlitePool) -> Result<Vec<RestaurantName>, sqlx::Error> {
        sqlx::query_as::<_, RestaurantName>(
            "SELECT id, name FROM mirror_restaurants \
             WHERE trim(name) <> '' \
             ORDER BY name_sort, id",
        )
        .fetch_all(pool)
        .await
    }

    /// Distinct values of every filterable field, computed in one statement.
    ///
    /// Every field has an entry, empty when the mirror has no values for it.
    pub async fn distinct_values(
        pool: &SqlitePool,
    ) -> Result<BTreeMap<FilterField, Vec<String>>, sqlx::Error> {
        let rows: Vec<(String, String)> = sqlx::query_as(DISTINCT_VALUES).fetch_all(pool).await?;

        let mut values: BTreeMap<FilterField, Vec<String>> = FilterField::ALL
            .into_iter()
            .map(|field| (field, Vec::new()))
            .collect();

        for (field, value) in rows {
            let field: FilterField = field
                .parse()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
            values.entry(field).or_default().push(value);
        }

        for field in [FilterField::Name, FilterField::Cuisine, FilterField::Location] {
            if let Some(text) = values.get_mut(&field) {
                text.sort_by_cached_key(|value| (sort_key(value), value.clone()));
            }
        }

        Ok(values)
    }
}

/// Build a `LIKE` pattern matching `needle` anywhere, escaping wildcards.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_in_list(qb: &mut QueryBuilder<Sqlite>, column: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    qb.push(format!(" AND {column} IN ("));
    let mut list = qb.separated(", ");
    for value in values {
        list.push_bind(value.clone());
    }
    list.push_unseparated(")");
}
