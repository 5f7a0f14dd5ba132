//! Repository for the remote `restaurants` and `offerings` tables.

use sqlx::PgPool;

use crate::models::restaurant::{OfferingRow, RestaurantRow};

/// Read access to the authoritative restaurant catalog.
pub struct RestaurantRepo;

impl RestaurantRepo {
    /// List every restaurant with its review aggregates, ordered by id.
    ///
    /// The aggregates come from one grouped join over `reviews`.
    pub async fn list_with_ratings(pool: &PgPool) -> Result<Vec<RestaurantRow>, sqlx::Error> {
        sqlx::query_as::<_, RestaurantRow>(
            "SELECT r.id, r.name, r.cuisine, r.location, r.link, \
                    AVG(v.rating)::float8 AS avg_rating, \
                    COUNT(v.id) AS review_count \
             FROM restaurants r \
             LEFT JOIN reviews v ON v.restaurant_id = r.id \
             GROUP BY r.id \
             ORDER BY r.id",
        )
        .fetch_all(pool)
        .await
    }

    /// List every offering, ordered by restaurant.
    pub async fn list_offerings(pool: &PgPool) -> Result<Vec<OfferingRow>, sqlx::Error> {
        sqlx::query_as::<_, OfferingRow>(
            "SELECT restaurant_id, day, time_slot, price \
             FROM offerings \
             ORDER BY restaurant_id, id",
        )
        .fetch_all(pool)
        .await
    }
}
