//! Repository for the remote `reviews` table.

use sqlx::PgPool;
use spice_core::review::ReviewInput;
use spice_core::types::DbId;

use crate::models::review::{Review, ReviewSummary, ReviewWithRestaurant};

/// Column list for `reviews` queries.
const COLUMNS: &str = "id, restaurant_id, author, rating, comment, created_at";

/// Provides create and read operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review if its restaurant exists, returning the new row.
    ///
    /// The existence check and the insert are one statement. Returns `None`
    /// when the restaurant does not exist.
    pub async fn create_for_existing_restaurant(
        pool: &PgPool,
        input: &ReviewInput,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (restaurant_id, author, rating, comment) \
             SELECT $1::bigint, $2::text, $3::int, $4::text \
             WHERE EXISTS (SELECT 1 FROM restaurants WHERE id = $1) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(input.restaurant_id)
            .bind(&input.author)
            .bind(input.rating)
            .bind(&input.comment)
            .fetch_optional(pool)
            .await
    }

    /// List reviews for one restaurant, newest first.
    pub async fn list_for_restaurant(
        pool: &PgPool,
        restaurant_id: DbId,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews \
             WHERE restaurant_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(restaurant_id)
            .fetch_all(pool)
            .await
    }

    /// List reviews written by `author` (case-insensitive), newest first,
    /// joined with the restaurant name.
    pub async fn list_by_author(
        pool: &PgPool,
        author: &str,
    ) -> Result<Vec<ReviewWithRestaurant>, sqlx::Error> {
        sqlx::query_as::<_, ReviewWithRestaurant>(
            "SELECT v.id, v.restaurant_id, r.name AS restaurant_name, \
                    v.author, v.rating, v.comment, v.created_at \
             FROM reviews v \
             LEFT JOIN restaurants r ON r.id = v.restaurant_id \
             WHERE lower(v.author) = lower($1) \
             ORDER BY v.created_at DESC, v.id DESC",
        )
        .bind(author)
        .fetch_all(pool)
        .await
    }

    /// Average rating and total review count for one restaurant.
    pub async fn summary_for_restaurant(
        pool: &PgPool,
        restaurant_id: DbId,
    ) -> Result<ReviewSummary, sqlx::Error> {
        sqlx::query_as::<_, ReviewSummary>(
            "SELECT $1::bigint AS restaurant_id, \
                    AVG(rating)::float8 AS avg_rating, \
                    COUNT(*) AS total_reviews \
             FROM reviews \
             WHERE restaurant_id = $1",
        )
        .bind(restaurant_id)
        .fetch_one(pool)
        .await
    }

    /// Distinct authors, one row per case-insensitive name, ordered by name.
    pub async fn list_authors(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT min(author) FROM reviews \
             WHERE btrim(author) <> '' \
             GROUP BY lower(author) \
             ORDER BY lower(author)",
        )
        .fetch_all(pool)
        .await
    }
}
