//! Review entity model and aggregates.

use serde::Serialize;
use sqlx::FromRow;
use spice_core::types::{DbId, Timestamp};

/// A row from the `reviews` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub restaurant_id: DbId,
    pub author: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: Timestamp,
}

/// A review joined with the name of the restaurant it refers to.
///
/// `restaurant_name` is `None` when the restaurant has since been removed
/// from the catalog.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ReviewWithRestaurant {
    pub id: DbId,
    pub restaurant_id: DbId,
    pub restaurant_name: Option<String>,
    pub author: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: Timestamp,
}

/// Average rating and review count for one restaurant.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ReviewSummary {
    pub restaurant_id: DbId,
    pub avg_rating: Option<f64>,
    pub total_reviews: i64,
}
