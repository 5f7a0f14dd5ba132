//! Restaurant and offering models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use spice_core::error::CoreError;
use spice_core::restaurant::Offering;
use spice_core::types::DbId;

/// A row from `restaurants` joined with its review aggregates.
///
/// This is the shape copied from the remote store into the mirror.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct RestaurantRow {
    pub id: DbId,
    pub name: String,
    pub cuisine: String,
    pub location: String,
    pub link: Option<String>,
    /// `None` when the restaurant has no reviews.
    pub avg_rating: Option<f64>,
    pub review_count: i64,
}

/// A row from the `offerings` table, day and time slot still as text.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct OfferingRow {
    pub restaurant_id: DbId,
    pub day: String,
    pub time_slot: String,
    pub price: i32,
}

impl OfferingRow {
    /// Parse the textual day and time slot into an [`Offering`].
    pub fn parse(&self) -> Result<Offering, CoreError> {
        Ok(Offering {
            day: self.day.parse()?,
            time_slot: self.time_slot.parse()?,
            price: self.price,
        })
    }
}

/// A mirrored restaurant together with all of its offerings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: DbId,
    pub name: String,
    pub cuisine: String,
    pub location: String,
    pub link: Option<String>,
    pub avg_rating: Option<f64>,
    pub review_count: i64,
    /// Ordered by day, then time slot.
    pub offerings: Vec<Offering>,
}

/// Id/name pair for restaurant pickers.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct RestaurantName {
    pub id: DbId,
    pub name: String,
}
