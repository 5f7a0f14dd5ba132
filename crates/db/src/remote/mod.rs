//! The authoritative store as seen by the synchronizer and review service.
//!
//! [`PgRemoteStore`] is the production implementation over the PostgreSQL
//! repositories. With the `test-support` feature, `InMemoryRemoteStore`
//! holds the same data in process and can be made slow or unavailable; it
//! backs tests that should not need a database server.

#[cfg(any(test, feature = "test-support"))]
mod memory;
mod postgres;

use async_trait::async_trait;
use spice_core::review::ReviewInput;
use spice_core::types::DbId;

use crate::models::restaurant::{OfferingRow, RestaurantRow};
use crate::models::review::{Review, ReviewSummary, ReviewWithRestaurant};

#[cfg(any(test, feature = "test-support"))]
pub use memory::InMemoryRemoteStore;
pub use postgres::PgRemoteStore;

/// The full restaurant catalog as fetched for a mirror rebuild.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub restaurants: Vec<RestaurantRow>,
    pub offerings: Vec<OfferingRow>,
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Confirm the store is reachable.
    async fn ping(&self) -> Result<(), sqlx::Error>;

    /// Fetch every restaurant (with rating aggregates) and every offering.
    async fn fetch_catalog(&self) -> Result<Catalog, sqlx::Error>;

    /// Insert a review if its restaurant exists. `None` means it does not.
    async fn create_review(&self, input: &ReviewInput) -> Result<Option<Review>, sqlx::Error>;

    /// Reviews for one restaurant, newest first.
    async fn reviews_for_restaurant(&self, restaurant_id: DbId)
        -> Result<Vec<Review>, sqlx::Error>;

    /// Reviews whose author matches case-insensitively, newest first.
    async fn reviews_by_author(&self, author: &str)
        -> Result<Vec<ReviewWithRestaurant>, sqlx::Error>;

    /// Average rating and review count for one restaurant.
    async fn review_summary(&self, restaurant_id: DbId) -> Result<ReviewSummary, sqlx::Error>;

    /// Every distinct review author, one spelling per case-insensitive
    /// name, ordered by name.
    async fn review_authors(&self) -> Result<Vec<String>, sqlx::Error>;
}
