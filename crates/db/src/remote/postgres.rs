use async_trait::async_trait;
use spice_core::review::ReviewInput;
use spice_core::types::DbId;

use super::{Catalog, RemoteStore};
use crate::models::review::{Review, ReviewSummary, ReviewWithRestaurant};
use crate::repositories::{RestaurantRepo, ReviewRepo};
use crate::DbPool;

/// [`RemoteStore`] over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgRemoteStore {
    pool: DbPool,
}

impl PgRemoteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RemoteStore for PgRemoteStore {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        crate::health_check(&self.pool).await
    }

    async fn fetch_catalog(&self) -> Result<Catalog, sqlx::Error> {
        let restaurants = RestaurantRepo::list_with_ratings(&self.pool).await?;
        let offerings = RestaurantRepo::list_offerings(&self.pool).await?;
        Ok(Catalog {
            restaurants,
            offerings,
        })
    }

    async fn create_review(&self, input: &ReviewInput) -> Result<Option<Review>, sqlx::Error> {
        ReviewRepo::create_for_existing_restaurant(&self.pool, input).await
    }

    async fn reviews_for_restaurant(
        &self,
        restaurant_id: DbId,
    ) -> Result<Vec<Review>, sqlx::Error> {
        ReviewRepo::list_for_restaurant(&self.pool, restaurant_id).await
    }

    async fn reviews_by_author(
        &self,
        author: &str,
    ) -> Result<Vec<ReviewWithRestaurant>, sqlx::Error> {
        ReviewRepo::list_by_author(&self.pool, author).await
    }

    async fn review_summary(&self, restaurant_id: DbId) -> Result<ReviewSummary, sqlx::Error> {
        ReviewRepo::summary_for_restaurant(&self.pool, restaurant_id).await
    }

    async fn review_authors(&self) -> Result<Vec<String>, sqlx::Error> {
        ReviewRepo::list_authors(&self.pool).await
    }
}
