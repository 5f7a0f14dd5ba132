//! Review reads and writes. These go straight to the remote store; the
//! mirror only ever sees the derived rating aggregates.

use std::sync::Arc;

use spice_core::error::CoreError;
use spice_core::review::ReviewInput;
use spice_core::types::DbId;
use spice_db::models::review::{Review, ReviewSummary, ReviewWithRestaurant};
use spice_db::remote::RemoteStore;

use crate::monitor::PerformanceMonitor;
use crate::remote_unavailable;

pub struct ReviewService {
    remote: Arc<dyn RemoteStore>,
    monitor: Arc<PerformanceMonitor>,
}

impl ReviewService {
    pub fn new(remote: Arc<dyn RemoteStore>, monitor: Arc<PerformanceMonitor>) -> Self {
        Self { remote, monitor }
    }

    /// Validate and store a review, returning its id.
    ///
    /// Invalid input is rejected before any write. A restaurant that does
    /// not exist yields `NotFound`. Write failures are not retried.
    pub async fn submit(&self, input: ReviewInput) -> Result<DbId, CoreError> {
        let input = input.into_validated()?;

        let review = self
            .monitor
            .measure("submit_review", async {
                self.remote
                    .create_review(&input)
                    .await
                    .map_err(remote_unavailable)
            })
            .await?
            .ok_or(CoreError::NotFound {
                entity: "restaurant",
                id: input.restaurant_id,
            })?;

        tracing::info!(
            review_id = review.id,
            restaurant_id = review.restaurant_id,
            rating = review.rating,
            "Review submitted",
        );
        Ok(review.id)
    }

    /// Reviews for one restaurant, newest first.
    pub async fn reviews_for(&self, restaurant_id: DbId) -> Result<Vec<Review>, CoreError> {
        self.monitor
            .measure("reviews_for_restaurant", async {
                self.remote
                    .reviews_for_restaurant(restaurant_id)
                    .await
                    .map_err(remote_unavailable)
            })
            .await
    }

    /// Reviews written by `author`, matched case-insensitively on the
    /// trimmed name. A blank author has no reviews.
    pub async fn reviews_by(&self, author: &str) -> Result<Vec<ReviewWithRestaurant>, CoreError> {
        let author = author.trim();
        if author.is_empty() {
            return Ok(Vec::new());
        }
        self.monitor
            .measure("reviews_by_author", async {
                self.remote
                    .reviews_by_author(author)
                    .await
                    .map_err(remote_unavailable)
            })
            .await
    }

    pub async fn summary_for(&self, restaurant_id: DbId) -> Result<ReviewSummary, CoreError> {
        self.monitor
            .measure("review_summary", async {
                self.remote
                    .review_summary(restaurant_id)
                    .await
                    .map_err(remote_unavailable)
            })
            .await
    }

    /// Every reviewer name, for author pickers.
    pub async fn authors(&self) -> Result<Vec<String>, CoreError> {
        self.monitor
            .measure("review_authors", async {
                self.remote.review_authors().await.map_err(remote_unavailable)
            })
            .await
    }
}
