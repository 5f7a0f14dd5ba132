use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use spice_core::review::ReviewInput;
use spice_core::types::{DbId, Timestamp};

use super::{Catalog, RemoteStore};
use crate::models::restaurant::{OfferingRow, RestaurantRow};
use crate::models::review::{Review, ReviewSummary, ReviewWithRestaurant};

#[derive(Debug, Clone)]
struct StoredRestaurant {
    id: DbId,
    name: String,
    cuisine: String,
    location: String,
    link: Option<String>,
}

#[derive(Default)]
struct Tables {
    restaurants: Vec<StoredRestaurant>,
    offerings: Vec<OfferingRow>,
    reviews: Vec<Review>,
    next_review_id: DbId,
}

/// In-process [`RemoteStore`] with the same query semantics as the
/// PostgreSQL store.
///
/// While marked unavailable every call fails with
/// [`sqlx::Error::PoolTimedOut`], which is what a pool reports when the
/// server cannot be reached. A configured latency delays every call
/// before that check.
#[derive(Default)]
pub struct InMemoryRemoteStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
    latency_ms: AtomicU64,
    catalog_fetches: AtomicUsize,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a restaurant.
    pub fn upsert_restaurant(&self, id: DbId, name: &str, cuisine: &str, location: &str) {
        let mut tables = self.lock();
        tables.restaurants.retain(|r| r.id != id);
        tables.restaurants.push(StoredRestaurant {
            id,
            name: name.to_string(),
            cuisine: cuisine.to_string(),
            location: location.to_string(),
            link: None,
        });
        tables.restaurants.sort_by_key(|r| r.id);
    }

    /// Set the menu link of an existing restaurant.
    pub fn set_link(&self, id: DbId, link: &str) {
        let mut tables = self.lock();
        if let Some(r) = tables.restaurants.iter_mut().find(|r| r.id == id) {
            r.link = Some(link.to_string());
        }
    }

    /// Remove a restaurant and its offerings. Its reviews stay.
    pub fn remove_restaurant(&self, id: DbId) {
        let mut tables = self.lock();
        tables.restaurants.retain(|r| r.id != id);
        tables.offerings.retain(|o| o.restaurant_id != id);
    }

    /// Add an offering. Day and time slot are stored verbatim.
    pub fn add_offering(&self, restaurant_id: DbId, day: &str, time_slot: &str, price: i32) {
        self.lock().offerings.push(OfferingRow {
            restaurant_id,
            day: day.to_string(),
            time_slot: time_slot.to_string(),
            price,
        });
    }

    /// Insert a review with an explicit timestamp, bypassing the
    /// restaurant-existence check.
    pub fn seed_review(
        &self,
        restaurant_id: DbId,
        author: &str,
        rating: i32,
        comment: &str,
        created_at: Timestamp,
    ) -> DbId {
        let mut tables = self.lock();
        tables.next_review_id += 1;
        let id = tables.next_review_id;
        tables.reviews.push(Review {
            id,
            restaurant_id,
            author: author.to_string(),
            rating,
            comment: comment.to_string(),
            created_at,
        });
        id
    }

    /// Number of successful `fetch_catalog` calls so far.
    pub fn catalog_fetches(&self) -> usize {
        self.catalog_fetches.load(Ordering::SeqCst)
    }

    pub fn review_count(&self) -> usize {
        self.lock().reviews.len()
    }

    /// Make every subsequent call fail (`false`) or succeed again (`true`).
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Delay every subsequent call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn check_available(&self) -> Result<(), sqlx::Error> {
        let latency = Duration::from_millis(self.latency_ms.load(Ordering::SeqCst));
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }
}

fn newest_first(a: &Review, b: &Review) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

fn average(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / ratings.len() as f64)
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        self.check_available().await
    }

    async fn fetch_catalog(&self) -> Result<Catalog, sqlx::Error> {
        self.check_available().await?;
        self.catalog_fetches.fetch_add(1, Ordering::SeqCst);
        let tables = self.lock();

        let restaurants = tables
            .restaurants
            .iter()
            .map(|r| {
                let ratings: Vec<i32> = tables
                    .reviews
                    .iter()
                    .filter(|v| v.restaurant_id == r.id)
                    .map(|v| v.rating)
                    .collect();
                RestaurantRow {
                    id: r.id,
                    name: r.name.clone(),
                    cuisine: r.cuisine.clone(),
                    location: r.location.clone(),
                    link: r.link.clone(),
                    avg_rating: average(&ratings),
                    review_count: ratings.len() as i64,
                }
            })
            .collect();

        let mut offerings = tables.offerings.clone();
        offerings.sort_by_key(|o| o.restaurant_id);

        Ok(Catalog {
            restaurants,
            offerings,
        })
    }

    async fn create_review(&self, input: &ReviewInput) -> Result<Option<Review>, sqlx::Error> {
        self.check_available().await?;
        let mut tables = self.lock();

        if !tables.restaurants.iter().any(|r| r.id == input.restaurant_id) {
            return Ok(None);
        }

        tables.next_review_id += 1;
        let review = Review {
            id: tables.next_review_id,
            restaurant_id: input.restaurant_id,
            author: input.author.clone(),
            rating: input.rating,
            comment: input.comment.clone(),
            created_at: Utc::now(),
        };
        tables.reviews.push(review.clone());
        Ok(Some(review))
    }

    async fn reviews_for_restaurant(
        &self,
        restaurant_id: DbId,
    ) -> Result<Vec<Review>, sqlx::Error> {
        self.check_available().await?;
        let mut reviews: Vec<Review> = self
            .lock()
            .reviews
            .iter()
            .filter(|v| v.restaurant_id == restaurant_id)
            .cloned()
            .collect();
        reviews.sort_by(newest_first);
        Ok(reviews)
    }

    async fn reviews_by_author(
        &self,
        author: &str,
    ) -> Result<Vec<ReviewWithRestaurant>, sqlx::Error> {
        self.check_available().await?;
        let tables = self.lock();
        let needle = author.to_lowercase();

        let mut reviews: Vec<Review> = tables
            .reviews
            .iter()
            .filter(|v| v.author.to_lowercase() == needle)
            .cloned()
            .collect();
        reviews.sort_by(newest_first);

        Ok(reviews
            .into_iter()
            .map(|v| ReviewWithRestaurant {
                restaurant_name: tables
                    .restaurants
                    .iter()
                    .find(|r| r.id == v.restaurant_id)
                    .map(|r| r.name.clone()),
                id: v.id,
                restaurant_id: v.restaurant_id,
                author: v.author,
                rating: v.rating,
                comment: v.comment,
                created_at: v.created_at,
            })
            .collect())
    }

    async fn review_summary(&self, restaurant_id: DbId) -> Result<ReviewSummary, sqlx::Error> {
        self.check_available().await?;
        let ratings: Vec<i32> = self
            .lock()
            .reviews
            .iter()
            .filter(|v| v.restaurant_id == restaurant_id)
            .map(|v| v.rating)
            .collect();

        Ok(ReviewSummary {
            restaurant_id,
            avg_rating: average(&ratings),
            total_reviews: ratings.len() as i64,
        })
    }

    async fn review_authors(&self) -> Result<Vec<String>, sqlx::Error> {
        self.check_available().await?;
        let mut authors: BTreeMap<String, String> = BTreeMap::new();
        for review in &self.lock().reviews {
            if review.author.trim().is_empty() {
                continue;
            }
            authors
                .entry(review.author.to_lowercase())
                .and_modify(|kept| {
                    if review.author < *kept {
                        kept.clone_from(&review.author);
                    }
                })
                .or_insert_with(|| review.author.clone());
        }
        Ok(authors.into_values().collect())
    }
}
