#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use spice_catalog::monitor::PerformanceMonitor;
use spice_catalog::query::QueryService;
use spice_catalog::reviews::ReviewService;
use spice_catalog::sync::{SyncSettings, Synchronizer};
use spice_core::cache::DEFAULT_CACHE_TTL;
use spice_core::review::ReviewInput;
use spice_db::remote::{InMemoryRemoteStore, RemoteStore};
use spice_db::open_mirror_in_memory;

/// Services wired to an in-memory remote store and an in-memory mirror.
pub struct Fixture {
    pub remote: Arc<InMemoryRemoteStore>,
    pub sync: Arc<Synchronizer>,
    pub query: QueryService,
    pub reviews: ReviewService,
    pub monitor: Arc<PerformanceMonitor>,
}

pub async fn fixture() -> Fixture {
    fixture_with_settings(SyncSettings::default(), DEFAULT_CACHE_TTL).await
}

pub async fn fixture_with(sync_interval: Duration, cache_ttl: Duration) -> Fixture {
    fixture_with_settings(SyncSettings::with_interval(sync_interval), cache_ttl).await
}

pub async fn fixture_with_settings(settings: SyncSettings, cache_ttl: Duration) -> Fixture {
    let remote = Arc::new(InMemoryRemoteStore::new());
    seed_catalog(&remote);

    let mirror = open_mirror_in_memory().await.unwrap();
    let store: Arc<dyn RemoteStore> = remote.clone();
    let monitor = Arc::new(PerformanceMonitor::new());
    let sync = Arc::new(Synchronizer::new(
        Arc::clone(&store),
        mirror,
        settings,
        Arc::clone(&monitor),
    ));

    Fixture {
        query: QueryService::new(Arc::clone(&sync), cache_ttl),
        reviews: ReviewService::new(store, Arc::clone(&monitor)),
        remote,
        sync,
        monitor,
    }
}

/// Four restaurants, none of them Italian:
///
/// | id | name             | cuisine  | location        | offerings                             |
/// |----|------------------|----------|-----------------|---------------------------------------|
/// | 1  | Joe's Stone Crab | Seafood  | South Beach     | Mon Dinner $60, Tue Dinner $60        |
/// | 2  | Versailles       | Cuban    | Little Havana   | Fri Lunch $28, Sat Brunch $35         |
/// | 3  | Cote             | Korean   | Design District | Mon Lunch $35, Fri Dinner $60         |
/// | 4  | Zuma             | Japanese | Downtown        | Tue Lunch $28, Sun Brunch $45         |
///
/// Versailles is rated 4 and 5, Cote 3. The others have no reviews.
pub fn seed_catalog(store: &InMemoryRemoteStore) {
    store.upsert_restaurant(1, "Joe's Stone Crab", "Seafood", "South Beach");
    store.set_link(1, "https://www.joesstonecrab.com");
    store.add_offering(1, "Monday", "Dinner", 60);
    store.add_offering(1, "Tuesday", "Dinner", 60);

    store.upsert_restaurant(2, "Versailles", "Cuban", "Little Havana");
    store.add_offering(2, "Friday", "Lunch", 28);
    store.add_offering(2, "Saturday", "Brunch", 35);

    store.upsert_restaurant(3, "Cote", "Korean", "Design District");
    store.add_offering(3, "Monday", "Lunch", 35);
    store.add_offering(3, "Friday", "Dinner", 60);

    store.upsert_restaurant(4, "Zuma", "Japanese", "Downtown");
    store.add_offering(4, "Tuesday", "Lunch", 28);
    store.add_offering(4, "Sunday", "Brunch", 45);

    let now = chrono::Utc::now();
    store.seed_review(2, "Ana", 4, "Best croquetas", now);
    store.seed_review(2, "Ben", 5, "", now);
    store.seed_review(3, "Ana", 3, "", now);
}

pub fn review(restaurant_id: i64, author: &str, rating: i32) -> ReviewInput {
    ReviewInput {
        restaurant_id,
        author: author.to_string(),
        rating,
        comment: String::new(),
    }
}
