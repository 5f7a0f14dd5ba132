#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use spice_api::config::ServerConfig;
use spice_api::router::build_app_router;
use spice_api::state::AppState;
use spice_catalog::sync::SyncSettings;
use spice_db::open_mirror_in_memory;
use spice_db::remote::{InMemoryRemoteStore, RemoteStore};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// The application router plus a handle on its in-memory remote store.
pub struct TestApp {
    pub router: Router,
    pub remote: Arc<InMemoryRemoteStore>,
}

impl TestApp {
    /// A fresh router sharing this app's state.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application with the production middleware stack over a
/// seeded in-memory remote store and an in-memory mirror.
pub async fn build_test_app() -> TestApp {
    build_test_app_with(SyncSettings::default()).await
}

pub async fn build_test_app_with(sync_settings: SyncSettings) -> TestApp {
    let remote = Arc::new(InMemoryRemoteStore::new());
    seed_catalog(&remote);

    let mirror = open_mirror_in_memory().await.unwrap();
    let store: Arc<dyn RemoteStore> = remote.clone();
    let config = test_config();
    let state = AppState::new(
        config.clone(),
        store,
        mirror,
        sync_settings,
        Duration::from_secs(300),
    );

    TestApp {
        router: build_app_router(state, &config),
        remote,
    }
}

/// Joe's Stone Crab (1), Versailles (2, rated 4 and 5), Cote (3).
pub fn seed_catalog(store: &InMemoryRemoteStore) {
    store.upsert_restaurant(1, "Joe's Stone Crab", "Seafood", "South Beach");
    store.add_offering(1, "Monday", "Dinner", 60);
    store.add_offering(1, "Tuesday", "Dinner", 60);

    store.upsert_restaurant(2, "Versailles", "Cuban", "Little Havana");
    store.add_offering(2, "Friday", "Lunch", 28);

    store.upsert_restaurant(3, "Cote", "Korean", "Design District");
    store.add_offering(3, "Friday", "Dinner", 60);

    let now = chrono::Utc::now();
    store.seed_review(2, "Ana", 4, "Best croquetas", now);
    store.seed_review(2, "Ben", 5, "", now);
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
