//! HTTP-level integration tests for `/performance`.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post};

#[tokio::test]
async fn summary_starts_empty() {
    let t = build_test_app().await;
    let json = body_json(get(t.app(), "/api/v1/performance").await).await;

    assert_eq!(json["data"]["total_operations"], 0);
    assert_eq!(json["data"]["slow_threshold_ms"], 100);
    assert_eq!(json["data"]["operations"], serde_json::json!({}));
    assert_eq!(json["data"]["recent_slow"], serde_json::json!([]));
}

#[tokio::test]
async fn summary_counts_operations_and_failures() {
    let t = build_test_app().await;
    get(t.app(), "/api/v1/restaurants").await;
    get(t.app(), "/api/v1/restaurants?cuisine=Cuban").await;
    get(t.app(), "/api/v1/restaurants/2/reviews").await;

    t.remote.set_available(false);
    post(t.app(), "/api/v1/sync?force=true").await;

    let json = body_json(get(t.app(), "/api/v1/performance").await).await;
    let operations = &json["data"]["operations"];

    assert_eq!(operations["search"]["count"], 2);
    assert_eq!(operations["search"]["errors"], 0);
    assert_eq!(operations["reviews_for_restaurant"]["count"], 1);
    assert_eq!(operations["review_summary"]["count"], 1);
    assert_eq!(operations["sync"]["count"], 2);
    assert_eq!(operations["sync"]["errors"], 1);
    assert_eq!(operations["sync"]["error_rate"], 50.0);
    assert!(operations["search"]["avg_ms"].is_f64());
}

#[tokio::test]
async fn reset_clears_the_summary() {
    let t = build_test_app().await;
    get(t.app(), "/api/v1/restaurants").await;

    let response = delete(t.app(), "/api/v1/performance").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get(t.app(), "/api/v1/performance").await).await;
    assert_eq!(json["data"]["total_operations"], 0);
}
