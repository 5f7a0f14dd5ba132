//! HTTP-level integration tests for `/reviews`.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json};
use serde_json::json;

#[tokio::test]
async fn submit_review_returns_201_with_id() {
    let t = build_test_app().await;
    let response = post_json(
        t.app(),
        "/api/v1/reviews",
        json!({ "restaurant_id": 1, "author": "Remi", "rating": 5, "comment": "Stone crabs!" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["data"]["id"].is_i64());
    assert_eq!(t.remote.review_count(), 3);
}

#[tokio::test]
async fn comment_is_optional() {
    let t = build_test_app().await;
    let response = post_json(
        t.app(),
        "/api/v1/reviews",
        json!({ "restaurant_id": 3, "author": "Remi", "rating": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let t = build_test_app().await;
    for rating in [0, 6] {
        let response = post_json(
            t.app(),
            "/api/v1/reviews",
            json!({ "restaurant_id": 1, "author": "Remi", "rating": rating }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
    assert_eq!(t.remote.review_count(), 2);
}

#[tokio::test]
async fn review_for_unknown_restaurant_is_404() {
    let t = build_test_app().await;
    let response = post_json(
        t.app(),
        "/api/v1/reviews",
        json!({ "restaurant_id": 77, "author": "Remi", "rating": 4 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let t = build_test_app().await;
    let response = post_json(t.app(), "/api/v1/reviews", json!({ "author": "Remi" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn write_failure_is_503() {
    let t = build_test_app().await;
    t.remote.set_available(false);
    let response = post_json(
        t.app(),
        "/api/v1/reviews",
        json!({ "restaurant_id": 1, "author": "Remi", "rating": 4 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "REMOTE_UNAVAILABLE");
}

#[tokio::test]
async fn reviews_by_author_include_restaurant_name() {
    let t = build_test_app().await;
    let json = body_json(get(t.app(), "/api/v1/reviews?author=ana").await).await;
    let data = json["data"].as_array().expect("data should be an array");

    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["restaurant_name"], "Versailles");
    assert_eq!(data[0]["comment"], "Best croquetas");
}

#[tokio::test]
async fn missing_author_returns_empty_list() {
    let t = build_test_app().await;
    let json = body_json(get(t.app(), "/api/v1/reviews").await).await;
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn authors_lists_every_reviewer() {
    let t = build_test_app().await;
    post_json(
        t.app(),
        "/api/v1/reviews",
        json!({ "restaurant_id": 1, "author": "ana", "rating": 3 }),
    )
    .await;

    let json = body_json(get(t.app(), "/api/v1/reviews/authors").await).await;
    assert_eq!(json["data"], json!(["Ana", "Ben"]));
}
