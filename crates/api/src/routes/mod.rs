pub mod health;
pub mod restaurants;
pub mod reviews;

use axum::routing::get;
use axum::Router;

use crate::handlers::{filters, performance, sync};
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /restaurants                      search (query-string filter)
/// /restaurants/names                id/name picker list
/// /restaurants/{id}                 one restaurant with offerings
/// /restaurants/{id}/reviews         reviews + summary
///
/// /reviews                          submit (POST), list by author (GET)
/// /reviews/authors                  every reviewer name
///
/// /filters                          distinct values per field
///
/// /sync                             status (GET), refresh (POST)
///
/// /performance                      timing summary (GET), reset (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/restaurants", restaurants::router())
        .nest("/reviews", reviews::router())
        .route("/filters", get(filters::distinct_values))
        .route("/sync", get(sync::status).post(sync::trigger))
        .route(
            "/performance",
            get(performance::summary).delete(performance::reset),
        )
}
