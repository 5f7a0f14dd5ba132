//! Route definitions for the `/restaurants` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::restaurants;
use crate::state::AppState;

/// Routes mounted at `/restaurants`.
///
/// ```text
/// GET    /                 -> search
/// GET    /names            -> names
/// GET    /{id}             -> get_by_id
/// GET    /{id}/reviews     -> reviews
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(restaurants::search))
        .route("/names", get(restaurants::names))
        .route("/{id}", get(restaurants::get_by_id))
        .route("/{id}/reviews", get(restaurants::reviews))
}
