use axum::routing::get;
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
///
/// ```text
/// GET    /?author=NAME     -> list_by_author
/// POST   /                 -> create
/// GET    /authors          -> authors
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reviews::list_by_author).post(reviews::create))
        .route("/authors", get(reviews::authors))
}
