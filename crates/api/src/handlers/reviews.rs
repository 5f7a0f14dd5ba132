//! Handlers for the `/reviews` resource.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use spice_core::review::ReviewInput;
use spice_core::types::DbId;
use spice_db::models::review::ReviewWithRestaurant;

use crate::error::AppResult;
use crate::query::AuthorParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedReview {
    pub id: DbId,
}

/// POST /api/v1/reviews
pub async fn create(
    State(state): State<AppState>,
    input: Result<Json<ReviewInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedReview>>)> {
    let Json(input) = input?;
    let id = state.reviews.submit(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedReview { id },
        }),
    ))
}

/// GET /api/v1/reviews?author=NAME
pub async fn list_by_author(
    State(state): State<AppState>,
    params: Result<Query<AuthorParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<Vec<ReviewWithRestaurant>>>> {
    let Query(params) = params?;
    let reviews = state.reviews.reviews_by(&params.author).await?;
    Ok(Json(DataResponse { data: reviews }))
}

/// GET /api/v1/reviews/authors
///
/// Every reviewer name, one spelling per case-insensitive name.
pub async fn authors(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let authors = state.reviews.authors().await?;
    Ok(Json(DataResponse { data: authors }))
}
