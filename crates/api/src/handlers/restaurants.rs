//! Handlers for the `/restaurants` resource.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use spice_core::types::DbId;
use spice_db::models::restaurant::{Restaurant, RestaurantName};
use spice_db::models::review::{Review, ReviewSummary};

use crate::error::AppResult;
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A restaurant's reviews together with their aggregate.
#[derive(Debug, Serialize)]
pub struct RestaurantReviews {
    pub summary: ReviewSummary,
    pub reviews: Vec<Review>,
}

/// GET /api/v1/restaurants
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<Vec<Restaurant>>>> {
    let Query(params) = params?;
    let spec = params.into_filter()?;
    let restaurants = state.query.search(spec).await?;

    tracing::debug!(results = restaurants.len(), "Restaurant search executed");
    Ok(Json(DataResponse { data: restaurants }))
}

/// GET /api/v1/restaurants/names
pub async fn names(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<RestaurantName>>>> {
    let names = state.query.restaurant_names().await?;
    Ok(Json(DataResponse { data: names }))
}

/// GET /api/v1/restaurants/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<DataResponse<Restaurant>>> {
    let Path(id) = id?;
    let restaurant = state.query.restaurant(id).await?;
    Ok(Json(DataResponse { data: restaurant }))
}

/// GET /api/v1/restaurants/{id}/reviews
pub async fn reviews(
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<DataResponse<RestaurantReviews>>> {
    let Path(id) = id?;
    let (summary, reviews) = tokio::try_join!(
        state.reviews.summary_for(id),
        state.reviews.reviews_for(id),
    )?;
    Ok(Json(DataResponse {
        data: RestaurantReviews { summary, reviews },
    }))
}
