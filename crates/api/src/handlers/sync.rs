use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use spice_catalog::sync::{SyncOutcome, SyncStatus};

use crate::error::AppResult;
use crate::query::SyncParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/sync?force=true
///
/// Blocks until the sync finishes. Without `force`, a fresh mirror is left
/// alone.
pub async fn trigger(
    State(state): State<AppState>,
    params: Result<Query<SyncParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<SyncOutcome>>> {
    let Query(params) = params?;
    let outcome = state.sync.sync(params.force).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/sync
pub async fn status(State(state): State<AppState>) -> AppResult<Json<DataResponse<SyncStatus>>> {
    let status = state.sync.status().await?;
    Ok(Json(DataResponse { data: status }))
}
