//! Handlers for catalog timing statistics.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use spice_catalog::monitor::PerformanceSummary;

use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/performance
///
/// Per-operation counts, error rates and timings since startup or the last
/// reset, plus the most recent slow operations.
pub async fn summary(State(state): State<AppState>) -> Json<DataResponse<PerformanceSummary>> {
    Json(DataResponse {
        data: state.monitor.summary(),
    })
}

/// DELETE /api/v1/performance
pub async fn reset(State(state): State<AppState>) -> StatusCode {
    state.monitor.reset();
    StatusCode::NO_CONTENT
}
