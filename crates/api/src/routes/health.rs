use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use spice_core::types::Timestamp;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when both stores are usable, otherwise `degraded`.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub remote_healthy: bool,
    /// `None` until the mirror has been synced once.
    pub mirror_synced_at: Option<Timestamp>,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let remote_healthy = state.remote.ping().await.is_ok();
    let mirror_synced_at = state.sync.last_synced_at().await.ok().flatten();

    let status = if remote_healthy && mirror_synced_at.is_some() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        remote_healthy,
        mirror_synced_at,
    })
}

/// Mount health check routes (root level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
