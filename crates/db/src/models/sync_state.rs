use serde::Serialize;
use sqlx::FromRow;
use spice_core::types::Timestamp;

/// The single `mirror_sync_state` row written by the last successful sync.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct SyncState {
    pub synced_at: Timestamp,
    pub restaurants: i64,
    pub offerings: i64,
}
