//! Restaurant catalog services.
//!
//! - [`sync::Synchronizer`] rebuilds the local mirror from the remote store.
//! - [`query::QueryService`] answers filtered searches and distinct-value
//!   lookups from the mirror.
//! - [`reviews::ReviewService`] reads and writes reviews on the remote store.
//! - [`monitor::PerformanceMonitor`] collects timings from all three.
//!
//! Store errors are classified here: anything from the remote store becomes
//! [`CoreError::RemoteUnavailable`], anything from the mirror becomes
//! [`CoreError::MirrorUnavailable`].

pub mod monitor;
pub mod query;
pub mod reviews;
pub mod sync;

use spice_core::error::CoreError;

pub(crate) fn remote_unavailable(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Remote store error");
    CoreError::RemoteUnavailable(err.to_string())
}

pub(crate) fn mirror_unavailable(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Mirror store error");
    CoreError::MirrorUnavailable(err.to_string())
}
