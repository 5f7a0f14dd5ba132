use std::sync::Arc;
use std::time::Duration;

use spice_catalog::monitor::PerformanceMonitor;
use spice_catalog::query::QueryService;
use spice_catalog::reviews::ReviewService;
use spice_catalog::sync::{SyncSettings, Synchronizer};
use spice_db::remote::RemoteStore;
use spice_db::MirrorPool;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub remote: Arc<dyn RemoteStore>,
    pub sync: Arc<Synchronizer>,
    pub query: Arc<QueryService>,
    pub reviews: Arc<ReviewService>,
    pub monitor: Arc<PerformanceMonitor>,
}

impl AppState {
    /// Wire the catalog services over a remote store and a mirror. All of
    /// them report into one performance monitor.
    pub fn new(
        config: ServerConfig,
        remote: Arc<dyn RemoteStore>,
        mirror: MirrorPool,
        sync_settings: SyncSettings,
        cache_ttl: Duration,
    ) -> Self {
        let monitor = Arc::new(PerformanceMonitor::new());
        let sync = Arc::new(Synchronizer::new(
            Arc::clone(&remote),
            mirror,
            sync_settings,
            Arc::clone(&monitor),
        ));
        Self {
            config: Arc::new(config),
            query: Arc::new(QueryService::new(Arc::clone(&sync), cache_ttl)),
            reviews: Arc::new(ReviewService::new(Arc::clone(&remote), Arc::clone(&monitor))),
            remote,
            sync,
            monitor,
        }
    }
}
