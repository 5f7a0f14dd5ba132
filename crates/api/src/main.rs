use std::net::SocketAddr;
use std::sync::Arc;

use spice_core::error::CoreError;
use spice_db::remote::{PgRemoteStore, RemoteStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spice_api::config::{ServerConfig, StoreConfig};
use spice_api::router::build_app_router;
use spice_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "spice_api=debug,spice_catalog=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CoreError> {
    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    let store_config = StoreConfig::from_env()?;
    store_config.check_against(&config)?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    tracing::debug!(?store_config, "Loaded store configuration");

    // --- Remote store ---
    let pool = spice_db::create_pool(
        store_config.connect_options(),
        store_config.remote_acquire_timeout,
    )
    .await
    .map_err(|e| CoreError::RemoteUnavailable(format!("could not connect: {e}")))?;
    tracing::info!(
        host = %store_config.remote_host,
        database = %store_config.remote_database,
        "Remote connection pool created",
    );

    spice_db::run_migrations(&pool)
        .await
        .map_err(|e| CoreError::RemoteUnavailable(format!("migrations failed: {e}")))?;
    tracing::info!("Remote migrations applied");

    // --- Mirror ---
    let mirror = spice_db::open_mirror(&store_config.mirror_path)
        .await
        .map_err(|e| CoreError::MirrorUnavailable(format!("could not open mirror: {e}")))?;
    tracing::info!(path = %store_config.mirror_path.display(), "Mirror opened");

    // --- App state ---
    let remote: Arc<dyn RemoteStore> = Arc::new(PgRemoteStore::new(pool));
    let state = AppState::new(
        config.clone(),
        remote,
        mirror,
        store_config.sync_settings(),
        store_config.cache_ttl,
    );

    // Startup sync. A failure here is not fatal: searches retry it.
    if let Err(err) = state.sync.ensure_ready().await {
        tracing::warn!(error = %err, "Initial mirror sync failed");
    }

    let app = build_app_router(state, &config);

    // --- Start server ---
    let ip = config
        .host
        .parse()
        .map_err(|_| CoreError::Configuration(format!("HOST '{}' is not an IP address", config.host)))?;
    let addr = SocketAddr::new(ip, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CoreError::Configuration(format!("could not bind {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CoreError::Internal(format!("server error: {e}")))?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
