//! Tether Daemon - offline-resilient sync for a remote record collection.
//!
//! Serves the local HTTP API, mirrors the remote store and replays queued
//! writes whenever the platform reports connectivity again.

use std::sync::Arc;

use tether_daemon::config::Config;
use tether_daemon::connectivity::ConnectivityMonitor;
use tether_daemon::coordinator::SyncCoordinator;
use tether_daemon::remote::{HttpRemoteStore, MemoryRemoteStore, RemoteStore};
use tether_daemon::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tether_daemon=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Tether Daemon on {}:{}", config.host, config.port);

    let remote: Arc<dyn RemoteStore> = match &config.remote_url {
        Some(url) => {
            let store = HttpRemoteStore::new(url, &config.remote_collection, config.remote_timeout)?;
            tracing::info!("Using remote store at {}", store.collection_url());
            Arc::new(store)
        }
        None => {
            tracing::warn!("REMOTE_URL not set, records are kept in memory only");
            Arc::new(MemoryRemoteStore::new())
        }
    };

    let connectivity = ConnectivityMonitor::new_shared(config.start_online);
    let coordinator = SyncCoordinator::new_shared(remote, Arc::clone(&connectivity));
    coordinator.spawn_reconnect_listener();

    // Warm the cache so an early drop still has something to serve
    let warmed = coordinator.list().await;
    tracing::info!("Loaded {} records", warmed.len());

    let state = AppState {
        coordinator,
        connectivity,
        config: Arc::new(config.clone()),
    };
    let app = tether_daemon::app(state);

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Daemon listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
