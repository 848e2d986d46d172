//! Tether Daemon - offline-resilient sync for a remote record collection.
//!
//! The daemon mirrors a remote document store locally, keeps serving and
//! accepting writes while the network is down, and replays queued writes
//! once the connectivity signal reports online again. A small HTTP API
//! exposes the collection and the connectivity switch to local clients.

pub mod config;
pub mod connectivity;
pub mod coordinator;
pub mod error;
pub mod remote;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tether_engine::Timestamp;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::connectivity::ConnectivityMonitor;
use crate::coordinator::SyncCoordinator;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SyncCoordinator>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub config: Arc<Config>,
}

/// Build the HTTP application.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Wall clock in milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis().max(0) as Timestamp
}
