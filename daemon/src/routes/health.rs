//! Liveness and sync status.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Liveness plus a summary of the sync state.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub online: bool,
    /// Writes still waiting for the remote store
    pub pending: usize,
    pub cached: usize,
}

/// Create health routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/", get(banner))
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let pending = state.coordinator.pending_count().await;
    Json(HealthResponse {
        status: if pending == 0 { "ok" } else { "syncing" },
        version: env!("CARGO_PKG_VERSION"),
        online: state.connectivity.is_online(),
        pending,
        cached: state.coordinator.cached_records().len(),
    })
}

async fn banner() -> &'static str {
    "tether-daemon: offline-resilient mirror of the generation history"
}
