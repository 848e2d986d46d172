//! Connectivity signal endpoints.
//!
//! The platform reports network changes here; the UI reads the current state
//! to show its offline banner.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Current connectivity as seen by the daemon.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectivityStatus {
    pub online: bool,
    /// Operations waiting for replay
    pub pending: usize,
}

/// Connectivity report from the platform.
#[derive(Debug, Deserialize)]
pub struct ConnectivityReport {
    pub online: bool,
}

/// Create connectivity routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/connectivity", get(status_handler).put(report_handler))
}

async fn status_handler(State(state): State<AppState>) -> Json<ConnectivityStatus> {
    Json(ConnectivityStatus {
        online: state.connectivity.is_online(),
        pending: state.coordinator.pending_count().await,
    })
}

/// PUT /connectivity - Record a platform report. Replay runs in the background.
async fn report_handler(
    State(state): State<AppState>,
    Json(report): Json<ConnectivityReport>,
) -> StatusCode {
    state.connectivity.report(report.online);
    StatusCode::NO_CONTENT
}
