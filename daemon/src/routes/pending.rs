//! Pending queue export and import.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tether_engine::QueueSnapshot;

use crate::error::Result;
use crate::AppState;

/// Result of an import.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub pending: usize,
}

/// Create pending queue routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/pending", get(export_handler).post(import_handler))
}

/// GET /pending - Snapshot of the queued operations.
async fn export_handler(State(state): State<AppState>) -> Json<QueueSnapshot> {
    Json(state.coordinator.export_pending().await)
}

/// POST /pending - Queue operations from an earlier snapshot.
async fn import_handler(
    State(state): State<AppState>,
    Json(snapshot): Json<QueueSnapshot>,
) -> Result<Json<ImportResponse>> {
    let imported = state.coordinator.import_pending(snapshot).await?;
    Ok(Json(ImportResponse {
        imported,
        pending: state.coordinator.pending_count().await,
    }))
}
