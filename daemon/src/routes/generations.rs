//! Generation history endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tether_engine::{NewRecord, Record};

use crate::config::Config;
use crate::error::Result;
use crate::AppState;

/// A record as served to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    #[serde(flatten)]
    pub record: Record,
    /// Not yet confirmed by the remote store
    pub provisional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl RecordView {
    fn new(record: Record, config: &Config) -> Self {
        // Provisional records may point at audio the gateway cannot serve yet.
        let provisional = record.is_provisional();
        let audio_url = if provisional {
            None
        } else {
            config.audio_url(&record.audio_path)
        };
        Self {
            record,
            provisional,
            audio_url,
        }
    }
}

/// Create generation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/generations", get(list_handler).post(create_handler))
        .route("/generations/{id}", delete(delete_handler))
}

/// GET /generations - Newest first; served from cache when the remote is out of reach.
async fn list_handler(State(state): State<AppState>) -> Json<Vec<RecordView>> {
    let records = state.coordinator.list().await;
    Json(
        records
            .into_iter()
            .map(|r| RecordView::new(r, &state.config))
            .collect(),
    )
}

/// POST /generations - Create a record, provisionally when offline.
async fn create_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewRecord>,
) -> Result<(StatusCode, Json<RecordView>)> {
    let record = state.coordinator.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordView::new(record, &state.config)),
    ))
}

/// DELETE /generations/{id} - Delete a record, optimistically when offline.
async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.coordinator.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
