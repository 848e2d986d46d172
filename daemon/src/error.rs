//! Unified error handling for the daemon.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::remote::RemoteError;

/// Failure of a coordinator operation.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Engine error: {0}")]
    Engine(#[from] tether_engine::Error),
}

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl From<tether_engine::Error> for AppError {
    fn from(e: tether_engine::Error) -> Self {
        AppError::Sync(SyncError::Engine(e))
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            AppError::Sync(SyncError::Remote(e)) => {
                tracing::error!("Remote store error: {:?}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Remote store error".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Sync(SyncError::Engine(e)) => {
                tracing::warn!("Engine error: {:?}", e);
                (StatusCode::BAD_REQUEST, e.to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;
