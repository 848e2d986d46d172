//! HTTP route definitions.

mod connectivity;
mod generations;
mod health;
mod pending;

use crate::AppState;
use axum::Router;

pub use generations::RecordView;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(generations::routes())
        .merge(connectivity::routes())
        .merge(pending::routes())
}
