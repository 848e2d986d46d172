//! Remote document store access.
//!
//! The coordinator only needs three calls from the store that owns the
//! collection; any of them may fail. [`HttpRemoteStore`] talks to a REST
//! document store, [`MemoryRemoteStore`] keeps everything in process.

mod http;
mod memory;

pub use http::HttpRemoteStore;
pub use memory::MemoryRemoteStore;

use async_trait::async_trait;
use tether_engine::{NewRecord, Record};

/// Sort order requested when listing the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderKey {
    /// Newest first
    #[default]
    CreatedAtDesc,
}

impl OrderKey {
    /// Field and direction as query parameters.
    pub fn as_query(&self) -> [(&'static str, &'static str); 2] {
        match self {
            OrderKey::CreatedAtDesc => [("orderBy", "createdAt"), ("direction", "desc")],
        }
    }
}

/// A failed remote call.
///
/// The coordinator does not look at the cause: any failure while the
/// connectivity signal says offline is queued, any failure while it says
/// online is surfaced.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),

    #[error("remote store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed remote response: {0}")]
    Decode(String),

    #[error("invalid remote request: {0}")]
    InvalidRequest(String),
}

/// The persistent store behind the local mirror.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the whole collection in the given order.
    async fn list(&self, order: OrderKey) -> Result<Vec<Record>, RemoteError>;

    /// Insert a record; the store assigns its id and creation time.
    async fn insert(&self, payload: &NewRecord) -> Result<Record, RemoteError>;

    /// Delete a record by remote id.
    async fn delete(&self, id: &str) -> Result<(), RemoteError>;
}
