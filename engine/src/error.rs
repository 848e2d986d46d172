//! Error types for the Tether engine.

use thiserror::Error;

/// All possible errors from the Tether engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    // State errors
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("unsupported snapshot format version: {found} (max supported: {supported})")]
    UnsupportedSnapshotVersion { found: u32, supported: u32 },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
