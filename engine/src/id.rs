//! Temporary identifiers for records created while offline.
//!
//! A temporary id is the reserved [`TEMP_ID_PREFIX`] followed by the creation
//! timestamp and a per-generator sequence number. Whether a record is
//! provisional is derived from its id alone; no separate flag is stored.

use crate::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix reserved for client-minted identifiers.
pub const TEMP_ID_PREFIX: &str = "temp_";

/// Check whether an id was minted locally and is not yet confirmed.
pub fn is_temporary(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Mints unique temporary ids.
///
/// The sequence number keeps ids distinct when several records are created
/// within the same millisecond.
#[derive(Debug, Default)]
pub struct TempIdGenerator {
    sequence: AtomicU64,
}

impl TempIdGenerator {
    /// Create a generator starting at sequence 0.
    pub fn new() -> Self {
        Self {
            sequence: AtomicU64::new(0),
        }
    }

    /// Mint a fresh temporary id for a record created at `now`.
    pub fn mint(&self, now: Timestamp) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{TEMP_ID_PREFIX}{now}_{seq}")
    }
}
