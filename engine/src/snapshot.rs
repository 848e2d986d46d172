//! Snapshot of the pending queue for optional persistence.
//!
//! The queue is volatile by default: a restart loses whatever was not
//! replayed. A [`QueueSnapshot`] lets a caller export the queue explicitly and
//! import it again later.

use crate::{error::Result, is_temporary, Error, PendingOp, PendingOperation, PendingQueue, Record, Timestamp};
use serde::{Deserialize, Serialize};

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A point-in-time export of the pending queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    /// Snapshot format version
    pub format_version: u32,
    /// When the snapshot was taken (milliseconds since epoch)
    pub exported_at: Timestamp,
    /// Queued operations, head first
    pub pending_ops: Vec<PendingOp>,
}

impl QueueSnapshot {
    /// Create a new empty snapshot.
    pub fn new(exported_at: Timestamp) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            exported_at,
            pending_ops: Vec::new(),
        }
    }

    /// Capture the current contents of a queue.
    pub fn from_queue(queue: &PendingQueue, exported_at: Timestamp) -> Self {
        Self {
            pending_ops: queue.pending_ops().cloned().collect(),
            ..Self::new(exported_at)
        }
    }

    /// Number of queued operations in the snapshot.
    pub fn len(&self) -> usize {
        self.pending_ops.len()
    }

    /// Check if the snapshot holds no operations.
    pub fn is_empty(&self) -> bool {
        self.pending_ops.is_empty()
    }

    /// Rebuild the provisional records that stand in for pending creates.
    ///
    /// Each record is dated by when its create was queued.
    pub fn provisional_records(&self) -> Vec<Record> {
        self.pending_ops
            .iter()
            .filter_map(|p| match &p.operation {
                PendingOperation::Create(op) => Some(Record::new(
                    op.temp_id.clone(),
                    op.payload.clone(),
                    p.queued_at,
                )),
                PendingOperation::Delete(_) => None,
            })
            .collect()
    }

    /// Check the format version is supported and the operations are well-formed.
    ///
    /// Creates must be correlated to temporary ids; deletes must target
    /// remote ids, since deleting a provisional record never queues anything.
    pub fn validate(&self) -> Result<()> {
        if self.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::UnsupportedSnapshotVersion {
                found: self.format_version,
                supported: SNAPSHOT_FORMAT_VERSION,
            });
        }

        for pending in &self.pending_ops {
            match &pending.operation {
                PendingOperation::Create(op) if !is_temporary(&op.temp_id) => {
                    return Err(Error::InvalidSnapshot(format!(
                        "pending create correlated to non-temporary id '{}'",
                        op.temp_id
                    )));
                }
                PendingOperation::Delete(op) if is_temporary(&op.id) => {
                    return Err(Error::InvalidSnapshot(format!(
                        "pending delete targets temporary id '{}'",
                        op.id
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
