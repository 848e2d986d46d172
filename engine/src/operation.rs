//! Pending operation types.
//!
//! A mutation that could not reach the remote store is remembered as data,
//! not as a retry closure, so replay can match on it exhaustively and the
//! queue can be serialized.

use crate::{NewRecord, RecordId};
use serde::{Deserialize, Serialize};

/// A create that still has to reach the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOp {
    /// Payload to insert remotely
    pub payload: NewRecord,
    /// Id of the provisional record standing in for it locally
    pub temp_id: RecordId,
}

/// A delete that still has to reach the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOp {
    /// Remote id of the record to delete
    pub id: RecordId,
}

/// A mutation waiting for connectivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PendingOperation {
    Create(CreateOp),
    Delete(DeleteOp),
}

impl PendingOperation {
    /// Pending create correlated to a provisional record.
    pub fn create(payload: NewRecord, temp_id: impl Into<RecordId>) -> Self {
        PendingOperation::Create(CreateOp {
            payload,
            temp_id: temp_id.into(),
        })
    }

    /// Pending delete of a remote record.
    pub fn delete(id: impl Into<RecordId>) -> Self {
        PendingOperation::Delete(DeleteOp { id: id.into() })
    }

    /// The record this operation concerns: the provisional id for a create,
    /// the target id for a delete.
    pub fn record_id(&self) -> &RecordId {
        match self {
            PendingOperation::Create(op) => &op.temp_id,
            PendingOperation::Delete(op) => &op.id,
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PendingOperation::Create(_) => "create",
            PendingOperation::Delete(_) => "delete",
        }
    }

    /// Whether this is the pending create behind a provisional record.
    pub fn is_create_for(&self, temp_id: &str) -> bool {
        matches!(self, PendingOperation::Create(op) if op.temp_id == temp_id)
    }
}
