//! Record types for storing generations.

use crate::{error::Result, id::is_temporary, Error, RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// The fields a caller supplies when creating a record.
///
/// The remote store assigns the id and creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    /// Display title
    pub title: String,
    /// Text body that was synthesized
    pub content: String,
    /// Opaque reference to the generated audio blob
    pub audio_path: String,
}

impl NewRecord {
    /// Create a new payload.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        audio_path: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            audio_path: audio_path.into(),
        }
    }

    /// Reject payloads that could never be rendered in the history.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidRecord("title must not be empty".into()));
        }
        if self.audio_path.trim().is_empty() {
            return Err(Error::InvalidRecord("audio path must not be empty".into()));
        }
        Ok(())
    }
}

/// A generation record in the local mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Remote or temporary identifier
    pub id: RecordId,
    /// Display title
    pub title: String,
    /// Text body that was synthesized
    pub content: String,
    /// Opaque reference to the generated audio blob
    pub audio_path: String,
    /// When the record was created (milliseconds since epoch)
    pub created_at: Timestamp,
}

impl Record {
    /// Build a record from a payload and the identity assigned to it.
    pub fn new(id: impl Into<RecordId>, payload: NewRecord, created_at: Timestamp) -> Self {
        Self {
            id: id.into(),
            title: payload.title,
            content: payload.content,
            audio_path: payload.audio_path,
            created_at,
        }
    }

    /// Build a locally minted stand-in for a record the remote store has not
    /// confirmed yet. `temp_id` must carry the temporary prefix.
    pub fn provisional(temp_id: impl Into<RecordId>, payload: NewRecord, now: Timestamp) -> Self {
        let record = Self::new(temp_id, payload, now);
        debug_assert!(record.is_provisional(), "provisional id without prefix");
        record
    }

    /// Whether this record is still waiting for remote confirmation.
    pub fn is_provisional(&self) -> bool {
        is_temporary(&self.id)
    }

    /// The caller-supplied fields of this record.
    pub fn payload(&self) -> NewRecord {
        NewRecord {
            title: self.title.clone(),
            content: self.content.clone(),
            audio_path: self.audio_path.clone(),
        }
    }
}
