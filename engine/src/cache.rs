//! Local cache - the in-memory mirror of the remote collection.
//!
//! Records are kept ordered by `createdAt` descending, matching the order the
//! remote store is queried in, and no id appears twice.

use crate::{Record, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered, de-duplicated mirror of the remote collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalCache {
    records: Vec<Record>,
}

impl LocalCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Current contents in display order.
    pub fn list(&self) -> Vec<Record> {
        self.records.clone()
    }

    /// Iterate over records in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Ids in display order.
    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }

    /// Get a record by ID.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Check if a record is cached.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the cache holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert a record, or replace the cached record with the same id.
    ///
    /// The record lands at its sorted position; a record at least as new as
    /// every cached one goes to the head.
    pub fn upsert(&mut self, record: Record) {
        self.records.retain(|r| r.id != record.id);
        let at = self
            .records
            .partition_point(|r| r.created_at > record.created_at);
        self.records.insert(at, record);
    }

    /// Remove a record. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    /// Swap a provisional record for its confirmed counterpart.
    ///
    /// Returns whether the provisional record was still cached. The confirmed
    /// record is inserted either way.
    pub fn replace(&mut self, temp_id: &str, real: Record) -> bool {
        let replaced = self.remove(temp_id);
        self.upsert(real);
        replaced
    }

    /// Replace the whole cache with a remote snapshot.
    ///
    /// The snapshot is re-sorted and duplicate ids are dropped (first wins),
    /// so an out-of-order remote response cannot break the ordering invariant.
    pub fn import_snapshot(&mut self, records: Vec<Record>) {
        let mut records = records;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut seen: HashSet<RecordId> = HashSet::with_capacity(records.len());
        records.retain(|r| seen.insert(r.id.clone()));

        self.records = records;
    }
}
