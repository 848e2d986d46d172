//! In-process remote store.
//!
//! Used when no remote URL is configured, and as the test double for the
//! coordinator: it can be switched unreachable, told to reject specific
//! titles, and keeps a log of the calls that reached it.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use tether_engine::{NewRecord, Record, Timestamp};

use super::{OrderKey, RemoteError, RemoteStore};

#[derive(Debug)]
struct MemoryState {
    records: Vec<Record>,
    available: bool,
    rejected_titles: HashSet<String>,
    inserted_titles: Vec<String>,
    deleted_ids: Vec<String>,
    list_calls: usize,
    last_created_at: Timestamp,
}

/// A remote store held in memory.
#[derive(Debug)]
pub struct MemoryRemoteStore {
    state: Mutex<MemoryState>,
}

impl MemoryRemoteStore {
    /// Create an empty, reachable store.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                records: Vec::new(),
                available: true,
                rejected_titles: HashSet::new(),
                inserted_titles: Vec::new(),
                deleted_ids: Vec::new(),
                list_calls: 0,
                last_created_at: 0,
            }),
        }
    }

    /// Create a store already holding `records`.
    pub fn with_records(records: Vec<Record>) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.lock();
            state.last_created_at = records.iter().map(|r| r.created_at).max().unwrap_or(0);
            state.records = records;
        }
        store
    }

    /// Make every call fail (or succeed again) as if the network dropped.
    pub fn set_available(&self, available: bool) {
        self.state.lock().available = available;
    }

    /// Fail inserts of records with this title until cleared.
    pub fn reject_title(&self, title: impl Into<String>) {
        self.state.lock().rejected_titles.insert(title.into());
    }

    /// Stop rejecting any titles.
    pub fn clear_rejections(&self) {
        self.state.lock().rejected_titles.clear();
    }

    /// Titles of successful inserts, in the order they happened.
    pub fn inserted_titles(&self) -> Vec<String> {
        self.state.lock().inserted_titles.clone()
    }

    /// Ids of successful deletes, in the order they happened.
    pub fn deleted_ids(&self) -> Vec<String> {
        self.state.lock().deleted_ids.clone()
    }

    /// Number of `list` calls received, reachable or not.
    pub fn list_calls(&self) -> usize {
        self.state.lock().list_calls
    }

    /// Current contents, unordered.
    pub fn records(&self) -> Vec<Record> {
        self.state.lock().records.clone()
    }

    fn unreachable() -> RemoteError {
        RemoteError::Network("remote store unreachable".into())
    }
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Creation time for the next insert: wall clock, but strictly increasing so
/// listing order is stable even within one millisecond.
fn next_created_at(state: &mut MemoryState) -> Timestamp {
    state.last_created_at = crate::now_millis().max(state.last_created_at + 1);
    state.last_created_at
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn list(&self, order: OrderKey) -> Result<Vec<Record>, RemoteError> {
        let mut state = self.state.lock();
        state.list_calls += 1;
        if !state.available {
            return Err(Self::unreachable());
        }

        let mut records = state.records.clone();
        match order {
            OrderKey::CreatedAtDesc => records.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        Ok(records)
    }

    async fn insert(&self, payload: &NewRecord) -> Result<Record, RemoteError> {
        let mut state = self.state.lock();
        if !state.available {
            return Err(Self::unreachable());
        }
        if state.rejected_titles.contains(&payload.title) {
            return Err(RemoteError::Status {
                status: 500,
                message: format!("insert of '{}' rejected", payload.title),
            });
        }

        let created_at = next_created_at(&mut state);
        let record = Record::new(
            uuid::Uuid::new_v4().simple().to_string(),
            payload.clone(),
            created_at,
        );
        state.records.push(record.clone());
        state.inserted_titles.push(payload.title.clone());
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock();
        if !state.available {
            return Err(Self::unreachable());
        }

        state.records.retain(|r| r.id != id);
        state.deleted_ids.push(id.to_string());
        Ok(())
    }
}
