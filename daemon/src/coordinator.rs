//! Sync coordinator - the owner of the local mirror and the pending queue.
//!
//! Every caller-facing operation follows the same shape: read the
//! connectivity signal, try the remote store, then update the cache and, when
//! the failure happened offline, queue the mutation for replay. That whole
//! sequence runs under one async lock so cache and queue never see
//! interleaved writers. Plain cache reads take only a short read lock and are
//! not held up by an in-flight remote call.
//!
//! Per record:
//!
//! ```text
//! [absent] --create(online)--> [remote]
//! [absent] --create(offline)--> [temp] --replay ok--> [remote]
//! [remote] --delete(online)--> [absent]
//! [remote] --delete(offline)--> [absent, delete pending] --replay ok--> [absent]
//! ```
//!
//! A failed replay leaves the record where it was and moves its operation to
//! the back of the queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tether_engine::{
    is_temporary, LocalCache, NewRecord, PendingOp, PendingOperation, PendingQueue,
    QueueSnapshot, Record, TempIdGenerator,
};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::connectivity::ConnectivityMonitor;
use crate::error::SyncError;
use crate::now_millis;
use crate::remote::{OrderKey, RemoteError, RemoteStore};

/// Result of a reconnect trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// Another drain was already running; this trigger did nothing.
    AlreadyDraining,
    /// A drain pass ran.
    Completed(ReplaySummary),
}

/// What one drain pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Operations applied to the remote store
    pub applied: usize,
    /// Error of the operation that stopped the pass, if any
    pub failed: Option<String>,
    /// Operations still queued
    pub remaining: usize,
}

/// Clears the drain flag when the pass ends, however it ends.
struct DrainGuard<'a>(&'a AtomicBool);

impl<'a> DrainGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Keeps the local mirror consistent with the remote store across
/// connectivity gaps.
pub struct SyncCoordinator {
    remote: Arc<dyn RemoteStore>,
    connectivity: Arc<ConnectivityMonitor>,
    cache: RwLock<LocalCache>,
    /// Pending operations; holding this lock serializes all mutations.
    queue: Mutex<PendingQueue>,
    draining: AtomicBool,
    temp_ids: TempIdGenerator,
    records_tx: watch::Sender<Vec<Record>>,
}

impl SyncCoordinator {
    /// Create a coordinator with an empty cache and queue.
    pub fn new(remote: Arc<dyn RemoteStore>, connectivity: Arc<ConnectivityMonitor>) -> Self {
        let (records_tx, _) = watch::channel(Vec::new());
        Self {
            remote,
            connectivity,
            cache: RwLock::new(LocalCache::new()),
            queue: Mutex::new(PendingQueue::new()),
            draining: AtomicBool::new(false),
            temp_ids: TempIdGenerator::new(),
            records_tx,
        }
    }

    /// Create a new coordinator wrapped in Arc for sharing.
    pub fn new_shared(
        remote: Arc<dyn RemoteStore>,
        connectivity: Arc<ConnectivityMonitor>,
    ) -> Arc<Self> {
        Arc::new(Self::new(remote, connectivity))
    }

    /// The connectivity monitor this coordinator consults.
    pub fn connectivity(&self) -> &Arc<ConnectivityMonitor> {
        &self.connectivity
    }

    /// Whether the connectivity signal currently says offline.
    pub fn is_offline(&self) -> bool {
        self.connectivity.is_offline()
    }

    /// Current cache contents, without touching the network.
    pub fn cached_records(&self) -> Vec<Record> {
        self.cache.read().list()
    }

    /// Follow the cache contents; a new value is published after every
    /// change.
    pub fn watch_records(&self) -> watch::Receiver<Vec<Record>> {
        self.records_tx.subscribe()
    }

    /// Number of queued operations.
    pub async fn pending_count(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Queued operations, head first.
    pub async fn pending_operations(&self) -> Vec<PendingOp> {
        self.queue.lock().await.pending_ops().cloned().collect()
    }

    fn publish(&self) {
        self.records_tx.send_replace(self.cache.read().list());
    }

    /// List the collection, newest first.
    ///
    /// Offline with a warm cache, the cache is served without a network
    /// attempt. Otherwise the remote snapshot replaces the cache. If the
    /// remote call fails, whatever the cache holds is returned instead; this
    /// never fails.
    pub async fn list(&self) -> Vec<Record> {
        let _serial = self.queue.lock().await;

        if self.connectivity.is_offline() {
            let cached = self.cache.read().list();
            if !cached.is_empty() {
                tracing::debug!(count = cached.len(), "Offline, serving cached records");
                return cached;
            }
        }

        match self.remote.list(OrderKey::CreatedAtDesc).await {
            Ok(records) => {
                let snapshot = {
                    let mut cache = self.cache.write();
                    cache.import_snapshot(records);
                    cache.list()
                };
                tracing::debug!(count = snapshot.len(), "Cache refreshed from remote");
                self.records_tx.send_replace(snapshot.clone());
                snapshot
            }
            Err(err) => {
                tracing::warn!(error = %err, "Listing remote records failed, serving cache");
                self.cache.read().list()
            }
        }
    }

    /// Create a record.
    ///
    /// On remote failure while offline, a provisional record with a
    /// temporary id is cached and returned, and the create is queued. On
    /// remote failure while online the error is returned and nothing changes.
    pub async fn create(&self, payload: NewRecord) -> Result<Record, SyncError> {
        payload.validate()?;
        let mut queue = self.queue.lock().await;

        match self.remote.insert(&payload).await {
            Ok(record) => {
                self.cache.write().upsert(record.clone());
                tracing::info!(record_id = %record.id, "Record created");
                self.publish();
                Ok(record)
            }
            Err(err) if self.connectivity.is_offline() => {
                let now = now_millis();
                let temp = Record::provisional(self.temp_ids.mint(now), payload.clone(), now);

                self.cache.write().upsert(temp.clone());
                queue.enqueue(PendingOperation::create(payload, temp.id.clone()), now);

                tracing::info!(
                    temp_id = %temp.id,
                    pending = queue.len(),
                    error = %err,
                    "Offline, queued create"
                );
                self.publish();
                Ok(temp)
            }
            Err(err) => {
                tracing::error!(error = %err, "Create failed while online");
                Err(err.into())
            }
        }
    }

    /// Delete a record.
    ///
    /// A provisional record never reached the remote store, so it is dropped
    /// locally together with its queued create. A remote record is deleted
    /// remotely; if that fails offline it disappears from the cache at once
    /// and the delete is queued, if it fails online the error is returned
    /// and the cache is left alone. Deleting an unknown id is a no-op.
    pub async fn delete(&self, id: &str) -> Result<(), SyncError> {
        let mut queue = self.queue.lock().await;

        if is_temporary(id) {
            let removed = self.cache.write().remove(id);
            let discarded = queue.discard_create_for(id);
            tracing::info!(temp_id = %id, removed, discarded, "Dropped provisional record");
            self.publish();
            return Ok(());
        }

        match self.remote.delete(id).await {
            Ok(()) => {
                let removed = self.cache.write().remove(id);
                tracing::info!(record_id = %id, removed, "Record deleted");
                self.publish();
                Ok(())
            }
            Err(err) if self.connectivity.is_offline() => {
                self.cache.write().remove(id);
                queue.enqueue(PendingOperation::delete(id), now_millis());

                tracing::info!(
                    record_id = %id,
                    pending = queue.len(),
                    error = %err,
                    "Offline, queued delete"
                );
                self.publish();
                Ok(())
            }
            Err(err) => {
                tracing::error!(record_id = %id, error = %err, "Delete failed while online");
                Err(err.into())
            }
        }
    }

    /// Replay queued operations against the remote store.
    ///
    /// Runs one drain pass: operations are applied in order until one fails,
    /// which is moved to the back of the queue and ends the pass. A trigger
    /// arriving while a pass is already running is ignored, so no operation
    /// is applied twice.
    pub async fn handle_reconnect(&self) -> ReplayOutcome {
        let Some(_guard) = DrainGuard::acquire(&self.draining) else {
            tracing::debug!("Drain already in progress, ignoring trigger");
            return ReplayOutcome::AlreadyDraining;
        };

        let mut queue = self.queue.lock().await;
        if queue.is_empty() {
            return ReplayOutcome::Completed(ReplaySummary::default());
        }

        tracing::info!(pending = queue.len(), "Replaying pending operations");

        let remote: &dyn RemoteStore = self.remote.as_ref();
        let cache = &self.cache;
        let report = queue
            .drain(|op| {
                let op = op.clone();
                async move { replay(remote, cache, op).await }
            })
            .await;

        let summary = ReplaySummary {
            applied: report.applied.len(),
            failed: report.failed.as_ref().map(|(_, err)| err.to_string()),
            remaining: report.remaining,
        };

        match &report.failed {
            Some((op, err)) => tracing::warn!(
                kind = op.kind(),
                record_id = %op.record_id(),
                error = %err,
                applied = summary.applied,
                remaining = summary.remaining,
                "Replay stopped, operation moved to the back of the queue"
            ),
            None => tracing::info!(applied = summary.applied, "Pending operations replayed"),
        }

        if summary.applied > 0 {
            self.publish();
        }
        ReplayOutcome::Completed(summary)
    }

    /// Drain the queue every time the connectivity signal turns online.
    ///
    /// The task holds only a weak reference and ends when the coordinator or
    /// the monitor goes away.
    pub fn spawn_reconnect_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut subscription = self.connectivity.subscribe();
        let coordinator: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            while let Some(online) = subscription.recv().await {
                if !online {
                    continue;
                }
                let Some(coordinator) = coordinator.upgrade() else {
                    break;
                };
                coordinator.handle_reconnect().await;
            }
            tracing::debug!("Reconnect listener stopped");
        })
    }

    /// Export the pending queue.
    pub async fn export_pending(&self) -> QueueSnapshot {
        let queue = self.queue.lock().await;
        QueueSnapshot::from_queue(&queue, now_millis())
    }

    /// Append a previously exported queue behind the current one.
    ///
    /// Provisional records for imported creates are put back in the cache.
    /// Operations already queued are not duplicated. Returns how many
    /// operations were added.
    pub async fn import_pending(&self, snapshot: QueueSnapshot) -> Result<usize, SyncError> {
        snapshot.validate()?;
        let mut queue = self.queue.lock().await;

        let mut combined: Vec<PendingOp> = queue.pending_ops().cloned().collect();
        let mut added = 0;
        for pending in &snapshot.pending_ops {
            if !combined.iter().any(|p| p.operation == pending.operation) {
                combined.push(pending.clone());
                added += 1;
            }
        }
        queue.restore(combined);

        {
            let mut cache = self.cache.write();
            for record in snapshot.provisional_records() {
                cache.upsert(record);
            }
        }

        tracing::info!(added, pending = queue.len(), "Imported pending operations");
        self.publish();
        Ok(added)
    }
}

/// Apply one queued operation to the remote store.
///
/// A confirmed create replaces its provisional record in the cache right
/// away; a delete needs no cache change since it was applied optimistically.
async fn replay(
    remote: &dyn RemoteStore,
    cache: &RwLock<LocalCache>,
    op: PendingOperation,
) -> Result<(), RemoteError> {
    match op {
        PendingOperation::Create(create) => {
            let real = remote.insert(&create.payload).await?;
            let replaced = cache.write().replace(&create.temp_id, real.clone());
            tracing::info!(
                temp_id = %create.temp_id,
                record_id = %real.id,
                replaced,
                "Provisional record confirmed"
            );
        }
        PendingOperation::Delete(delete) => {
            remote.delete(&delete.id).await?;
            tracing::debug!(record_id = %delete.id, "Queued delete applied");
        }
    }
    Ok(())
}
