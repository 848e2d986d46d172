//! Pending operation queue.
//!
//! A FIFO of mutations that could not be applied while offline. Draining
//! replays them in order through a caller-supplied async function, so the
//! engine never performs the remote call itself.

use crate::{PendingOperation, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::future::Future;

/// A queued operation with bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOp {
    /// The operation
    pub operation: PendingOperation,
    /// When it was queued (milliseconds since epoch)
    pub queued_at: Timestamp,
    /// Failed replay attempts so far
    pub attempts: u32,
}

/// Outcome of one drain pass.
#[derive(Debug)]
pub struct DrainReport<T, E> {
    /// Operations applied in this pass, in order, with what `apply` returned
    pub applied: Vec<(PendingOperation, T)>,
    /// The operation that failed and ended the pass, if any
    pub failed: Option<(PendingOperation, E)>,
    /// Operations left in the queue after the pass
    pub remaining: usize,
}

impl<T, E> DrainReport<T, E> {
    /// Whether the pass ran to the end of the queue.
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

/// FIFO queue of operations awaiting replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingQueue {
    ops: VecDeque<PendingOp>,
}

impl PendingQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            ops: VecDeque::new(),
        }
    }

    /// Append an operation to the tail.
    pub fn enqueue(&mut self, operation: PendingOperation, queued_at: Timestamp) {
        self.ops.push_back(PendingOp {
            operation,
            queued_at,
            attempts: 0,
        });
    }

    /// Queued operations, head first.
    pub fn pending_ops(&self) -> impl Iterator<Item = &PendingOp> {
        self.ops.iter()
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Remove the pending create behind a provisional record.
    ///
    /// Returns whether one was queued.
    pub fn discard_create_for(&mut self, temp_id: &str) -> bool {
        let before = self.ops.len();
        self.ops.retain(|p| !p.operation.is_create_for(temp_id));
        self.ops.len() != before
    }

    /// Replace the queue contents, e.g. from an imported snapshot.
    pub fn restore(&mut self, ops: Vec<PendingOp>) {
        self.ops = ops.into();
    }

    /// Replay queued operations in FIFO order.
    ///
    /// The head operation is handed to `apply` and only leaves the queue once
    /// `apply` succeeds, so dropping the pass mid-call loses nothing. When
    /// `apply` fails, that operation moves to the tail and the pass stops:
    /// operations behind it are not attempted until the next drain. A single
    /// persistently failing operation therefore delays everything queued
    /// after it by one pass per trigger.
    ///
    /// Draining an empty queue does nothing.
    pub async fn drain<F, Fut, T, E>(&mut self, mut apply: F) -> DrainReport<T, E>
    where
        F: FnMut(&PendingOperation) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut applied = Vec::new();
        let mut failed = None;

        while let Some(head) = self.ops.front() {
            let operation = head.operation.clone();
            let result = apply(&operation).await;

            let Some(mut pending) = self.ops.pop_front() else {
                break;
            };
            match result {
                Ok(value) => applied.push((operation, value)),
                Err(err) => {
                    pending.attempts += 1;
                    failed = Some((operation, err));
                    self.ops.push_back(pending);
                    break;
                }
            }
        }

        DrainReport {
            applied,
            failed,
            remaining: self.ops.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewRecord;
    use futures::executor::block_on;

    fn create(temp_id: &str) -> PendingOperation {
        PendingOperation::create(NewRecord::new(temp_id, "text", "audio/a.mp3"), temp_id)
    }

    #[test]
    fn enqueue_appends_to_tail() {
        let mut queue = PendingQueue::new();
        queue.enqueue(create("temp_1_0"), 1000);
        queue.enqueue(PendingOperation::delete("gen_1"), 2000);

        let ids: Vec<_> = queue.pending_ops().map(|p| p.operation.record_id().as_str()).collect();
        assert_eq!(ids, vec!["temp_1_0", "gen_1"]);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn drain_empty_queue() {
        let mut queue = PendingQueue::new();
        let mut calls = 0;

        let report = block_on(queue.drain(|_| {
            calls += 1;
            async { Ok::<(), ()>(()) }
        }));

        assert_eq!(calls, 0);
        assert!(report.applied.is_empty());
        assert!(report.is_complete());
        assert_eq!(report.remaining, 0);
    }

    #[test]
    fn drain_applies_in_fifo_order() {
        let mut queue = PendingQueue::new();
        queue.enqueue(create("temp_a"), 1);
        queue.enqueue(create("temp_b"), 2);
        queue.enqueue(PendingOperation::delete("gen_c"), 3);

        let mut seen = Vec::new();
        let report = block_on(queue.drain(|op| {
            seen.push(op.record_id().clone());
            async { Ok::<(), ()>(()) }
        }));

        assert_eq!(seen, vec!["temp_a", "temp_b", "gen_c"]);
        assert_eq!(report.applied.len(), 3);
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_stops_at_first_failure_and_requeues_at_tail() {
        let mut queue = PendingQueue::new();
        queue.enqueue(create("temp_a"), 1);
        queue.enqueue(create("temp_b"), 2);
        queue.enqueue(PendingOperation::delete("gen_c"), 3);

        let mut seen = Vec::new();
        let report = block_on(queue.drain(|op| {
            seen.push(op.record_id().clone());
            let fail = op.is_create_for("temp_b");
            async move {
                if fail {
                    Err("remote unavailable")
                } else {
                    Ok(())
                }
            }
        }));

        // C was never attempted in this pass
        assert_eq!(seen, vec!["temp_a", "temp_b"]);
        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.failed.as_ref().map(|(op, _)| op.record_id().as_str()), Some("temp_b"));
        assert_eq!(report.remaining, 2);

        // B moved behind C
        let order: Vec<_> = queue.pending_ops().map(|p| p.operation.record_id().as_str()).collect();
        assert_eq!(order, vec!["gen_c", "temp_b"]);
        assert_eq!(queue.pending_ops().last().unwrap().attempts, 1);
    }

    #[test]
    fn dropped_drain_keeps_in_flight_operation() {
        use futures::future::{self, Either, FutureExt};

        let mut queue = PendingQueue::new();
        queue.enqueue(create("temp_a"), 1);
        queue.enqueue(create("temp_b"), 2);
        queue.enqueue(PendingOperation::delete("gen_c"), 3);

        // temp_a goes through, temp_b never completes and the pass is dropped.
        let outcome = queue
            .drain(|op| {
                if op.is_create_for("temp_b") {
                    Either::Left(future::pending::<Result<(), ()>>())
                } else {
                    Either::Right(future::ready(Ok(())))
                }
            })
            .now_or_never();
        assert!(outcome.is_none());

        let ops: Vec<_> = queue.pending_ops().collect();
        assert_eq!(ops.len(), 2);
        assert!(ops[0].operation.is_create_for("temp_b"));
        assert_eq!(ops[0].attempts, 0);
        assert_eq!(ops[1].operation, PendingOperation::delete("gen_c"));
    }

    #[test]
    fn discard_create_for_temp() {
        let mut queue = PendingQueue::new();
        queue.enqueue(create("temp_a"), 1);
        queue.enqueue(PendingOperation::delete("temp_a"), 2);

        assert!(queue.discard_create_for("temp_a"));
        assert!(!queue.discard_create_for("temp_a"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pending_ops().next().unwrap().operation.kind(), "delete");
    }
}
