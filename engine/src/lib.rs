//! # Tether Engine
//!
//! The in-memory core of an offline-resilient sync layer for a single remote
//! collection of generation records.
//!
//! This crate holds the state that survives connectivity gaps: a local mirror
//! of the remote collection and the queue of mutations that could not be
//! applied while offline. It performs no IO of its own; the remote calls are
//! supplied by the caller when the queue is drained.
//!
//! ## Design Principles
//!
//! - **No IO**: Engine has no knowledge of network, platform, or runtime
//! - **Single writer**: Callers serialize mutations; the types are plain data
//! - **Serializable**: Pending work is data, never captured closures
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Record`] is one persisted conversion: title, text content, a reference
//! to the generated audio and its creation time. Records whose id carries the
//! [`TEMP_ID_PREFIX`] are provisional: minted locally while offline and not yet
//! confirmed by the remote store.
//!
//! ### Local cache
//!
//! The [`LocalCache`] mirrors the remote collection ordered by `createdAt`
//! descending, with no duplicate ids.
//!
//! ### Pending operations
//!
//! Mutations that failed while offline are kept as [`PendingOperation`]s in a
//! FIFO [`PendingQueue`] and replayed with [`PendingQueue::drain`].
//!
//! ## Quick Start
//!
//! ```rust
//! use tether_engine::{LocalCache, NewRecord, PendingOperation, PendingQueue, Record, TempIdGenerator};
//!
//! let mut cache = LocalCache::new();
//! let mut queue = PendingQueue::new();
//! let ids = TempIdGenerator::new();
//!
//! // Offline: keep a provisional record and remember the create.
//! let payload = NewRecord::new("Promo A", "Hello there", "audio/promo-a.mp3");
//! let temp = Record::provisional(ids.mint(1706745600000), payload.clone(), 1706745600000);
//! cache.upsert(temp.clone());
//! queue.enqueue(PendingOperation::create(payload, temp.id.clone()), 1706745600000);
//!
//! assert!(temp.is_provisional());
//! assert_eq!(queue.len(), 1);
//!
//! // Back online: the remote store confirmed it under a real id.
//! let real = Record::new("gen_42", NewRecord::new("Promo A", "Hello there", "audio/promo-a.mp3"), 1706745601000);
//! cache.replace(&temp.id, real);
//! assert_eq!(cache.ids(), vec!["gen_42"]);
//! ```
//!
//! ## Persistence
//!
//! Nothing is persisted by the engine. [`QueueSnapshot`] offers an explicit,
//! format-versioned JSON export of the pending queue for callers that want it.

pub mod cache;
pub mod error;
pub mod id;
pub mod operation;
pub mod queue;
pub mod record;
pub mod snapshot;

// Re-export main types at crate root
pub use cache::LocalCache;
pub use error::Error;
pub use id::{is_temporary, TempIdGenerator, TEMP_ID_PREFIX};
pub use operation::{CreateOp, DeleteOp, PendingOperation};
pub use queue::{DrainReport, PendingOp, PendingQueue};
pub use record::{NewRecord, Record};
pub use snapshot::{QueueSnapshot, SNAPSHOT_FORMAT_VERSION};

/// Type aliases for clarity
pub type RecordId = String;
pub type Timestamp = u64;
