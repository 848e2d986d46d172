//! Connectivity monitor.
//!
//! Holds the current online/offline state reported by the platform and
//! publishes every transition to registered subscribers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Sender half held by the monitor for one subscriber.
type StateSender = mpsc::UnboundedSender<bool>;

/// Receiving end of a connectivity subscription.
///
/// Each transition is delivered once, in the order it was reported. Dropping
/// the subscription unregisters it on the next publish.
#[derive(Debug)]
pub struct Subscription {
    /// Unique identifier for this subscription
    pub id: String,
    receiver: mpsc::UnboundedReceiver<bool>,
}

impl Subscription {
    /// Wait for the next transition. `true` means online.
    ///
    /// Returns `None` once the monitor is gone.
    pub async fn recv(&mut self) -> Option<bool> {
        self.receiver.recv().await
    }

    /// Take a transition that has already been published, if any.
    pub fn try_recv(&mut self) -> Option<bool> {
        self.receiver.try_recv().ok()
    }
}

/// Tracks the platform's connectivity signal.
///
/// The monitor does no probing of its own: whatever the platform reports is
/// taken as the truth, even when it is stale.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    online: AtomicBool,
    /// Orders concurrent reports so deliveries match the final state.
    reports: Mutex<()>,
    /// Active subscribers, keyed by subscription ID.
    subscribers: DashMap<String, StateSender>,
}

impl ConnectivityMonitor {
    /// Create a monitor with the given initial state.
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
            reports: Mutex::new(()),
            subscribers: DashMap::new(),
        }
    }

    /// Create a new monitor wrapped in Arc for sharing.
    pub fn new_shared(online: bool) -> Arc<Self> {
        Arc::new(Self::new(online))
    }

    /// Whether the platform last reported the network as reachable.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Whether the platform last reported the network as unreachable.
    pub fn is_offline(&self) -> bool {
        !self.is_online()
    }

    /// Register for transition notifications.
    pub fn subscribe(&self) -> Subscription {
        let id = uuid::Uuid::new_v4().to_string();
        let (sender, receiver) = mpsc::unbounded_channel();

        self.subscribers.insert(id.clone(), sender);
        tracing::debug!(subscription = %id, "Connectivity subscriber registered");

        Subscription { id, receiver }
    }

    /// Remove a subscription explicitly.
    pub fn unsubscribe(&self, id: &str) {
        if self.subscribers.remove(id).is_some() {
            tracing::debug!(subscription = %id, "Connectivity subscriber removed");
        }
    }

    /// Record a report from the platform signal.
    ///
    /// Returns whether the report was a transition. Repeating the current
    /// state publishes nothing. Concurrent reports are delivered in the order
    /// they changed the state, so the last value a subscriber sees is always
    /// the current one.
    pub fn report(&self, online: bool) -> bool {
        let _ordered = self.reports.lock();
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous == online {
            tracing::trace!(online, "Connectivity unchanged");
            return false;
        }

        if online {
            tracing::info!("Network: online");
        } else {
            tracing::warn!("Network: offline");
        }

        self.publish(online);
        true
    }

    /// Send a state to every subscriber.
    ///
    /// Senders are copied out first so no map lock is held while notifying;
    /// a subscriber reacting to the message may call back into the monitor.
    /// Sends only enqueue, so the report lock is never held while subscriber
    /// code runs.
    fn publish(&self, online: bool) {
        let targets: Vec<(String, StateSender)> = self
            .subscribers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut delivered = 0;
        for (id, sender) in targets {
            if sender.send(online).is_ok() {
                delivered += 1;
            } else {
                self.subscribers.remove(&id);
            }
        }

        tracing::debug!(online, recipients = delivered, "Published connectivity change");
    }

    /// Get the number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}
