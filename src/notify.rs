//! Rollover update notifications.
//!
//! [`UpdateBroadcaster`] is the connection manager for "rollover updated"
//! events: subscribers register for a receiver, the rollover engine
//! broadcasts one event per month it commits during a chain walk. Delivery
//! is best-effort; a subscriber that went away is dropped and logged, and a
//! send failure never propagates into the engine.

use crate::core::month::YearMonth;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, trace};

/// Event emitted when a chain walk commits new rollover values for a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverUpdate {
    /// Party whose budget changed
    pub owner_id: i64,
    /// The month whose rollover values were updated
    pub month: YearMonth,
}

/// Identifies one registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Registry of live subscribers with an explicit lifecycle:
/// register, unregister, broadcast.
#[derive(Debug, Clone, Default)]
pub struct UpdateBroadcaster {
    subscribers: Arc<RwLock<HashMap<u64, UnboundedSender<RolloverUpdate>>>>,
    next_id: Arc<AtomicU64>,
}

impl UpdateBroadcaster {
    /// Creates an empty broadcaster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber and returns its id and event receiver.
    ///
    /// Dropping the receiver is enough to stop delivery; the sender side is
    /// pruned on the next broadcast. [`Self::unregister`] removes it eagerly.
    pub async fn register(&self) -> (SubscriberId, UnboundedReceiver<RolloverUpdate>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = unbounded_channel();
        self.subscribers.write().await.insert(id, tx);
        debug!("Registered rollover subscriber {id}");
        (SubscriberId(id), rx)
    }

    /// Removes a subscriber.
    pub async fn unregister(&self, id: SubscriberId) {
        if self.subscribers.write().await.remove(&id.0).is_some() {
            debug!("Unregistered rollover subscriber {}", id.0);
        }
    }

    /// Number of currently registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Delivers an update to every live subscriber, pruning dead ones.
    pub async fn broadcast(&self, update: RolloverUpdate) {
        let mut subscribers = self.subscribers.write().await;
        let mut dead = Vec::new();

        for (id, tx) in subscribers.iter() {
            if tx.send(update.clone()).is_err() {
                dead.push(*id);
            }
        }

        for id in dead {
            subscribers.remove(&id);
            debug!("Dropped disconnected rollover subscriber {id}");
        }

        trace!(
            "Broadcast rollover update for {} to {} subscribers",
            update.month,
            subscribers.len()
        );
    }
}
