//! Commit notifications.
//!
//! Two ways to listen: register a [`CommitObserver`] for synchronous
//! callbacks, or [`Notifier::subscribe`] to a broadcast channel. Delivery is
//! best effort. Observer errors are logged and dropped, and a send with no
//! live receivers is not an error.

use repokit_model::{Entity, Entry};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

/// Capacity of the broadcast channel. Slow receivers lag past this.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// States a commit moves through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPhase {
    #[default]
    Idle,
    DetectingChanges,
    NoChanges,
    Stamping,
    ResolvingConflicts,
    HasConflicts,
    Persisting,
    Committed,
    Failed,
}

/// Which side of persistence a notification fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStage {
    /// Stamped and resolved, about to be saved.
    Committing,
    /// Saved.
    Committed,
}

/// A commit notification.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitEvent<T> {
    pub stage: CommitStage,
    pub context_name: String,
    pub entity_type: &'static str,
    pub entries: Vec<Entry<T>>,
}

/// Error type observers may return. It is logged, never propagated.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Synchronous commit callback.
pub trait CommitObserver<T>: Send + Sync {
    /// Called before the pending entries are saved.
    fn on_committing(&self, _event: &CommitEvent<T>) -> Result<(), ObserverError> {
        Ok(())
    }

    /// Called after the entries were saved and accepted.
    fn on_committed(&self, event: &CommitEvent<T>) -> Result<(), ObserverError>;
}

/// Fans commit events out to observers and channel subscribers.
pub struct Notifier<T> {
    observers: Vec<Arc<dyn CommitObserver<T>>>,
    sender: broadcast::Sender<CommitEvent<T>>,
}

impl<T: Entity> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Notifier<T> {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            observers: Vec::new(),
            sender,
        }
    }

    pub fn register(&mut self, observer: Arc<dyn CommitObserver<T>>) {
        self.observers.push(observer);
    }

    /// Opens a receiver for every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CommitEvent<T>> {
        self.sender.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Delivers `event` to every observer, then to the channel.
    pub fn publish(&self, event: CommitEvent<T>) {
        for (idx, observer) in self.observers.iter().enumerate() {
            let result = match event.stage {
                CommitStage::Committing => observer.on_committing(&event),
                CommitStage::Committed => observer.on_committed(&event),
            };
            if let Err(e) = result {
                warn!(
                    "[{}] commit observer #{} failed on {:?}: {}",
                    event.context_name, idx, event.stage, e
                );
            }
        }
        // Err only means nobody is subscribed.
        let _ = self.sender.send(event);
    }
}
