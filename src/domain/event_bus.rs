//! Broadcast channel for committed ledger events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The
//! [`super::EventLog`] publishes every recorded event through the bus, and
//! WebSocket connections and the persistence writer subscribe to it.

use tokio::sync::broadcast;

use super::RecordedEvent;

/// Broadcast bus for [`RecordedEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity
/// (default 10 000). When the ring buffer is full, the oldest events are
/// dropped for lagging receivers; they can catch up from the event log.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RecordedEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: RecordedEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RecordedEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
