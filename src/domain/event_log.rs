//! Append-only log of committed ledger events.

use super::{EventBus, LedgerEvent, RecordedEvent};
use crate::error::GatewayError;

/// Append-only record of every committed funding and flash loan.
///
/// Sequence numbers start at 1 and increase by one per recorded event. A log
/// rebuilt from storage continues after the highest restored sequence. The
/// log never removes entries. Each recorded event is published on the
/// attached [`EventBus`] right after it is appended.
#[derive(Debug)]
pub struct EventLog {
    entries: Vec<RecordedEvent>,
    next_sequence: u64,
    bus: EventBus,
}

impl EventLog {
    /// Creates an empty log publishing to `bus`.
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self {
            entries: Vec::new(),
            next_sequence: 1,
            bus,
        }
    }

    /// Appends `event`, publishes it, and returns the stored entry.
    pub fn record(&mut self, event: LedgerEvent) -> RecordedEvent {
        let recorded = RecordedEvent {
            sequence: self.next_sequence,
            event,
        };
        self.next_sequence = self.next_sequence.saturating_add(1);
        self.entries.push(recorded.clone());

        let receivers = self.bus.publish(recorded.clone());
        tracing::debug!(
            sequence = recorded.sequence,
            event_type = recorded.event.event_type_str(),
            receivers,
            "event recorded"
        );
        recorded
    }

    /// Appends an event read back from durable storage without publishing it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] unless `recorded.sequence` is
    /// greater than every sequence already in the log.
    pub fn restore(&mut self, recorded: RecordedEvent) -> Result<(), GatewayError> {
        if recorded.sequence < self.next_sequence {
            return Err(GatewayError::InvalidRequest(format!(
                "event sequence {} out of order, expected at least {}",
                recorded.sequence, self.next_sequence
            )));
        }
        self.next_sequence = recorded.sequence.saturating_add(1);
        self.entries.push(recorded);
        Ok(())
    }

    /// Returns all entries in commit order.
    #[must_use]
    pub fn entries(&self) -> &[RecordedEvent] {
        &self.entries
    }

    /// Returns up to `limit` entries with a sequence greater than `after`.
    #[must_use]
    pub fn entries_after(&self, after: u64, limit: usize) -> &[RecordedEvent] {
        let start = self.entries.partition_point(|entry| entry.sequence <= after);
        let tail = self.entries.get(start..).unwrap_or(&[]);
        tail.get(..limit.min(tail.len())).unwrap_or(tail)
    }

    /// Returns the sequence number of the latest entry, zero when empty.
    #[must_use]
    pub fn last_sequence(&self) -> u64 {
        self.entries.last().map_or(0, |entry| entry.sequence)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
