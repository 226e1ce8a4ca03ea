//! Database models for the durable event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{LedgerEvent, RecordedEvent};
use crate::error::GatewayError;

/// A stored event row from the `ledger_events` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Sequence number assigned by the in-memory event log.
    pub sequence: i64,
    /// Pool asset the event belongs to, as `0x`-prefixed hex.
    pub asset: String,
    /// Event type discriminator (e.g. `"flash_loan"`).
    pub event_type: String,
    /// JSONB payload with the full event body.
    pub payload: serde_json::Value,
    /// Server-side insertion timestamp.
    pub recorded_at: DateTime<Utc>,
}

impl StoredEvent {
    /// Decodes the row back into the event the log recorded.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] for a negative sequence,
    /// an undecodable payload, or a payload disagreeing with the row's
    /// `event_type` column.
    pub fn into_recorded(self) -> Result<RecordedEvent, GatewayError> {
        let sequence = u64::try_from(self.sequence).map_err(|_| {
            GatewayError::PersistenceError(format!("negative sequence {}", self.sequence))
        })?;
        let event: LedgerEvent = serde_json::from_value(self.payload).map_err(|e| {
            GatewayError::PersistenceError(format!("event {sequence}: {e}"))
        })?;
        if event.event_type_str() != self.event_type {
            return Err(GatewayError::PersistenceError(format!(
                "event {sequence}: payload is {} but row says {}",
                event.event_type_str(),
                self.event_type
            )));
        }
        Ok(RecordedEvent { sequence, event })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Address;

    fn row(sequence: i64, event_type: &str, event: &LedgerEvent) -> StoredEvent {
        let Ok(payload) = serde_json::to_value(event) else {
            panic!("serialization failed");
        };
        StoredEvent {
            sequence,
            asset: event.asset().to_string(),
            event_type: event_type.to_string(),
            payload,
            recorded_at: Utc::now(),
        }
    }

    fn funding() -> LedgerEvent {
        LedgerEvent::pool_funded(
            Address::from_bytes([1u8; 20]),
            Address::from_bytes([2u8; 20]),
            500,
            500,
        )
    }

    #[test]
    fn row_decodes_to_recorded_event() {
        let event = funding();
        let Ok(recorded) = row(12, "pool_funded", &event).into_recorded() else {
            panic!("row should decode");
        };
        assert_eq!(recorded.sequence, 12);
        assert_eq!(recorded.event, event);
    }

    #[test]
    fn mismatched_type_is_rejected() {
        let result = row(1, "flash_loan", &funding()).into_recorded();
        assert!(matches!(result, Err(GatewayError::PersistenceError(_))));
    }

    #[test]
    fn negative_sequence_is_rejected() {
        let result = row(-1, "pool_funded", &funding()).into_recorded();
        assert!(matches!(result, Err(GatewayError::PersistenceError(_))));
    }
}
