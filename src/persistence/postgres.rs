//! PostgreSQL implementation of the persistence layer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::models::StoredEvent;
use crate::domain::RecordedEvent;
use crate::error::GatewayError;

const CREATE_LEDGER_EVENTS: &str = "CREATE TABLE IF NOT EXISTS ledger_events (\
     sequence BIGINT PRIMARY KEY, \
     asset TEXT NOT NULL, \
     event_type TEXT NOT NULL, \
     payload JSONB NOT NULL, \
     recorded_at TIMESTAMPTZ NOT NULL DEFAULT now())";

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `ledger_events` table if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), GatewayError> {
        sqlx::query(CREATE_LEDGER_EVENTS)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    /// Appends a committed event. Re-inserting a sequence is a no-op.
    ///
    /// Returns `true` if a row was written.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database or
    /// serialization failure.
    pub async fn save_event(&self, recorded: &RecordedEvent) -> Result<bool, GatewayError> {
        let sequence = i64::try_from(recorded.sequence).map_err(|_| {
            GatewayError::PersistenceError(format!(
                "sequence {} exceeds BIGINT range",
                recorded.sequence
            ))
        })?;
        let payload = serde_json::to_value(&recorded.event)
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO ledger_events (sequence, asset, event_type, payload) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (sequence) DO NOTHING",
        )
        .bind(sequence)
        .bind(recorded.event.asset().to_string())
        .bind(recorded.event.event_type_str())
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    /// Loads events with a sequence greater than `after`, in sequence order.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn load_events_after(&self, after: i64) -> Result<Vec<StoredEvent>, GatewayError> {
        let rows = sqlx::query_as::<_, (i64, String, String, serde_json::Value, DateTime<Utc>)>(
            "SELECT sequence, asset, event_type, payload, recorded_at FROM ledger_events \
             WHERE sequence > $1 ORDER BY sequence ASC",
        )
        .bind(after)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(sequence, asset, event_type, payload, recorded_at)| StoredEvent {
                    sequence,
                    asset,
                    event_type,
                    payload,
                    recorded_at,
                },
            )
            .collect())
    }
}
