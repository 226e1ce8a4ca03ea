//! Persistence layer: PostgreSQL copy of the event log.
//!
//! When enabled, the service is rebuilt at startup from the `ledger_events`
//! table (see [`load_history`]), then a background writer subscribes to the
//! [`EventBus`] and copies every newly committed event into the table via
//! `sqlx::PgPool`.

pub mod models;
pub mod postgres;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::domain::{EventBus, RecordedEvent};
use crate::error::GatewayError;
pub use postgres::PostgresPersistence;

/// Reads the whole stored event log, decoded and in sequence order.
///
/// # Errors
///
/// Returns a [`GatewayError::PersistenceError`] on database failure or on a
/// row that does not decode.
pub async fn load_history(
    persistence: &PostgresPersistence,
) -> Result<Vec<RecordedEvent>, GatewayError> {
    persistence
        .load_events_after(0)
        .await?
        .into_iter()
        .map(models::StoredEvent::into_recorded)
        .collect()
}

/// Spawns a task that writes every event published on `bus` to Postgres.
///
/// The task ends when the bus is closed. Write failures and sequences the
/// table already holds are logged and the event is skipped.
pub fn spawn_event_writer(persistence: PostgresPersistence, bus: &EventBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(recorded) => match persistence.save_event(&recorded).await {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::warn!(
                            sequence = recorded.sequence,
                            "event sequence already stored, event not persisted"
                        );
                    }
                    Err(e) => {
                        tracing::error!(sequence = recorded.sequence, error = %e, "failed to persist event");
                    }
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "event writer lagged behind event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::info!("event writer stopped");
    })
}
