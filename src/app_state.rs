//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::FlashLoanService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Flash-loan service for all settlement logic.
    pub flash_loan_service: Arc<FlashLoanService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}
