//! Flash-loan and event-log DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::RecordedEvent;

/// Request body for `POST /flash-loans`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FlashLoanRequest {
    /// Asset to borrow.
    pub asset: String,
    /// Principal (string-encoded u128).
    pub amount: String,
    /// Registered borrower address.
    pub borrower: String,
    /// Hex payload forwarded to the borrower callback.
    #[serde(default)]
    pub params: Option<String>,
}

/// Query parameters for `GET /flash-loans/fee`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeeQuoteParams {
    /// Principal to quote (string-encoded u128).
    pub amount: String,
}

/// Response body for `GET /flash-loans/fee`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FeeQuoteResponse {
    /// Principal quoted (string-encoded u128).
    pub amount: String,
    /// Fee owed on top of the principal (string-encoded u128).
    pub fee: String,
    /// Principal plus fee (string-encoded u128).
    pub repayment: String,
    /// Fee rate in basis points.
    pub fee_bps: u32,
}

/// Query parameters for `GET /events`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    /// Return events with a sequence greater than this. Defaults to 0.
    #[serde(default)]
    pub after: u64,
    /// Maximum number of events (max 1000). Defaults to 100.
    #[serde(default = "default_event_limit")]
    pub limit: usize,
}

fn default_event_limit() -> usize {
    100
}

/// Response body for `GET /events`.
#[derive(Debug, Serialize)]
pub struct EventListResponse {
    /// Events in commit order.
    pub events: Vec<RecordedEvent>,
    /// Sequence of the latest event in the log.
    pub last_sequence: u64,
}
