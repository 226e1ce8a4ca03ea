//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Address;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4002,
///     "message": "flash loan not repaid: required 1000900, got 999999",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`GatewayError`] code ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | Not Found       | 404 Not Found              |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
/// | 4000–4999 | Settlement      | 422 Unprocessable Entity   |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Amount is zero or cannot be parsed as an unsigned integer.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Malformed account or asset address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Address is well formed but cannot identify an asset.
    #[error("invalid asset: {0}")]
    InvalidAsset(Address),

    /// Borrower address has no registered callback.
    #[error("borrower not found: {0}")]
    BorrowerNotFound(Address),

    /// Pool balance is below the requested amount.
    #[error("insufficient liquidity for {asset}: requested {requested}, available {available}")]
    InsufficientLiquidity {
        /// Asset of the pool.
        asset: Address,
        /// Amount requested.
        requested: u128,
        /// Amount currently in the pool.
        available: u128,
    },

    /// Pool balance after the callback is below principal plus fee.
    #[error("flash loan not repaid: required {required}, got {actual}")]
    LoanNotRepaid {
        /// Minimum balance the pool had to reach.
        required: u128,
        /// Balance the pool actually held after the callback.
        actual: u128,
    },

    /// Borrower callback returned an error.
    #[error("borrower callback failed: {0}")]
    CallbackFailed(String),

    /// Borrower callback panicked.
    #[error("borrower callback panicked")]
    CallbackPanicked,

    /// Borrower callback touched a pool other than the one it borrowed from.
    #[error("asset {asset} is outside the loan scope of {loan_asset}")]
    AssetOutOfScope {
        /// Asset the callback tried to move.
        asset: Address,
        /// Asset the loan was drawn from.
        loan_asset: Address,
    },

    /// Balance arithmetic would exceed `u128::MAX`.
    #[error("amount overflow for {0}")]
    AmountOverflow(Address),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidAmount(_) => 1002,
            Self::InvalidAddress(_) => 1003,
            Self::InvalidAsset(_) => 1004,
            Self::BorrowerNotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::InsufficientLiquidity { .. } => 4001,
            Self::LoanNotRepaid { .. } => 4002,
            Self::CallbackFailed(_) => 4003,
            Self::CallbackPanicked => 4004,
            Self::AmountOverflow(_) => 4005,
            Self::AssetOutOfScope { .. } => 4006,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidAmount(_)
            | Self::InvalidAddress(_)
            | Self::InvalidAsset(_) => StatusCode::BAD_REQUEST,
            Self::BorrowerNotFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientLiquidity { .. }
            | Self::LoanNotRepaid { .. }
            | Self::CallbackFailed(_)
            | Self::CallbackPanicked
            | Self::AmountOverflow(_)
            | Self::AssetOutOfScope { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` if this error ended a settlement unit after
    /// disbursement, i.e. the unit was rolled back rather than rejected.
    #[must_use]
    pub const fn is_revert(&self) -> bool {
        matches!(
            self,
            Self::LoanNotRepaid { .. }
                | Self::CallbackFailed(_)
                | Self::CallbackPanicked
                | Self::AssetOutOfScope { .. }
        )
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
