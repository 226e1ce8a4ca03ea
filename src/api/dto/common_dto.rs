//! Shared DTO types and request-field parsers.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Address;
use crate::error::GatewayError;

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `per_page` to the allowed maximum of 100.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }
}

/// Parses a string-encoded u128 amount.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidAmount`] naming `field` if the value is
/// not a decimal unsigned integer.
pub fn parse_amount(field: &str, value: &str) -> Result<u128, GatewayError> {
    value
        .trim()
        .parse()
        .map_err(|_| GatewayError::InvalidAmount(format!("{field}: {value}")))
}

/// Parses a `0x`-prefixed account address.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidAddress`] on malformed input.
pub fn parse_address(value: &str) -> Result<Address, GatewayError> {
    value.trim().parse()
}

/// Decodes an optional hex payload (`0x` prefix optional). Missing or empty
/// input decodes to no bytes.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if the payload is not valid hex.
pub fn parse_params(value: Option<&str>) -> Result<Vec<u8>, GatewayError> {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Vec::new());
    };
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(digits).map_err(|e| GatewayError::InvalidRequest(format!("invalid params: {e}")))
}
