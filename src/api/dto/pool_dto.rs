//! Pool-related DTOs for fund, get, and list operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::{Address, PoolEntry, PoolSummary};

/// Request body for `POST /pools/{asset}/fund`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FundPoolRequest {
    /// Address supplying the liquidity.
    pub funder: String,
    /// Amount to add (string-encoded u128).
    pub amount: String,
}

/// Single pool detail for `GET /pools/{asset}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolDetailResponse {
    /// Pool asset.
    #[schema(value_type = String)]
    pub asset: Address,
    /// Current balance (string-encoded u128).
    pub balance: String,
    /// Largest amount a single flash loan can borrow.
    pub max_flash_loan: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Number of successful fundings.
    pub funding_count: u64,
    /// Number of settled flash loans.
    pub loan_count: u64,
    /// Cumulative principal lent (string-encoded u128).
    pub total_borrowed: String,
    /// Cumulative fees earned (string-encoded u128).
    pub total_fees: String,
}

impl From<&PoolEntry> for PoolDetailResponse {
    fn from(entry: &PoolEntry) -> Self {
        Self {
            asset: entry.asset,
            balance: entry.balance.to_string(),
            max_flash_loan: entry.balance.to_string(),
            created_at: entry.created_at,
            updated_at: entry.last_modified_at,
            funding_count: entry.funding_count,
            loan_count: entry.loan_count,
            total_borrowed: entry.total_borrowed.to_string(),
            total_fees: entry.total_fees.to_string(),
        }
    }
}

/// Paginated list response for `GET /pools`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolListResponse {
    /// Pool summaries.
    pub data: Vec<PoolSummary>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
