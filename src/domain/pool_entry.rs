//! Per-asset pool balance with server-side metadata.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::Address;

/// Liquidity pool for a single asset.
///
/// `balance` is the only field a settlement unit touches; the remaining
/// fields are operational metadata updated after a unit commits.
#[derive(Debug, Clone)]
pub struct PoolEntry {
    /// Asset held by this pool (immutable after creation).
    pub asset: Address,

    /// Amount currently available to borrow, in the asset's smallest unit.
    pub balance: u128,

    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last committed mutation.
    pub last_modified_at: DateTime<Utc>,

    /// Number of successful fundings.
    pub funding_count: u64,

    /// Number of settled flash loans.
    pub loan_count: u64,

    /// Cumulative principal lent out by settled loans.
    pub total_borrowed: u128,

    /// Cumulative fees earned by settled loans.
    pub total_fees: u128,
}

impl PoolEntry {
    /// Creates an empty pool for `asset`.
    #[must_use]
    pub fn new(asset: Address) -> Self {
        let now = Utc::now();
        Self {
            asset,
            balance: 0,
            created_at: now,
            last_modified_at: now,
            funding_count: 0,
            loan_count: 0,
            total_borrowed: 0,
            total_fees: 0,
        }
    }
}

/// Lightweight summary of a pool for list endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PoolSummary {
    /// Pool asset.
    #[schema(value_type = String)]
    pub asset: Address,
    /// Current balance (string-encoded u128).
    pub balance: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Number of successful fundings.
    pub funding_count: u64,
    /// Number of settled flash loans.
    pub loan_count: u64,
}

impl From<&PoolEntry> for PoolSummary {
    fn from(entry: &PoolEntry) -> Self {
        Self {
            asset: entry.asset,
            balance: entry.balance.to_string(),
            created_at: entry.created_at,
            funding_count: entry.funding_count,
            loan_count: entry.loan_count,
        }
    }
}
