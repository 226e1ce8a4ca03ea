//! Receipts surfaced for committed settlement units.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Address;

/// Kind of unit a receipt confirms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptKind {
    /// Liquidity added to a pool.
    Funding,
    /// Flash loan borrowed and repaid.
    FlashLoan,
}

/// Proof that a unit committed.
///
/// Units that revert return their error instead of a receipt.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionReceipt {
    /// Identifier generated for this unit.
    pub transaction_id: Uuid,
    /// What the unit did.
    pub kind: ReceiptKind,
    /// Sequence number of the event the unit emitted.
    pub event_sequence: u64,
    /// Pool asset.
    #[schema(value_type = String)]
    pub asset: Address,
    /// Funder or borrower.
    #[schema(value_type = String)]
    pub counterparty: Address,
    /// Amount funded or borrowed (string-encoded u128).
    pub amount: String,
    /// Fee charged, for flash loans (string-encoded u128).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    /// Pool balance after commit (string-encoded u128).
    pub pool_balance: String,
    /// Commit timestamp.
    pub committed_at: DateTime<Utc>,
}
