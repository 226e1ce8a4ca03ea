//! Domain events reflecting committed ledger mutations.
//!
//! Every successful funding and every settled flash loan produces exactly one
//! [`LedgerEvent`]. The [`super::EventLog`] stamps it with a sequence number
//! and broadcasts it through the [`super::EventBus`]. Reverted units never
//! produce an event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Address;

/// Domain event emitted after a settlement unit commits.
///
/// Amounts are stored as `String` to preserve u128 precision when serialized
/// to JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A funder added liquidity to a pool.
    PoolFunded {
        /// Pool asset.
        asset: Address,
        /// Account that supplied the liquidity.
        funder: Address,
        /// Amount added (string-encoded u128).
        amount: String,
        /// Pool balance after the funding (string-encoded u128).
        new_balance: String,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A flash loan was borrowed and repaid within one unit.
    FlashLoan {
        /// Pool asset.
        asset: Address,
        /// Borrower whose callback ran.
        borrower: Address,
        /// Principal lent (string-encoded u128).
        amount: String,
        /// Fee charged (string-encoded u128).
        fee: String,
        /// Pool balance after the unit committed (string-encoded u128).
        new_balance: String,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// Builds a [`LedgerEvent::PoolFunded`] stamped with the current time.
    #[must_use]
    pub fn pool_funded(asset: Address, funder: Address, amount: u128, new_balance: u128) -> Self {
        Self::PoolFunded {
            asset,
            funder,
            amount: amount.to_string(),
            new_balance: new_balance.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Builds a [`LedgerEvent::FlashLoan`] stamped with the current time.
    #[must_use]
    pub fn flash_loan(
        asset: Address,
        borrower: Address,
        amount: u128,
        fee: u128,
        new_balance: u128,
    ) -> Self {
        Self::FlashLoan {
            asset,
            borrower,
            amount: amount.to_string(),
            fee: fee.to_string(),
            new_balance: new_balance.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Returns the pool asset associated with this event.
    #[must_use]
    pub const fn asset(&self) -> Address {
        match self {
            Self::PoolFunded { asset, .. } | Self::FlashLoan { asset, .. } => *asset,
        }
    }

    /// Returns the funder or borrower of this event.
    #[must_use]
    pub const fn counterparty(&self) -> Address {
        match self {
            Self::PoolFunded { funder, .. } => *funder,
            Self::FlashLoan { borrower, .. } => *borrower,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::PoolFunded { .. } => "pool_funded",
            Self::FlashLoan { .. } => "flash_loan",
        }
    }
}

/// A [`LedgerEvent`] with its position in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedEvent {
    /// Monotonic sequence number, starting at 1.
    pub sequence: u64,
    /// The committed event.
    #[serde(flatten)]
    pub event: LedgerEvent,
}
