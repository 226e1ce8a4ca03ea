//! Per-asset liquidity balances.
//!
//! [`PoolLedger`] is the sole owner of pool balances. Funding is public;
//! debit and credit are crate-internal and only reachable through a
//! settlement unit, which journals every change so it can be
//! undone.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::pool_entry::{PoolEntry, PoolSummary};
use super::{Address, LedgerEvent};
use crate::error::GatewayError;

/// Store of every asset pool, keyed by asset address.
///
/// Not synchronized by itself: the service layer wraps it in a lock so
/// that a settlement unit runs as a single critical section.
///
/// Balances only leave a pool through a flash loan. The journaled unit that
/// moves them is not reachable from outside the crate:
///
/// ```compile_fail
/// use flashpool_gateway::domain::{PoolLedger, SettlementUnit};
///
/// let mut ledger = PoolLedger::new();
/// let mut unit = SettlementUnit::begin(&mut ledger);
/// ```
#[derive(Debug, Default)]
pub struct PoolLedger {
    pools: HashMap<Address, PoolEntry>,
}

impl PoolLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` of `asset` to its pool, creating the pool if needed.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidAmount`] if `amount` is zero.
    /// - [`GatewayError::InvalidAsset`] for the zero address.
    /// - [`GatewayError::AmountOverflow`] if the balance would exceed
    ///   `u128::MAX`; the ledger is left unchanged.
    pub fn fund(&mut self, asset: Address, amount: u128) -> Result<u128, GatewayError> {
        if amount == 0 {
            return Err(GatewayError::InvalidAmount(
                "funding amount must be greater than zero".to_string(),
            ));
        }
        if asset.is_zero() {
            return Err(GatewayError::InvalidAsset(asset));
        }

        let new_balance = self
            .balance_of(asset)
            .checked_add(amount)
            .ok_or(GatewayError::AmountOverflow(asset))?;

        let entry = self
            .pools
            .entry(asset)
            .or_insert_with(|| PoolEntry::new(asset));
        entry.balance = new_balance;
        entry.funding_count = entry.funding_count.saturating_add(1);
        entry.last_modified_at = Utc::now();
        Ok(new_balance)
    }

    /// Returns the balance of `asset`, or zero for an unknown asset.
    #[must_use]
    pub fn balance_of(&self, asset: Address) -> u128 {
        self.pools.get(&asset).map_or(0, |entry| entry.balance)
    }

    /// Returns the largest amount of `asset` a single flash loan can borrow.
    #[must_use]
    pub fn max_flash_loan(&self, asset: Address) -> u128 {
        self.balance_of(asset)
    }

    /// Returns the pool for `asset`, if it has ever been funded.
    #[must_use]
    pub fn get(&self, asset: Address) -> Option<&PoolEntry> {
        self.pools.get(&asset)
    }

    /// Returns summaries of all pools, ordered by asset address.
    #[must_use]
    pub fn list(&self) -> Vec<PoolSummary> {
        let mut summaries: Vec<PoolSummary> = self.pools.values().map(PoolSummary::from).collect();
        summaries.sort_by(|a, b| a.asset.cmp(&b.asset));
        summaries
    }

    /// Returns the number of pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Returns `true` if no pool has been funded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Removes `amount` from the pool. Returns the balance before the
    /// change, `None` if the pool did not exist.
    pub(crate) fn debit(
        &mut self,
        asset: Address,
        amount: u128,
    ) -> Result<Option<u128>, GatewayError> {
        if amount == 0 {
            return Err(GatewayError::InvalidAmount(
                "debit amount must be greater than zero".to_string(),
            ));
        }
        let available = self.balance_of(asset);
        let Some(entry) = self.pools.get_mut(&asset).filter(|_| available >= amount) else {
            return Err(GatewayError::InsufficientLiquidity {
                asset,
                requested: amount,
                available,
            });
        };
        let previous = entry.balance;
        entry.balance = previous - amount;
        Ok(Some(previous))
    }

    /// Adds `amount` to the pool, creating it if needed. Returns the
    /// balance before the change, `None` if the pool did not exist.
    pub(crate) fn credit(
        &mut self,
        asset: Address,
        amount: u128,
    ) -> Result<Option<u128>, GatewayError> {
        if amount == 0 {
            return Err(GatewayError::InvalidAmount(
                "credit amount must be greater than zero".to_string(),
            ));
        }
        if asset.is_zero() {
            return Err(GatewayError::InvalidAsset(asset));
        }
        let previous = self.pools.get(&asset).map(|entry| entry.balance);
        let new_balance = previous
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(GatewayError::AmountOverflow(asset))?;
        self.pools
            .entry(asset)
            .or_insert_with(|| PoolEntry::new(asset))
            .balance = new_balance;
        Ok(previous)
    }

    /// Puts a balance back to a value observed earlier. `None` removes a
    /// pool that did not exist at that point.
    pub(crate) fn restore(&mut self, asset: Address, previous: Option<u128>) {
        match previous {
            Some(balance) => {
                self.pools
                    .entry(asset)
                    .or_insert_with(|| PoolEntry::new(asset))
                    .balance = balance;
            }
            None => {
                self.pools.remove(&asset);
            }
        }
    }

    /// Updates loan metadata after a settlement unit committed.
    pub(crate) fn record_settlement(&mut self, asset: Address, principal: u128, fee: u128) {
        if let Some(entry) = self.pools.get_mut(&asset) {
            entry.loan_count = entry.loan_count.saturating_add(1);
            entry.total_borrowed = entry.total_borrowed.saturating_add(principal);
            entry.total_fees = entry.total_fees.saturating_add(fee);
            entry.last_modified_at = Utc::now();
        }
    }

    /// Re-applies a committed event read back from durable storage.
    ///
    /// The pool is set to the balance the event recorded; counters and
    /// timestamps follow the event.
    pub(crate) fn apply(&mut self, event: &LedgerEvent) -> Result<(), GatewayError> {
        match event {
            LedgerEvent::PoolFunded {
                asset,
                new_balance,
                timestamp,
                ..
            } => {
                let balance = parse_stored("new_balance", new_balance)?;
                let entry = self.replayed_entry(*asset, *timestamp);
                entry.balance = balance;
                entry.funding_count = entry.funding_count.saturating_add(1);
                entry.last_modified_at = *timestamp;
            }
            LedgerEvent::FlashLoan {
                asset,
                amount,
                fee,
                new_balance,
                timestamp,
                ..
            } => {
                let principal = parse_stored("amount", amount)?;
                let fee = parse_stored("fee", fee)?;
                let balance = parse_stored("new_balance", new_balance)?;
                let entry = self.replayed_entry(*asset, *timestamp);
                entry.balance = balance;
                entry.loan_count = entry.loan_count.saturating_add(1);
                entry.total_borrowed = entry.total_borrowed.saturating_add(principal);
                entry.total_fees = entry.total_fees.saturating_add(fee);
                entry.last_modified_at = *timestamp;
            }
        }
        Ok(())
    }

    fn replayed_entry(&mut self, asset: Address, at: DateTime<Utc>) -> &mut PoolEntry {
        self.pools.entry(asset).or_insert_with(|| {
            let mut entry = PoolEntry::new(asset);
            entry.created_at = at;
            entry
        })
    }
}

fn parse_stored(field: &str, value: &str) -> Result<u128, GatewayError> {
    value
        .parse()
        .map_err(|_| GatewayError::InvalidAmount(format!("stored {field}: {value}")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn asset(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    #[test]
    fn unknown_asset_has_zero_balance() {
        let ledger = PoolLedger::new();
        assert_eq!(ledger.balance_of(asset(1)), 0);
        assert!(ledger.get(asset(1)).is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn fund_adds_to_prior_balance() {
        let mut ledger = PoolLedger::new();
        assert!(matches!(ledger.fund(asset(1), 1_000_000), Ok(1_000_000)));
        assert!(matches!(ledger.fund(asset(1), 500), Ok(1_000_500)));
        assert_eq!(ledger.balance_of(asset(1)), 1_000_500);

        let Some(entry) = ledger.get(asset(1)) else {
            panic!("pool exists");
        };
        assert_eq!(entry.funding_count, 2);
    }

    #[test]
    fn fund_rejects_zero_amount() {
        let mut ledger = PoolLedger::new();
        let result = ledger.fund(asset(1), 0);
        assert!(matches!(result, Err(GatewayError::InvalidAmount(_))));
        assert!(ledger.is_empty());
    }

    #[test]
    fn fund_rejects_zero_address() {
        let mut ledger = PoolLedger::new();
        let result = ledger.fund(Address::ZERO, 10);
        assert!(matches!(result, Err(GatewayError::InvalidAsset(_))));
    }

    #[test]
    fn fund_rejects_overflow_without_mutation() {
        let mut ledger = PoolLedger::new();
        let _ = ledger.fund(asset(1), u128::MAX - 1);
        let result = ledger.fund(asset(1), 2);
        assert!(matches!(result, Err(GatewayError::AmountOverflow(_))));
        assert_eq!(ledger.balance_of(asset(1)), u128::MAX - 1);
    }

    #[test]
    fn debit_beyond_balance_fails() {
        let mut ledger = PoolLedger::new();
        let _ = ledger.fund(asset(1), 100);
        let result = ledger.debit(asset(1), 101);
        let Err(GatewayError::InsufficientLiquidity {
            requested,
            available,
            ..
        }) = result
        else {
            panic!("expected insufficient liquidity");
        };
        assert_eq!(requested, 101);
        assert_eq!(available, 100);
        assert_eq!(ledger.balance_of(asset(1)), 100);
    }

    #[test]
    fn debit_unknown_asset_fails() {
        let mut ledger = PoolLedger::new();
        let result = ledger.debit(asset(9), 1);
        assert!(matches!(
            result,
            Err(GatewayError::InsufficientLiquidity { available: 0, .. })
        ));
    }

    #[test]
    fn debit_and_credit_report_previous_balance() {
        let mut ledger = PoolLedger::new();
        let _ = ledger.fund(asset(1), 100);
        assert!(matches!(ledger.debit(asset(1), 40), Ok(Some(100))));
        assert!(matches!(ledger.credit(asset(1), 10), Ok(Some(60))));
        assert!(matches!(ledger.credit(asset(2), 10), Ok(None)));
        assert_eq!(ledger.balance_of(asset(1)), 70);
        assert_eq!(ledger.balance_of(asset(2)), 10);
    }

    #[test]
    fn restore_none_removes_pool() {
        let mut ledger = PoolLedger::new();
        let _ = ledger.credit(asset(2), 10);
        ledger.restore(asset(2), None);
        assert!(ledger.get(asset(2)).is_none());
    }

    #[test]
    fn list_is_sorted_by_asset() {
        let mut ledger = PoolLedger::new();
        let _ = ledger.fund(asset(3), 1);
        let _ = ledger.fund(asset(1), 1);
        let _ = ledger.fund(asset(2), 1);
        let assets: Vec<Address> = ledger.list().iter().map(|s| s.asset).collect();
        assert_eq!(assets, vec![asset(1), asset(2), asset(3)]);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn apply_rebuilds_pool_from_events() {
        let mut ledger = PoolLedger::new();
        let funded = LedgerEvent::pool_funded(asset(1), asset(9), 1_000_000, 1_000_000);
        let loan = LedgerEvent::flash_loan(asset(1), asset(8), 100_000, 90, 1_000_097);
        assert!(ledger.apply(&funded).is_ok());
        assert!(ledger.apply(&loan).is_ok());

        assert_eq!(ledger.balance_of(asset(1)), 1_000_097);
        let Some(entry) = ledger.get(asset(1)) else {
            panic!("pool exists");
        };
        assert_eq!(entry.funding_count, 1);
        assert_eq!(entry.loan_count, 1);
        assert_eq!(entry.total_fees, 90);
    }

    #[test]
    fn apply_rejects_corrupt_amounts() {
        let mut ledger = PoolLedger::new();
        let corrupt = LedgerEvent::PoolFunded {
            asset: asset(1),
            funder: asset(2),
            amount: "5".to_string(),
            new_balance: "-5".to_string(),
            timestamp: Utc::now(),
        };
        assert!(matches!(
            ledger.apply(&corrupt),
            Err(GatewayError::InvalidAmount(_))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn record_settlement_updates_metadata() {
        let mut ledger = PoolLedger::new();
        let _ = ledger.fund(asset(1), 1_000_000);
        ledger.record_settlement(asset(1), 100_000, 90);
        let Some(entry) = ledger.get(asset(1)) else {
            panic!("pool exists");
        };
        assert_eq!(entry.loan_count, 1);
        assert_eq!(entry.total_borrowed, 100_000);
        assert_eq!(entry.total_fees, 90);
    }
}
