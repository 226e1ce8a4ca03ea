//! Journaled all-or-nothing view over the pool ledger.
//!
//! A [`SettlementUnit`] holds exclusive access to the [`PoolLedger`] for the
//! duration of one flash loan. Every debit and credit made through it records
//! the balance it replaced; [`SettlementUnit::commit`] keeps the changes and
//! [`SettlementUnit::rollback`] restores them in reverse order. A unit dropped
//! without a commit (early return, unwinding) rolls itself back.

use super::{Address, PoolLedger};
use crate::error::GatewayError;

/// Balance an asset held before one journaled mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JournalEntry {
    asset: Address,
    previous: Option<u128>,
}

/// Exclusive, undoable access to the ledger for one settlement unit.
#[derive(Debug)]
pub(crate) struct SettlementUnit<'l> {
    ledger: &'l mut PoolLedger,
    journal: Vec<JournalEntry>,
    committed: bool,
}

impl<'l> SettlementUnit<'l> {
    /// Opens a unit over `ledger`.
    pub(crate) fn begin(ledger: &'l mut PoolLedger) -> Self {
        Self {
            ledger,
            journal: Vec::new(),
            committed: false,
        }
    }

    /// Returns the balance of `asset` as seen inside the unit.
    #[must_use]
    pub(crate) fn balance_of(&self, asset: Address) -> u128 {
        self.ledger.balance_of(asset)
    }

    /// Removes `amount` from the pool of `asset`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidAmount`] for zero and
    /// [`GatewayError::InsufficientLiquidity`] when the pool holds less than
    /// `amount`. A failed debit records nothing.
    pub(crate) fn debit(&mut self, asset: Address, amount: u128) -> Result<(), GatewayError> {
        let previous = self.ledger.debit(asset, amount)?;
        self.journal.push(JournalEntry { asset, previous });
        Ok(())
    }

    /// Adds `amount` to the pool of `asset`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidAmount`] for zero,
    /// [`GatewayError::InvalidAsset`] for the zero address and
    /// [`GatewayError::AmountOverflow`] if the balance would overflow.
    pub(crate) fn credit(&mut self, asset: Address, amount: u128) -> Result<(), GatewayError> {
        let previous = self.ledger.credit(asset, amount)?;
        self.journal.push(JournalEntry { asset, previous });
        Ok(())
    }

    /// Number of mutations recorded so far.
    #[must_use]
    pub(crate) fn journal_len(&self) -> usize {
        self.journal.len()
    }

    /// Keeps every change made through the unit.
    pub(crate) fn commit(mut self) {
        self.journal.clear();
        self.committed = true;
    }

    /// Undoes every change made through the unit.
    pub(crate) fn rollback(mut self) {
        self.undo();
    }

    fn undo(&mut self) {
        while let Some(entry) = self.journal.pop() {
            self.ledger.restore(entry.asset, entry.previous);
        }
    }
}

impl Drop for SettlementUnit<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.undo();
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn asset(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    fn funded_ledger() -> PoolLedger {
        let mut ledger = PoolLedger::new();
        let _ = ledger.fund(asset(1), 1_000);
        ledger
    }

    #[test]
    fn commit_keeps_changes() {
        let mut ledger = funded_ledger();
        let mut unit = SettlementUnit::begin(&mut ledger);
        assert!(unit.debit(asset(1), 400).is_ok());
        assert!(unit.credit(asset(1), 500).is_ok());
        assert_eq!(unit.balance_of(asset(1)), 1_100);
        assert_eq!(unit.journal_len(), 2);
        unit.commit();
        assert_eq!(ledger.balance_of(asset(1)), 1_100);
    }

    #[test]
    fn rollback_restores_every_asset() {
        let mut ledger = funded_ledger();
        let mut unit = SettlementUnit::begin(&mut ledger);
        assert!(unit.debit(asset(1), 1_000).is_ok());
        assert!(unit.credit(asset(2), 77).is_ok());
        assert!(unit.credit(asset(1), 3).is_ok());
        unit.rollback();
        assert_eq!(ledger.balance_of(asset(1)), 1_000);
        assert!(ledger.get(asset(2)).is_none());
    }

    #[test]
    fn drop_without_commit_rolls_back() {
        let mut ledger = funded_ledger();
        {
            let mut unit = SettlementUnit::begin(&mut ledger);
            assert!(unit.debit(asset(1), 250).is_ok());
        }
        assert_eq!(ledger.balance_of(asset(1)), 1_000);
    }

    #[test]
    fn unwinding_rolls_back() {
        let mut ledger = funded_ledger();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut unit = SettlementUnit::begin(&mut ledger);
            let _ = unit.debit(asset(1), 600);
            panic!("callback blew up");
        }));
        assert!(result.is_err());
        assert_eq!(ledger.balance_of(asset(1)), 1_000);
    }

    #[test]
    fn failed_debit_is_not_journaled() {
        let mut ledger = funded_ledger();
        let mut unit = SettlementUnit::begin(&mut ledger);
        assert!(unit.debit(asset(1), 5_000).is_err());
        assert_eq!(unit.journal_len(), 0);
        unit.commit();
        assert_eq!(ledger.balance_of(asset(1)), 1_000);
    }
}
