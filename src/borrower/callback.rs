//! Borrower callback interface and the capability it is handed.

use std::fmt;

use crate::domain::{Address, Loan, SettlementUnit};
use crate::error::GatewayError;

/// Code that receives a flash loan and must repay it before returning.
///
/// The executor calls [`FlashBorrower::on_flash_loan`] after the principal
/// has left the pool. The callback is untrusted: it can only reach the
/// ledger through the [`LoanContext`] it is given, and every change it makes
/// is undone if the loan is not repaid, if it returns an error, or if it
/// panics.
pub trait FlashBorrower: fmt::Debug + Send + Sync {
    /// Human-readable strategy name, shown by `GET /config/borrowers`.
    fn name(&self) -> &str;

    /// Runs the borrower's logic for `loan`.
    ///
    /// `params` is the opaque payload supplied with the loan request.
    ///
    /// # Errors
    ///
    /// Any error aborts the settlement unit and rolls it back.
    fn on_flash_loan(
        &self,
        ctx: &mut LoanContext<'_, '_>,
        loan: &Loan,
        params: &[u8],
    ) -> anyhow::Result<()>;
}

/// Ledger capability handed to a borrower callback.
///
/// Exposes only `balance_of`, `debit` and `credit`, all routed through the
/// settlement unit's journal. Mutations are limited to the pool of the loan
/// asset; every other pool is read-only for the callback.
pub struct LoanContext<'a, 'l> {
    unit: &'a mut SettlementUnit<'l>,
    asset: Address,
}

impl<'a, 'l> LoanContext<'a, 'l> {
    pub(crate) fn new(unit: &'a mut SettlementUnit<'l>, asset: Address) -> Self {
        Self { unit, asset }
    }

    /// Asset the loan was drawn from, the only pool this context can move.
    #[must_use]
    pub const fn asset(&self) -> Address {
        self.asset
    }

    /// Returns the current balance of `asset`'s pool.
    #[must_use]
    pub fn balance_of(&self, asset: Address) -> u128 {
        self.unit.balance_of(asset)
    }

    /// Takes `amount` out of `asset`'s pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AssetOutOfScope`] for any asset other than the
    /// loan asset, [`GatewayError::InsufficientLiquidity`] if the pool holds
    /// less than `amount`, or [`GatewayError::InvalidAmount`] for zero.
    pub fn debit(&mut self, asset: Address, amount: u128) -> Result<(), GatewayError> {
        self.check_scope(asset)?;
        self.unit.debit(asset, amount)
    }

    /// Pays `amount` into `asset`'s pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AssetOutOfScope`] for any asset other than the
    /// loan asset, [`GatewayError::InvalidAmount`] for zero or
    /// [`GatewayError::AmountOverflow`] if the balance would overflow.
    pub fn credit(&mut self, asset: Address, amount: u128) -> Result<(), GatewayError> {
        self.check_scope(asset)?;
        self.unit.credit(asset, amount)
    }

    fn check_scope(&self, asset: Address) -> Result<(), GatewayError> {
        if asset == self.asset {
            Ok(())
        } else {
            Err(GatewayError::AssetOutOfScope {
                asset,
                loan_asset: self.asset,
            })
        }
    }
}

impl fmt::Debug for LoanContext<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoanContext")
            .field("asset", &self.asset)
            .field("journal_len", &self.unit.journal_len())
            .finish()
    }
}
