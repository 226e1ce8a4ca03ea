//! Built-in borrower strategies.
//!
//! [`RepayingBorrower`] always returns principal plus fee (plus a surplus,
//! standing in for an arbitrage profit). [`ShortfallBorrower`] comes up short
//! by a fixed amount, so its loans revert unless the shortfall is covered by
//! the fee rounding.

use anyhow::Context;

use super::{FlashBorrower, LoanContext};
use crate::domain::Loan;

/// Repays `principal + fee + surplus`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepayingBorrower {
    surplus: u128,
}

impl RepayingBorrower {
    /// Creates a borrower paying `surplus` on top of the required repayment.
    #[must_use]
    pub const fn new(surplus: u128) -> Self {
        Self { surplus }
    }
}

impl FlashBorrower for RepayingBorrower {
    fn name(&self) -> &str {
        "repaying"
    }

    fn on_flash_loan(
        &self,
        ctx: &mut LoanContext<'_, '_>,
        loan: &Loan,
        params: &[u8],
    ) -> anyhow::Result<()> {
        let repayment = loan
            .repayment()
            .and_then(|due| due.checked_add(self.surplus))
            .context("repayment overflows u128")?;
        tracing::trace!(asset = %loan.asset, repayment, params_len = params.len(), "repaying loan");
        ctx.credit(loan.asset, repayment)?;
        Ok(())
    }
}

/// Repays `principal + fee - shortfall` (never less than zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortfallBorrower {
    shortfall: u128,
}

impl ShortfallBorrower {
    /// Creates a borrower that keeps back `shortfall` of the repayment.
    #[must_use]
    pub const fn new(shortfall: u128) -> Self {
        Self { shortfall }
    }
}

impl FlashBorrower for ShortfallBorrower {
    fn name(&self) -> &str {
        "shortfall"
    }

    fn on_flash_loan(
        &self,
        ctx: &mut LoanContext<'_, '_>,
        loan: &Loan,
        _params: &[u8],
    ) -> anyhow::Result<()> {
        let repayment = loan
            .repayment()
            .context("repayment overflows u128")?
            .saturating_sub(self.shortfall);
        if repayment > 0 {
            ctx.credit(loan.asset, repayment)?;
        }
        Ok(())
    }
}
