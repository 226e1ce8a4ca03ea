//! Atomic borrow, callback, repayment-check sequence.
//!
//! [`LoanExecutor::execute`] drives one request through the loan state
//! machine:
//!
//! ```text
//! Requested ──(amount > 0, balance >= amount)──▶ Disbursed
//!     │                                              │ borrower callback
//!     ▼                                              ▼
//!  rejected                                       Verified
//!  (no mutation)                          ┌──────────┴──────────┐
//!                          balance >= before + fee        otherwise
//!                                         ▼                     ▼
//!                                      Settled              Reverted
//! ```
//!
//! Everything between `Disbursed` and the terminal state runs inside one
//! settlement unit; `Reverted` restores the ledger exactly.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;

use super::{Address, FeePolicy, PoolLedger, SettlementUnit};
use crate::borrower::{FlashBorrower, LoanContext};
use crate::error::GatewayError;

/// Stage of a loan request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanState {
    /// Request received, nothing checked yet.
    Requested,
    /// Principal debited, borrower callback running.
    Disbursed,
    /// Callback returned, repayment being checked.
    Verified,
    /// Unit committed. Final state.
    Settled,
    /// Unit rolled back. Final state.
    Reverted,
}

impl LoanState {
    /// Whether this is a terminal state.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::Settled | Self::Reverted)
    }
}

impl fmt::Display for LoanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => write!(f, "Requested"),
            Self::Disbursed => write!(f, "Disbursed"),
            Self::Verified => write!(f, "Verified"),
            Self::Settled => write!(f, "Settled"),
            Self::Reverted => write!(f, "Reverted"),
        }
    }
}

/// A caller's request to borrow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRequest {
    /// Asset to borrow.
    pub asset: Address,
    /// Principal, in the asset's smallest unit.
    pub amount: u128,
    /// Registered borrower whose callback receives the funds.
    pub borrower: Address,
    /// Opaque payload forwarded to the callback.
    pub params: Vec<u8>,
}

/// A loan in flight. Lives only for the duration of one settlement unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Loan {
    /// Borrowed asset.
    pub asset: Address,
    /// Principal handed to the borrower.
    pub principal: u128,
    /// Fee owed on top of the principal.
    pub fee: u128,
    /// Borrower address.
    pub borrower: Address,
}

impl Loan {
    /// Returns `principal + fee`, or `None` on overflow.
    #[must_use]
    pub const fn repayment(&self) -> Option<u128> {
        self.principal.checked_add(self.fee)
    }
}

/// Outcome of a settled loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanSettlement {
    /// The loan as it was issued.
    pub loan: Loan,
    /// Pool balance before disbursement.
    pub balance_before: u128,
    /// Pool balance after the unit committed.
    pub balance_after: u128,
}

/// Runs flash loans against a [`PoolLedger`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoanExecutor {
    fee_policy: FeePolicy,
}

impl LoanExecutor {
    /// Creates an executor charging fees according to `fee_policy`.
    #[must_use]
    pub const fn new(fee_policy: FeePolicy) -> Self {
        Self { fee_policy }
    }

    /// Returns the fee policy in force.
    #[must_use]
    pub const fn fee_policy(&self) -> FeePolicy {
        self.fee_policy
    }

    /// Lends `request.amount` to `borrower` and settles or reverts.
    ///
    /// The caller must hold exclusive access to `ledger` for the whole call.
    ///
    /// # Errors
    ///
    /// Rejected before any mutation:
    /// - [`GatewayError::InvalidAmount`] for a zero amount.
    /// - [`GatewayError::InvalidAsset`] for the zero address.
    /// - [`GatewayError::InsufficientLiquidity`] if the pool holds less than
    ///   the amount.
    /// - [`GatewayError::AmountOverflow`] if balance plus fee overflows.
    ///
    /// Reverted, with every change since disbursement undone:
    /// - [`GatewayError::CallbackFailed`] if the callback returns an error.
    /// - [`GatewayError::CallbackPanicked`] if the callback panics.
    /// - [`GatewayError::AssetOutOfScope`] if the callback tried to move a
    ///   pool other than the loan asset and returned that error.
    /// - [`GatewayError::LoanNotRepaid`] if the pool ends below its prior
    ///   balance plus the fee.
    pub fn execute(
        &self,
        ledger: &mut PoolLedger,
        request: &LoanRequest,
        borrower: &dyn FlashBorrower,
    ) -> Result<LoanSettlement, GatewayError> {
        let asset = request.asset;
        let amount = request.amount;
        trace_state(LoanState::Requested, asset, amount);

        if amount == 0 {
            return Err(GatewayError::InvalidAmount(
                "loan amount must be greater than zero".to_string(),
            ));
        }
        if asset.is_zero() {
            return Err(GatewayError::InvalidAsset(asset));
        }
        let balance_before = ledger.balance_of(asset);
        if balance_before < amount {
            return Err(GatewayError::InsufficientLiquidity {
                asset,
                requested: amount,
                available: balance_before,
            });
        }

        let fee = self.fee_policy.compute_fee(amount);
        let required = balance_before
            .checked_add(fee)
            .ok_or(GatewayError::AmountOverflow(asset))?;
        let loan = Loan {
            asset,
            principal: amount,
            fee,
            borrower: request.borrower,
        };

        let mut unit = SettlementUnit::begin(ledger);
        unit.debit(asset, amount)?;
        trace_state(LoanState::Disbursed, asset, amount);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut ctx = LoanContext::new(&mut unit, asset);
            borrower.on_flash_loan(&mut ctx, &loan, &request.params)
        }));
        let callback_error = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(callback_failure(e)),
            Err(_) => Some(GatewayError::CallbackPanicked),
        };
        if let Some(err) = callback_error {
            unit.rollback();
            trace_state(LoanState::Reverted, asset, amount);
            return Err(err);
        }

        trace_state(LoanState::Verified, asset, amount);
        let balance_after = unit.balance_of(asset);
        if balance_after < required {
            unit.rollback();
            trace_state(LoanState::Reverted, asset, amount);
            return Err(GatewayError::LoanNotRepaid {
                required,
                actual: balance_after,
            });
        }

        unit.commit();
        ledger.record_settlement(asset, amount, fee);
        trace_state(LoanState::Settled, asset, amount);

        Ok(LoanSettlement {
            loan,
            balance_before,
            balance_after,
        })
    }
}

/// Surfaces a scope violation as itself; any other callback error is
/// reported as [`GatewayError::CallbackFailed`].
fn callback_failure(error: anyhow::Error) -> GatewayError {
    let message = format!("{error:#}");
    match error.downcast::<GatewayError>() {
        Ok(scope @ GatewayError::AssetOutOfScope { .. }) => scope,
        _ => GatewayError::CallbackFailed(message),
    }
}

fn trace_state(state: LoanState, asset: Address, amount: u128) {
    tracing::trace!(%state, %asset, amount, "loan state");
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::borrower::{RepayingBorrower, ShortfallBorrower};

    const INITIAL_LIQUIDITY: u128 = 1_000_000;

    fn asset() -> Address {
        Address::from_bytes([0x11; 20])
    }

    fn other_asset() -> Address {
        Address::from_bytes([0x22; 20])
    }

    fn borrower_address() -> Address {
        Address::from_bytes([0x33; 20])
    }

    fn funded_ledger() -> PoolLedger {
        let mut ledger = PoolLedger::new();
        let _ = ledger.fund(asset(), INITIAL_LIQUIDITY);
        ledger
    }

    fn request(amount: u128) -> LoanRequest {
        LoanRequest {
            asset: asset(),
            amount,
            borrower: borrower_address(),
            params: Vec::new(),
        }
    }

    /// Repays `repay` regardless of what is owed.
    #[derive(Debug)]
    struct FixedRepayment(u128);

    impl FlashBorrower for FixedRepayment {
        fn name(&self) -> &str {
            "fixed"
        }

        fn on_flash_loan(
            &self,
            ctx: &mut LoanContext<'_, '_>,
            loan: &Loan,
            _params: &[u8],
        ) -> anyhow::Result<()> {
            ctx.credit(loan.asset, self.0)?;
            Ok(())
        }
    }

    /// Repays the principal, then fails.
    #[derive(Debug)]
    struct FailingBorrower;

    impl FlashBorrower for FailingBorrower {
        fn name(&self) -> &str {
            "failing"
        }

        fn on_flash_loan(
            &self,
            ctx: &mut LoanContext<'_, '_>,
            loan: &Loan,
            _params: &[u8],
        ) -> anyhow::Result<()> {
            ctx.credit(loan.asset, loan.principal)?;
            anyhow::bail!("swap route unavailable")
        }
    }

    /// Empties another pool, then repays its own loan in full.
    #[derive(Debug)]
    struct CrossPoolDrainer;

    impl FlashBorrower for CrossPoolDrainer {
        fn name(&self) -> &str {
            "drainer"
        }

        fn on_flash_loan(
            &self,
            ctx: &mut LoanContext<'_, '_>,
            loan: &Loan,
            _params: &[u8],
        ) -> anyhow::Result<()> {
            let loot = ctx.balance_of(other_asset());
            ctx.debit(other_asset(), loot)?;
            ctx.credit(loan.asset, loan.principal + loan.fee)?;
            Ok(())
        }
    }

    /// Tries to seed an unrelated pool, ignores the refusal and repays.
    #[derive(Debug)]
    struct StrayCreditor;

    impl FlashBorrower for StrayCreditor {
        fn name(&self) -> &str {
            "stray"
        }

        fn on_flash_loan(
            &self,
            ctx: &mut LoanContext<'_, '_>,
            loan: &Loan,
            _params: &[u8],
        ) -> anyhow::Result<()> {
            anyhow::ensure!(ctx.credit(other_asset(), 5).is_err(), "stray credit accepted");
            ctx.credit(loan.asset, loan.principal + loan.fee)?;
            Ok(())
        }
    }

    #[derive(Debug)]
    struct PanickingBorrower;

    impl FlashBorrower for PanickingBorrower {
        fn name(&self) -> &str {
            "panicking"
        }

        fn on_flash_loan(
            &self,
            ctx: &mut LoanContext<'_, '_>,
            loan: &Loan,
            _params: &[u8],
        ) -> anyhow::Result<()> {
            ctx.credit(loan.asset, loan.principal)?;
            panic!("borrower bug");
        }
    }

    /// Drains the pool through its capability, then repays everything.
    #[derive(Debug)]
    struct ReentrantBorrower;

    impl FlashBorrower for ReentrantBorrower {
        fn name(&self) -> &str {
            "reentrant"
        }

        fn on_flash_loan(
            &self,
            ctx: &mut LoanContext<'_, '_>,
            loan: &Loan,
            _params: &[u8],
        ) -> anyhow::Result<()> {
            let rest = ctx.balance_of(loan.asset);
            ctx.debit(loan.asset, rest)?;
            let owed = loan.principal + loan.fee + rest;
            ctx.credit(loan.asset, owed)?;
            Ok(())
        }
    }

    #[derive(Debug)]
    struct ParamsEcho;

    impl FlashBorrower for ParamsEcho {
        fn name(&self) -> &str {
            "echo"
        }

        fn on_flash_loan(
            &self,
            ctx: &mut LoanContext<'_, '_>,
            loan: &Loan,
            params: &[u8],
        ) -> anyhow::Result<()> {
            anyhow::ensure!(params == b"route=uni>sushi", "unexpected params");
            ctx.credit(loan.asset, loan.principal + loan.fee)?;
            Ok(())
        }
    }

    #[test]
    fn repaid_loan_with_zero_fee_settles() {
        let mut ledger = funded_ledger();
        let executor = LoanExecutor::default();
        let borrower = RepayingBorrower::default();

        let Ok(settlement) = executor.execute(&mut ledger, &request(1_000), &borrower) else {
            panic!("loan should settle");
        };
        assert_eq!(settlement.loan.fee, 0);
        assert_eq!(settlement.balance_after, INITIAL_LIQUIDITY);
        assert_eq!(ledger.balance_of(asset()), INITIAL_LIQUIDITY);

        let Some(entry) = ledger.get(asset()) else {
            panic!("pool exists");
        };
        assert_eq!(entry.loan_count, 1);
    }

    #[test]
    fn settled_loan_grows_pool_by_fee() {
        let mut ledger = funded_ledger();
        let executor = LoanExecutor::default();
        let borrower = RepayingBorrower::default();

        let Ok(settlement) = executor.execute(&mut ledger, &request(100_000), &borrower) else {
            panic!("loan should settle");
        };
        assert_eq!(settlement.loan.fee, 90);
        assert_eq!(ledger.balance_of(asset()), INITIAL_LIQUIDITY + 90);
    }

    #[test]
    fn surplus_is_kept_by_pool() {
        let mut ledger = funded_ledger();
        let executor = LoanExecutor::default();
        let borrower = RepayingBorrower::new(7);

        let result = executor.execute(&mut ledger, &request(100_000), &borrower);
        assert!(result.is_ok());
        assert_eq!(ledger.balance_of(asset()), INITIAL_LIQUIDITY + 97);
    }

    #[test]
    fn short_repayment_reverts() {
        let mut ledger = funded_ledger();
        let executor = LoanExecutor::default();

        let result = executor.execute(&mut ledger, &request(1_000), &FixedRepayment(999));
        let Err(GatewayError::LoanNotRepaid { required, actual }) = result else {
            panic!("expected LoanNotRepaid");
        };
        assert_eq!(required, INITIAL_LIQUIDITY);
        assert_eq!(actual, INITIAL_LIQUIDITY - 1);
        assert_eq!(ledger.balance_of(asset()), INITIAL_LIQUIDITY);

        let Some(entry) = ledger.get(asset()) else {
            panic!("pool exists");
        };
        assert_eq!(entry.loan_count, 0);
    }

    #[test]
    fn principal_without_fee_reverts_when_fee_is_due() {
        let mut ledger = funded_ledger();
        let executor = LoanExecutor::default();

        let result = executor.execute(&mut ledger, &request(100_000), &ShortfallBorrower::new(90));
        assert!(matches!(result, Err(GatewayError::LoanNotRepaid { .. })));
        assert_eq!(ledger.balance_of(asset()), INITIAL_LIQUIDITY);
    }

    #[test]
    fn oversized_request_is_rejected_without_mutation() {
        let mut ledger = funded_ledger();
        let executor = LoanExecutor::default();

        let result = executor.execute(
            &mut ledger,
            &request(2_000_000),
            &RepayingBorrower::default(),
        );
        assert!(matches!(
            result,
            Err(GatewayError::InsufficientLiquidity {
                requested: 2_000_000,
                available: INITIAL_LIQUIDITY,
                ..
            })
        ));
        assert_eq!(ledger.balance_of(asset()), INITIAL_LIQUIDITY);
    }

    #[test]
    fn zero_amount_is_invalid() {
        let mut ledger = funded_ledger();
        let executor = LoanExecutor::default();

        let result = executor.execute(&mut ledger, &request(0), &RepayingBorrower::default());
        assert!(matches!(result, Err(GatewayError::InvalidAmount(_))));
    }

    #[test]
    fn callback_error_undoes_repayment() {
        let mut ledger = funded_ledger();
        let executor = LoanExecutor::default();

        let result = executor.execute(&mut ledger, &request(1_000), &FailingBorrower);
        let Err(GatewayError::CallbackFailed(message)) = result else {
            panic!("expected CallbackFailed");
        };
        assert!(message.contains("swap route unavailable"));
        assert_eq!(ledger.balance_of(asset()), INITIAL_LIQUIDITY);
    }

    #[test]
    fn callback_cannot_drain_another_pool() {
        let mut ledger = funded_ledger();
        let _ = ledger.fund(other_asset(), INITIAL_LIQUIDITY);
        let executor = LoanExecutor::default();

        let result = executor.execute(&mut ledger, &request(1_000), &CrossPoolDrainer);
        let Err(GatewayError::AssetOutOfScope { asset: touched, loan_asset }) = result else {
            panic!("expected AssetOutOfScope");
        };
        assert_eq!(touched, other_asset());
        assert_eq!(loan_asset, asset());
        assert_eq!(ledger.balance_of(asset()), INITIAL_LIQUIDITY);
        assert_eq!(ledger.balance_of(other_asset()), INITIAL_LIQUIDITY);
    }

    #[test]
    fn refused_stray_credit_creates_no_pool() {
        let mut ledger = funded_ledger();
        let executor = LoanExecutor::default();

        let result = executor.execute(&mut ledger, &request(100_000), &StrayCreditor);
        assert!(result.is_ok());
        assert_eq!(ledger.balance_of(asset()), INITIAL_LIQUIDITY + 90);
        assert!(ledger.get(other_asset()).is_none());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn callback_panic_reverts() {
        let mut ledger = funded_ledger();
        let executor = LoanExecutor::default();

        let result = executor.execute(&mut ledger, &request(1_000), &PanickingBorrower);
        assert!(matches!(result, Err(GatewayError::CallbackPanicked)));
        assert_eq!(ledger.balance_of(asset()), INITIAL_LIQUIDITY);
    }

    #[test]
    fn callback_may_reenter_through_capability() {
        let mut ledger = funded_ledger();
        let executor = LoanExecutor::default();

        let result = executor.execute(&mut ledger, &request(100_000), &ReentrantBorrower);
        assert!(result.is_ok());
        assert_eq!(ledger.balance_of(asset()), INITIAL_LIQUIDITY + 90);
    }

    #[test]
    fn params_reach_the_callback() {
        let mut ledger = funded_ledger();
        let executor = LoanExecutor::default();
        let mut req = request(1_000);
        req.params = b"route=uni>sushi".to_vec();

        assert!(executor.execute(&mut ledger, &req, &ParamsEcho).is_ok());
        req.params = b"other".to_vec();
        assert!(matches!(
            executor.execute(&mut ledger, &req, &ParamsEcho),
            Err(GatewayError::CallbackFailed(_))
        ));
    }

    #[test]
    fn custom_fee_rate_is_applied() {
        let mut ledger = funded_ledger();
        let Ok(policy) = FeePolicy::new(30) else {
            panic!("valid rate");
        };
        let executor = LoanExecutor::new(policy);

        let Ok(settlement) =
            executor.execute(&mut ledger, &request(100_000), &RepayingBorrower::default())
        else {
            panic!("loan should settle");
        };
        assert_eq!(settlement.loan.fee, 300);
    }

    #[test]
    fn terminal_states() {
        assert!(LoanState::Settled.is_final());
        assert!(LoanState::Reverted.is_final());
        assert!(!LoanState::Disbursed.is_final());
        assert_eq!(LoanState::Verified.to_string(), "Verified");
    }
}
