//! Flash-loan service: runs settlement units and emits events.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::receipt::{ReceiptKind, TransactionReceipt};
use crate::borrower::BorrowerRegistry;
use crate::domain::{
    Address, EventBus, EventLog, FeePolicy, LedgerEvent, LoanExecutor, LoanRequest, PoolEntry,
    PoolLedger, PoolSummary, RecordedEvent,
};
use crate::error::GatewayError;

/// Orchestration layer for fundings and flash loans.
///
/// Owns the [`PoolLedger`] behind a single lock: every funding and every
/// flash loan takes the write lock for its whole settlement unit, so units
/// never interleave. The [`EventLog`] is appended while that lock is still
/// held, which keeps event order identical to commit order.
#[derive(Debug, Clone)]
pub struct FlashLoanService {
    ledger: Arc<RwLock<PoolLedger>>,
    event_log: Arc<RwLock<EventLog>>,
    borrowers: Arc<BorrowerRegistry>,
    executor: LoanExecutor,
    event_bus: EventBus,
}

impl FlashLoanService {
    /// Creates a new `FlashLoanService` with an empty ledger.
    #[must_use]
    pub fn new(fee_policy: FeePolicy, borrowers: Arc<BorrowerRegistry>, event_bus: EventBus) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(PoolLedger::new())),
            event_log: Arc::new(RwLock::new(EventLog::new(event_bus.clone()))),
            borrowers,
            executor: LoanExecutor::new(fee_policy),
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the [`BorrowerRegistry`].
    #[must_use]
    pub fn borrowers(&self) -> &Arc<BorrowerRegistry> {
        &self.borrowers
    }

    /// Returns the fee policy in force.
    #[must_use]
    pub fn fee_policy(&self) -> FeePolicy {
        self.executor.fee_policy()
    }

    /// Adds `amount` of `asset` supplied by `funder`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidAmount`] for zero,
    /// [`GatewayError::InvalidAsset`] for the zero address, or
    /// [`GatewayError::AmountOverflow`]. Nothing is recorded on error.
    pub async fn fund_pool(
        &self,
        asset: Address,
        funder: Address,
        amount: u128,
    ) -> Result<TransactionReceipt, GatewayError> {
        let mut ledger = self.ledger.write().await;
        let new_balance = ledger.fund(asset, amount)?;

        let mut log = self.event_log.write().await;
        let recorded = log.record(LedgerEvent::pool_funded(asset, funder, amount, new_balance));
        drop(log);
        drop(ledger);

        tracing::info!(%asset, %funder, amount, new_balance, "pool funded");

        Ok(TransactionReceipt {
            transaction_id: Uuid::new_v4(),
            kind: ReceiptKind::Funding,
            event_sequence: recorded.sequence,
            asset,
            counterparty: funder,
            amount: amount.to_string(),
            fee: None,
            pool_balance: new_balance.to_string(),
            committed_at: Utc::now(),
        })
    }

    /// Runs one flash loan to completion.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::BorrowerNotFound`] if the borrower is not
    /// registered, otherwise any error of [`LoanExecutor::execute`]. On error
    /// the ledger is exactly as it was and no event is emitted.
    pub async fn execute_flash_loan(
        &self,
        request: LoanRequest,
    ) -> Result<TransactionReceipt, GatewayError> {
        let borrower = self.borrowers.get(request.borrower).await?;

        let mut ledger = self.ledger.write().await;
        let settlement = match self.executor.execute(&mut ledger, &request, borrower.as_ref()) {
            Ok(settlement) => settlement,
            Err(err) => {
                if err.is_revert() {
                    tracing::warn!(
                        asset = %request.asset,
                        borrower = %request.borrower,
                        amount = request.amount,
                        error = %err,
                        "flash loan reverted"
                    );
                } else {
                    tracing::debug!(asset = %request.asset, error = %err, "flash loan rejected");
                }
                return Err(err);
            }
        };
        let loan = settlement.loan;

        let mut log = self.event_log.write().await;
        let recorded = log.record(LedgerEvent::flash_loan(
            loan.asset,
            loan.borrower,
            loan.principal,
            loan.fee,
            settlement.balance_after,
        ));
        drop(log);
        drop(ledger);

        tracing::info!(
            asset = %loan.asset,
            borrower = %loan.borrower,
            amount = loan.principal,
            fee = loan.fee,
            "flash loan settled"
        );

        Ok(TransactionReceipt {
            transaction_id: Uuid::new_v4(),
            kind: ReceiptKind::FlashLoan,
            event_sequence: recorded.sequence,
            asset: loan.asset,
            counterparty: loan.borrower,
            amount: loan.principal.to_string(),
            fee: Some(loan.fee.to_string()),
            pool_balance: settlement.balance_after.to_string(),
            committed_at: Utc::now(),
        })
    }

    /// Rebuilds the ledger and the event log from events read back from
    /// durable storage, in sequence order. Nothing is published.
    ///
    /// Meant to run once at startup, before the service takes traffic. New
    /// events are numbered after the highest restored sequence.
    ///
    /// Returns the number of events restored.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for an out-of-order sequence
    /// and [`GatewayError::InvalidAmount`] for an event carrying a corrupt
    /// amount.
    pub async fn restore(
        &self,
        events: impl IntoIterator<Item = RecordedEvent>,
    ) -> Result<usize, GatewayError> {
        let mut ledger = self.ledger.write().await;
        let mut log = self.event_log.write().await;
        let mut restored = 0_usize;
        for recorded in events {
            ledger.apply(&recorded.event)?;
            log.restore(recorded)?;
            restored = restored.saturating_add(1);
        }
        tracing::info!(
            restored,
            last_sequence = log.last_sequence(),
            pools = ledger.len(),
            "ledger rebuilt from event log"
        );
        Ok(restored)
    }

    /// Returns the balance of `asset`, zero for an unknown asset.
    pub async fn balance_of(&self, asset: Address) -> u128 {
        self.ledger.read().await.balance_of(asset)
    }

    /// Returns the largest amount of `asset` a flash loan can borrow.
    pub async fn max_flash_loan(&self, asset: Address) -> u128 {
        self.ledger.read().await.max_flash_loan(asset)
    }

    /// Returns the fee a loan of `amount` would be charged.
    #[must_use]
    pub fn flash_fee(&self, amount: u128) -> u128 {
        self.executor.fee_policy().compute_fee(amount)
    }

    /// Returns a copy of the pool for `asset`, if it exists.
    pub async fn pool(&self, asset: Address) -> Option<PoolEntry> {
        self.ledger.read().await.get(asset).cloned()
    }

    /// Returns summaries of all pools, ordered by asset.
    pub async fn list_pools(&self) -> Vec<PoolSummary> {
        self.ledger.read().await.list()
    }

    /// Returns up to `limit` logged events with a sequence above `after`.
    pub async fn events_after(&self, after: u64, limit: usize) -> Vec<RecordedEvent> {
        self.event_log.read().await.entries_after(after, limit).to_vec()
    }

    /// Returns the sequence number of the latest logged event.
    pub async fn last_sequence(&self) -> u64 {
        self.event_log.read().await.last_sequence()
    }
}
