//! Domain layer: ledger, fee policy, settlement units, loan execution, events.
//!
//! This module contains the settlement protocol itself: per-asset pool
//! balances, the fee rule, the journaled unit a flash loan runs in, the loan
//! state machine, and the append-only event log with its broadcast bus.

pub mod address;
pub mod event_bus;
pub mod event_log;
pub mod fee_policy;
pub mod ledger_event;
pub mod loan_executor;
pub mod pool_entry;
pub mod pool_ledger;
pub(crate) mod settlement_unit;

pub use address::Address;
pub use event_bus::EventBus;
pub use event_log::EventLog;
pub use fee_policy::FeePolicy;
pub use ledger_event::{LedgerEvent, RecordedEvent};
pub use loan_executor::{Loan, LoanExecutor, LoanRequest, LoanSettlement, LoanState};
pub use pool_entry::{PoolEntry, PoolSummary};
pub use pool_ledger::PoolLedger;
pub(crate) use settlement_unit::SettlementUnit;
