//! Service layer: settlement orchestration.
//!
//! [`FlashLoanService`] runs fundings and flash loans against the ledger,
//! records committed units in the event log, and hands back
//! [`TransactionReceipt`]s.

pub mod flash_loan_service;
pub mod receipt;

pub use flash_loan_service::FlashLoanService;
pub use receipt::{ReceiptKind, TransactionReceipt};
