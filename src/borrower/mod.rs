//! Borrower layer: callback interface, capability, registry, strategies.
//!
//! Borrowers are the untrusted side of a flash loan. They receive the
//! principal, run their own logic, and must pay principal plus fee back
//! into the pool through the [`LoanContext`] before returning.

pub mod callback;
pub mod registry;
pub mod strategies;

pub use callback::{FlashBorrower, LoanContext};
pub use registry::{BorrowerInfo, BorrowerRegistry};
pub use strategies::{RepayingBorrower, ShortfallBorrower};
