//! # flashpool-gateway
//!
//! REST API and WebSocket gateway for an atomic flash-loan settlement engine.
//!
//! Pools hold per-asset liquidity. A flash loan debits a pool, hands control
//! to a registered borrower callback, and commits only if the pool balance
//! afterwards covers the principal plus the fee. Anything else rolls every
//! balance change back as if the loan never happened.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── FlashLoanService (service/)
//!     ├── BorrowerRegistry (borrower/)
//!     │
//!     ├── LoanExecutor + SettlementUnit (domain/)
//!     ├── PoolLedger + EventLog + EventBus (domain/)
//!     │
//!     └── PostgreSQL event mirror (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod borrower;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
