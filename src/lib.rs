//! Ledger Engine Library
//! # Overview
//!
//! This library provides an in-memory, double-entry ledger decision engine in
//! the style of a financial accounting database, plus a streaming CSV replay
//! tool with a sync and an async strategy.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Transfer, result codes, filters, batches)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Batch evaluation, linked chains and timestamp assignment
//!   - [`core::account_ledger`] - Account creation and balance invariants
//!   - [`core::transfer_ledger`] - Transfers and the two-phase pending lifecycle
//!   - [`core::query`] - Read-only account, transfer and balance-history queries
//!   - [`core::r#async`] - Shared engine handle, single-writer batch processor and expiry sweeper
//! - [`io`] - CSV import of events and export of account state
//! - [`strategy`] - Replay pipelines
//! - [`logging`] - Tracing subscriber setup
//!
//! # Events
//!
//! Every write is a batch of accounts or a batch of transfers. Events in a
//! batch are evaluated in order; consecutive events with the `linked` flag form
//! a chain that commits or rolls back as a unit. The result of a batch lists
//! only the events that failed, each with the code of the rule it violated.
//!
//! # Transfers
//!
//! - **Plain**: moves `amount` from the debit account's posted debits to the
//!   credit account's posted credits
//! - **Pending**: reserves `amount` in the pending columns, optionally with a
//!   timeout after which it expires
//! - **Post / Void**: resolves a pending transfer, moving all or part of its
//!   amount to posted, or releasing it
//! - **Balancing**: clamps the amount to what the account's balance limit allows
//! - **Closing**: closes an account until the pending transfer is voided or expires

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{AsyncLedgerEngine, BatchProcessor, Clock, LedgerEngine, ManualClock, SystemClock};
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountBalance, AccountFilter, AccountFlags, Batch, BatchResults,
    CreateAccountResult, CreateAccountsResult, CreateTransferResult, CreateTransfersResult,
    LedgerError, PendingStatus, QueryFilter, Transfer, TransferFlags,
};
