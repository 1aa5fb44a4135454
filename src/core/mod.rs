//! Core business logic module
//!
//! This module contains the decision engine of the ledger:
//! - `traits` - Trait abstractions shared by account and transfer batches
//! - `clock` - Time sources and the timestamp sequence
//! - `chain` - Partitioning of a batch into linked chains
//! - `overlay` - Copy-on-write staging of a chain in progress
//! - `validator` - Stateless field and idempotence rules
//! - `account_ledger` - Committed accounts and account rules
//! - `transfer_ledger` - Committed transfers and transfer rules
//! - `engine` - Batch orchestration, commit and expiry
//! - `query` - Read-only range queries
//! - `async` - Single-writer concurrency boundary on tokio

pub mod account_ledger;
pub mod r#async;
pub mod chain;
pub mod clock;
pub mod engine;
pub mod overlay;
pub mod query;
pub mod traits;
pub mod transfer_ledger;
pub mod validator;

pub use account_ledger::AccountLedger;
pub use clock::{Clock, ManualClock, SystemClock, TimestampSequence};
pub use engine::LedgerEngine;
pub use r#async::{AsyncLedgerEngine, BatchProcessor};
pub use traits::{LedgerEvent, ResultCode};
pub use transfer_ledger::TransferLedger;
