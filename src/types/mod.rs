//! Types module
//!
//! Contains the data structures shared by the engine and its collaborators:
//! - `numeric`: Fixed-width ids, amounts, timestamps and their limits
//! - `flags`: Bit-flag sets for accounts, transfers and filters
//! - `account`: Account record, balance snapshots and balance mutations
//! - `transfer`: Transfer record and pending lifecycle state
//! - `result`: Per-event result codes
//! - `filter`: Query filters
//! - `batch`: Submitted batches and their sparse results
//! - `error`: Process-level error type

pub mod account;
pub mod batch;
pub mod error;
pub mod filter;
pub mod flags;
pub mod numeric;
pub mod result;
pub mod transfer;

pub use account::{Account, AccountBalance, BalanceEffect, Delta, Phase, Side};
pub use batch::{Batch, BatchResults};
pub use error::LedgerError;
pub use filter::{AccountFilter, QueryFilter};
pub use flags::{AccountFilterFlags, AccountFlags, QueryFilterFlags, TransferFlags};
pub use numeric::{
    Amount128, Id128, Timestamp, AMOUNT_MAX, BATCH_MAX, ID_MAX, NS_PER_SECOND, TIMESTAMP_MAX,
    TIMESTAMP_MIN,
};
pub use result::{
    CreateAccountResult, CreateAccountsResult, CreateTransferResult, CreateTransfersResult,
};
pub use transfer::{PendingStatus, Transfer};
