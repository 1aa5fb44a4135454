//! Transfer-related types for the ledger engine
//!
//! This module defines the Transfer record and the lifecycle state tracked for
//! two-phase (pending) transfers.

use super::flags::TransferFlags;
use super::numeric::{Amount128, Id128, Timestamp, NS_PER_SECOND, TIMESTAMP_MAX};

/// Movement of `amount` from a debit account to a credit account
///
/// A transfer is one of four kinds, selected by its flags: plain (posted
/// immediately), `pending` (reserved), `post_pending_transfer` or
/// `void_pending_transfer` (second phase, referencing `pending_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transfer {
    /// Unique, nonzero identifier
    pub id: Id128,

    pub debit_account_id: Id128,
    pub credit_account_id: Id128,

    /// Amount to move; `AMOUNT_MAX` means "everything pending" when posting
    pub amount: Amount128,

    /// The pending transfer a post/void refers to (zero otherwise)
    pub pending_id: Id128,

    /// Opaque caller data
    pub user_data_128: u128,
    pub user_data_64: u64,
    pub user_data_32: u32,

    /// Seconds until a pending transfer expires (zero = never)
    pub timeout: u32,

    pub ledger: u32,
    pub code: u16,
    pub flags: TransferFlags,

    /// Assigned on creation; caller-supplied only when `imported`
    pub timestamp: Timestamp,
}

impl Transfer {
    /// Create a plain transfer input
    pub fn new(
        id: Id128,
        debit_account_id: Id128,
        credit_account_id: Id128,
        amount: Amount128,
        ledger: u32,
        code: u16,
    ) -> Self {
        Transfer {
            id,
            debit_account_id,
            credit_account_id,
            amount,
            ledger,
            code,
            ..Default::default()
        }
    }

    /// Create a post or void input for the pending transfer `pending_id`
    ///
    /// Account ids, ledger and code are left zero so they are inherited from
    /// the pending transfer.
    pub fn resolving(id: Id128, pending_id: Id128, amount: Amount128, flags: TransferFlags) -> Self {
        Transfer {
            id,
            pending_id,
            amount,
            flags,
            ..Default::default()
        }
    }

    /// Builder-style flag setter
    pub fn with_flags(mut self, flags: TransferFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.flags.contains(TransferFlags::PENDING)
    }

    /// Deadline of a pending transfer with a timeout, in nanoseconds
    ///
    /// `None` when the transfer never expires or the deadline lies past
    /// `TIMESTAMP_MAX`.
    pub fn expires_at(&self) -> Option<Timestamp> {
        if self.timeout == 0 {
            return None;
        }
        u64::from(self.timeout)
            .checked_mul(NS_PER_SECOND)
            .and_then(|timeout| self.timestamp.checked_add(timeout))
            .filter(|deadline| *deadline <= TIMESTAMP_MAX)
    }
}

/// Lifecycle state of a pending transfer
///
/// `Pending -> {Posted, Voided, Expired}`; every transition is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingStatus {
    Pending,
    Posted,
    Voided,
    Expired,
}
