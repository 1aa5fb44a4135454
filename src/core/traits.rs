//! Trait abstractions shared by account and transfer batches
//!
//! Chain partitioning, the imported-timestamp rules and rollback reporting are
//! identical for both kinds of event. These traits let the engine implement
//! them once over any event type and its result code.

use std::fmt;

use crate::types::{
    Account, AccountFlags, CreateAccountResult, CreateTransferResult, Id128, Timestamp, Transfer,
    TransferFlags,
};

/// Result codes every event kind shares
///
/// Implemented by the per-kind result enums so that the batch processor can
/// report chain and temporal failures without knowing the event kind.
pub trait ResultCode: Copy + Eq + fmt::Debug + fmt::Display {
    const LINKED_EVENT_FAILED: Self;
    const LINKED_EVENT_CHAIN_OPEN: Self;
    const IMPORTED_EVENT_EXPECTED: Self;
    const IMPORTED_EVENT_NOT_EXPECTED: Self;
    const TIMESTAMP_MUST_BE_ZERO: Self;
    const IMPORTED_EVENT_TIMESTAMP_OUT_OF_RANGE: Self;
    const IMPORTED_EVENT_TIMESTAMP_MUST_NOT_ADVANCE: Self;

    /// Whether the failing event's id must be remembered as failed
    fn is_transient(&self) -> bool {
        false
    }
}

/// An event that can be submitted in a batch
pub trait LedgerEvent: Copy + fmt::Debug {
    type Result: ResultCode;

    /// Label used in logs
    const KIND: &'static str;

    fn id(&self) -> Id128;

    /// Caller-supplied timestamp (zero unless imported)
    fn timestamp(&self) -> Timestamp;

    /// The next event in the batch belongs to the same chain
    fn is_linked(&self) -> bool;

    fn is_imported(&self) -> bool;
}

impl ResultCode for CreateAccountResult {
    const LINKED_EVENT_FAILED: Self = CreateAccountResult::LinkedEventFailed;
    const LINKED_EVENT_CHAIN_OPEN: Self = CreateAccountResult::LinkedEventChainOpen;
    const IMPORTED_EVENT_EXPECTED: Self = CreateAccountResult::ImportedEventExpected;
    const IMPORTED_EVENT_NOT_EXPECTED: Self = CreateAccountResult::ImportedEventNotExpected;
    const TIMESTAMP_MUST_BE_ZERO: Self = CreateAccountResult::TimestampMustBeZero;
    const IMPORTED_EVENT_TIMESTAMP_OUT_OF_RANGE: Self =
        CreateAccountResult::ImportedEventTimestampOutOfRange;
    const IMPORTED_EVENT_TIMESTAMP_MUST_NOT_ADVANCE: Self =
        CreateAccountResult::ImportedEventTimestampMustNotAdvance;
}

impl ResultCode for CreateTransferResult {
    const LINKED_EVENT_FAILED: Self = CreateTransferResult::LinkedEventFailed;
    const LINKED_EVENT_CHAIN_OPEN: Self = CreateTransferResult::LinkedEventChainOpen;
    const IMPORTED_EVENT_EXPECTED: Self = CreateTransferResult::ImportedEventExpected;
    const IMPORTED_EVENT_NOT_EXPECTED: Self = CreateTransferResult::ImportedEventNotExpected;
    const TIMESTAMP_MUST_BE_ZERO: Self = CreateTransferResult::TimestampMustBeZero;
    const IMPORTED_EVENT_TIMESTAMP_OUT_OF_RANGE: Self =
        CreateTransferResult::ImportedEventTimestampOutOfRange;
    const IMPORTED_EVENT_TIMESTAMP_MUST_NOT_ADVANCE: Self =
        CreateTransferResult::ImportedEventTimestampMustNotAdvance;

    fn is_transient(&self) -> bool {
        CreateTransferResult::is_transient(self)
    }
}

impl LedgerEvent for Account {
    type Result = CreateAccountResult;

    const KIND: &'static str = "accounts";

    fn id(&self) -> Id128 {
        self.id
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn is_linked(&self) -> bool {
        self.flags.contains(AccountFlags::LINKED)
    }

    fn is_imported(&self) -> bool {
        self.flags.contains(AccountFlags::IMPORTED)
    }
}

impl LedgerEvent for Transfer {
    type Result = CreateTransferResult;

    const KIND: &'static str = "transfers";

    fn id(&self) -> Id128 {
        self.id
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn is_linked(&self) -> bool {
        self.flags.contains(TransferFlags::LINKED)
    }

    fn is_imported(&self) -> bool {
        self.flags.contains(TransferFlags::IMPORTED)
    }
}
