//! Per-event result codes
//!
//! Business rejections are returned as data, one code per failed event. The
//! `Display` form of every code is its stable snake_case name, which is what
//! the CLI logs and what collaborators match on.
//!
//! # Categories
//!
//! - **Chain**: `linked_event_failed`, `linked_event_chain_open`
//! - **Temporal**: `timestamp_must_be_zero`, `imported_event_*`,
//!   `timestamp_must_be_greater_than_value`
//! - **Field validation**: `reserved_*`, `*_must_not_be_zero`, flag combinations
//! - **Referential**: `*_not_found`, ledger mismatches
//! - **Duplicate**: `exists`, `exists_with_different_*`, `id_already_failed`
//! - **Business rule**: `exceeds_*`, `overflows_*`, `pending_transfer_*`

use thiserror::Error;

/// Why an account in a `create_accounts` batch was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CreateAccountResult {
    #[error("linked_event_failed")]
    LinkedEventFailed,
    #[error("linked_event_chain_open")]
    LinkedEventChainOpen,
    #[error("imported_event_expected")]
    ImportedEventExpected,
    #[error("imported_event_not_expected")]
    ImportedEventNotExpected,
    #[error("timestamp_must_be_zero")]
    TimestampMustBeZero,
    #[error("imported_event_timestamp_out_of_range")]
    ImportedEventTimestampOutOfRange,
    #[error("imported_event_timestamp_must_not_advance")]
    ImportedEventTimestampMustNotAdvance,
    #[error("reserved_field")]
    ReservedField,
    #[error("reserved_flag")]
    ReservedFlag,
    #[error("id_must_not_be_zero")]
    IdMustNotBeZero,
    #[error("id_must_not_be_int_max")]
    IdMustNotBeIntMax,
    #[error("flags_are_mutually_exclusive")]
    FlagsAreMutuallyExclusive,
    #[error("debits_pending_must_be_zero")]
    DebitsPendingMustBeZero,
    #[error("debits_posted_must_be_zero")]
    DebitsPostedMustBeZero,
    #[error("credits_pending_must_be_zero")]
    CreditsPendingMustBeZero,
    #[error("credits_posted_must_be_zero")]
    CreditsPostedMustBeZero,
    #[error("ledger_must_not_be_zero")]
    LedgerMustNotBeZero,
    #[error("code_must_not_be_zero")]
    CodeMustNotBeZero,
    #[error("closed_flag_must_not_be_set")]
    ClosedFlagMustNotBeSet,
    #[error("exists_with_different_flags")]
    ExistsWithDifferentFlags,
    #[error("exists_with_different_user_data_128")]
    ExistsWithDifferentUserData128,
    #[error("exists_with_different_user_data_64")]
    ExistsWithDifferentUserData64,
    #[error("exists_with_different_user_data_32")]
    ExistsWithDifferentUserData32,
    #[error("exists_with_different_ledger")]
    ExistsWithDifferentLedger,
    #[error("exists_with_different_code")]
    ExistsWithDifferentCode,
    #[error("exists")]
    Exists,
    #[error("timestamp_must_be_greater_than_value")]
    TimestampMustBeGreaterThanValue,
}

/// Why a transfer in a `create_transfers` batch was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CreateTransferResult {
    #[error("linked_event_failed")]
    LinkedEventFailed,
    #[error("linked_event_chain_open")]
    LinkedEventChainOpen,
    #[error("imported_event_expected")]
    ImportedEventExpected,
    #[error("imported_event_not_expected")]
    ImportedEventNotExpected,
    #[error("timestamp_must_be_zero")]
    TimestampMustBeZero,
    #[error("imported_event_timestamp_out_of_range")]
    ImportedEventTimestampOutOfRange,
    #[error("imported_event_timestamp_must_not_advance")]
    ImportedEventTimestampMustNotAdvance,
    #[error("reserved_flag")]
    ReservedFlag,
    #[error("id_must_not_be_zero")]
    IdMustNotBeZero,
    #[error("id_must_not_be_int_max")]
    IdMustNotBeIntMax,
    #[error("flags_are_mutually_exclusive")]
    FlagsAreMutuallyExclusive,
    #[error("debit_account_id_must_not_be_zero")]
    DebitAccountIdMustNotBeZero,
    #[error("debit_account_id_must_not_be_int_max")]
    DebitAccountIdMustNotBeIntMax,
    #[error("credit_account_id_must_not_be_zero")]
    CreditAccountIdMustNotBeZero,
    #[error("credit_account_id_must_not_be_int_max")]
    CreditAccountIdMustNotBeIntMax,
    #[error("accounts_must_be_different")]
    AccountsMustBeDifferent,
    #[error("pending_id_must_be_zero")]
    PendingIdMustBeZero,
    #[error("pending_id_must_not_be_zero")]
    PendingIdMustNotBeZero,
    #[error("pending_id_must_not_be_int_max")]
    PendingIdMustNotBeIntMax,
    #[error("pending_id_must_be_different")]
    PendingIdMustBeDifferent,
    #[error("timeout_reserved_for_pending_transfer")]
    TimeoutReservedForPendingTransfer,
    #[error("closing_transfer_must_be_pending")]
    ClosingTransferMustBePending,
    #[error("ledger_must_not_be_zero")]
    LedgerMustNotBeZero,
    #[error("code_must_not_be_zero")]
    CodeMustNotBeZero,
    #[error("amount_must_not_be_zero")]
    AmountMustNotBeZero,
    #[error("amount_must_not_be_max")]
    AmountMustNotBeMax,
    #[error("debit_account_not_found")]
    DebitAccountNotFound,
    #[error("credit_account_not_found")]
    CreditAccountNotFound,
    #[error("accounts_must_have_the_same_ledger")]
    AccountsMustHaveTheSameLedger,
    #[error("transfer_must_have_the_same_ledger_as_accounts")]
    TransferMustHaveTheSameLedgerAsAccounts,
    #[error("pending_transfer_not_found")]
    PendingTransferNotFound,
    #[error("pending_transfer_not_pending")]
    PendingTransferNotPending,
    #[error("pending_transfer_has_different_debit_account_id")]
    PendingTransferHasDifferentDebitAccountId,
    #[error("pending_transfer_has_different_credit_account_id")]
    PendingTransferHasDifferentCreditAccountId,
    #[error("pending_transfer_has_different_ledger")]
    PendingTransferHasDifferentLedger,
    #[error("pending_transfer_has_different_code")]
    PendingTransferHasDifferentCode,
    #[error("exceeds_pending_transfer_amount")]
    ExceedsPendingTransferAmount,
    #[error("pending_transfer_has_different_amount")]
    PendingTransferHasDifferentAmount,
    #[error("exists_with_different_flags")]
    ExistsWithDifferentFlags,
    #[error("exists_with_different_pending_id")]
    ExistsWithDifferentPendingId,
    #[error("exists_with_different_debit_account_id")]
    ExistsWithDifferentDebitAccountId,
    #[error("exists_with_different_credit_account_id")]
    ExistsWithDifferentCreditAccountId,
    #[error("exists_with_different_amount")]
    ExistsWithDifferentAmount,
    #[error("exists_with_different_user_data_128")]
    ExistsWithDifferentUserData128,
    #[error("exists_with_different_user_data_64")]
    ExistsWithDifferentUserData64,
    #[error("exists_with_different_user_data_32")]
    ExistsWithDifferentUserData32,
    #[error("exists_with_different_timeout")]
    ExistsWithDifferentTimeout,
    #[error("exists_with_different_code")]
    ExistsWithDifferentCode,
    #[error("exists")]
    Exists,
    #[error("id_already_failed")]
    IdAlreadyFailed,
    #[error("timestamp_must_be_greater_than_value")]
    TimestampMustBeGreaterThanValue,
    #[error("imported_event_timestamp_must_postdate_debit_account")]
    ImportedEventTimestampMustPostdateDebitAccount,
    #[error("imported_event_timestamp_must_postdate_credit_account")]
    ImportedEventTimestampMustPostdateCreditAccount,
    #[error("imported_event_timeout_must_be_zero")]
    ImportedEventTimeoutMustBeZero,
    #[error("pending_transfer_already_posted")]
    PendingTransferAlreadyPosted,
    #[error("pending_transfer_already_voided")]
    PendingTransferAlreadyVoided,
    #[error("pending_transfer_expired")]
    PendingTransferExpired,
    #[error("debit_account_already_closed")]
    DebitAccountAlreadyClosed,
    #[error("credit_account_already_closed")]
    CreditAccountAlreadyClosed,
    #[error("overflows_debits_pending")]
    OverflowsDebitsPending,
    #[error("overflows_credits_pending")]
    OverflowsCreditsPending,
    #[error("overflows_debits_posted")]
    OverflowsDebitsPosted,
    #[error("overflows_credits_posted")]
    OverflowsCreditsPosted,
    #[error("overflows_debits")]
    OverflowsDebits,
    #[error("overflows_credits")]
    OverflowsCredits,
    #[error("overflows_timeout")]
    OverflowsTimeout,
    #[error("exceeds_credits")]
    ExceedsCredits,
    #[error("exceeds_debits")]
    ExceedsDebits,
}

impl CreateTransferResult {
    /// Failures that depend on ledger state rather than on the event itself
    ///
    /// The id of a transfer that failed this way is burned: resubmitting it
    /// yields `id_already_failed` even once the state would allow it.
    pub fn is_transient(&self) -> bool {
        use CreateTransferResult as R;
        matches!(
            self,
            R::DebitAccountNotFound
                | R::CreditAccountNotFound
                | R::PendingTransferNotFound
                | R::PendingTransferExpired
                | R::DebitAccountAlreadyClosed
                | R::CreditAccountAlreadyClosed
                | R::OverflowsDebitsPending
                | R::OverflowsCreditsPending
                | R::OverflowsDebitsPosted
                | R::OverflowsCreditsPosted
                | R::OverflowsDebits
                | R::OverflowsCredits
                | R::OverflowsTimeout
                | R::ExceedsCredits
                | R::ExceedsDebits
        )
    }
}

/// A failed account, by position in the submitted batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateAccountsResult {
    pub index: u32,
    pub result: CreateAccountResult,
}

/// A failed transfer, by position in the submitted batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateTransfersResult {
    pub index: u32,
    pub result: CreateTransferResult,
}
