//! Stateless validation rules
//!
//! Everything here depends only on the event and records already looked up by
//! the caller, so the rules can be tested without a ledger. Rules are checked
//! in a fixed precedence order: the first violated rule decides the result
//! code.

use super::traits::{LedgerEvent, ResultCode};
use crate::types::numeric::timestamp_in_range;
use crate::types::{
    Account, AccountFlags, Amount128, CreateAccountResult, CreateTransferResult, Timestamp,
    Transfer, TransferFlags, AMOUNT_MAX, ID_MAX,
};

/// Timestamp rules shared by every event kind
///
/// The first event of a chain decides whether the whole chain is imported.
/// Imported events carry their own timestamp, which must be valid and lie in
/// the past; every other event must leave the timestamp zero.
pub fn check_timestamp<E: LedgerEvent>(
    event: &E,
    chain_imported: bool,
    now: Timestamp,
) -> Result<(), E::Result> {
    if event.is_imported() != chain_imported {
        return Err(if chain_imported {
            <E::Result as ResultCode>::IMPORTED_EVENT_EXPECTED
        } else {
            <E::Result as ResultCode>::IMPORTED_EVENT_NOT_EXPECTED
        });
    }
    if !event.is_imported() {
        if event.timestamp() != 0 {
            return Err(<E::Result as ResultCode>::TIMESTAMP_MUST_BE_ZERO);
        }
        return Ok(());
    }
    if !timestamp_in_range(event.timestamp()) {
        return Err(<E::Result as ResultCode>::IMPORTED_EVENT_TIMESTAMP_OUT_OF_RANGE);
    }
    if event.timestamp() >= now {
        return Err(<E::Result as ResultCode>::IMPORTED_EVENT_TIMESTAMP_MUST_NOT_ADVANCE);
    }
    Ok(())
}

/// Field rules for a new account, before any lookup
pub fn validate_account(account: &Account) -> Result<(), CreateAccountResult> {
    use CreateAccountResult as R;

    if account.reserved != 0 {
        return Err(R::ReservedField);
    }
    if account.flags.has_reserved_bits() {
        return Err(R::ReservedFlag);
    }
    if account.id == 0 {
        return Err(R::IdMustNotBeZero);
    }
    if account.id == ID_MAX {
        return Err(R::IdMustNotBeIntMax);
    }
    if account.flags.contains(
        AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS | AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS,
    ) {
        return Err(R::FlagsAreMutuallyExclusive);
    }
    if account.debits_pending != 0 {
        return Err(R::DebitsPendingMustBeZero);
    }
    if account.debits_posted != 0 {
        return Err(R::DebitsPostedMustBeZero);
    }
    if account.credits_pending != 0 {
        return Err(R::CreditsPendingMustBeZero);
    }
    if account.credits_posted != 0 {
        return Err(R::CreditsPostedMustBeZero);
    }
    if account.ledger == 0 {
        return Err(R::LedgerMustNotBeZero);
    }
    if account.code == 0 {
        return Err(R::CodeMustNotBeZero);
    }
    if account.flags.contains(AccountFlags::CLOSED) {
        return Err(R::ClosedFlagMustNotBeSet);
    }
    Ok(())
}

/// Compare a resubmitted account with the stored one
///
/// `closed` is ignored on the stored side: it is set by closing transfers and
/// can never be part of a valid create.
pub fn account_exists(input: &Account, existing: &Account) -> CreateAccountResult {
    use CreateAccountResult as R;

    if input.flags != existing.flags.difference(AccountFlags::CLOSED) {
        return R::ExistsWithDifferentFlags;
    }
    if input.user_data_128 != existing.user_data_128 {
        return R::ExistsWithDifferentUserData128;
    }
    if input.user_data_64 != existing.user_data_64 {
        return R::ExistsWithDifferentUserData64;
    }
    if input.user_data_32 != existing.user_data_32 {
        return R::ExistsWithDifferentUserData32;
    }
    if input.ledger != existing.ledger {
        return R::ExistsWithDifferentLedger;
    }
    if input.code != existing.code {
        return R::ExistsWithDifferentCode;
    }
    R::Exists
}

/// Rules shared by every transfer kind
pub fn validate_transfer_id(transfer: &Transfer) -> Result<(), CreateTransferResult> {
    use CreateTransferResult as R;

    if transfer.flags.has_reserved_bits() {
        return Err(R::ReservedFlag);
    }
    if transfer.id == 0 {
        return Err(R::IdMustNotBeZero);
    }
    if transfer.id == ID_MAX {
        return Err(R::IdMustNotBeIntMax);
    }
    Ok(())
}

/// Field rules for a plain or pending transfer, before any lookup
pub fn validate_transfer(transfer: &Transfer) -> Result<(), CreateTransferResult> {
    use CreateTransferResult as R;

    if transfer.debit_account_id == 0 {
        return Err(R::DebitAccountIdMustNotBeZero);
    }
    if transfer.debit_account_id == ID_MAX {
        return Err(R::DebitAccountIdMustNotBeIntMax);
    }
    if transfer.credit_account_id == 0 {
        return Err(R::CreditAccountIdMustNotBeZero);
    }
    if transfer.credit_account_id == ID_MAX {
        return Err(R::CreditAccountIdMustNotBeIntMax);
    }
    if transfer.debit_account_id == transfer.credit_account_id {
        return Err(R::AccountsMustBeDifferent);
    }
    if transfer.pending_id != 0 {
        return Err(R::PendingIdMustBeZero);
    }
    if !transfer.is_pending() {
        if transfer.timeout != 0 {
            return Err(R::TimeoutReservedForPendingTransfer);
        }
        if transfer.flags.is_closing() {
            return Err(R::ClosingTransferMustBePending);
        }
    }
    if transfer.ledger == 0 {
        return Err(R::LedgerMustNotBeZero);
    }
    if transfer.code == 0 {
        return Err(R::CodeMustNotBeZero);
    }
    if !transfer.flags.is_balancing() {
        if transfer.amount == 0 {
            return Err(R::AmountMustNotBeZero);
        }
        if transfer.amount == AMOUNT_MAX {
            return Err(R::AmountMustNotBeMax);
        }
    }
    Ok(())
}

/// Field rules for a post or void, before the pending transfer is looked up
pub fn validate_post_or_void(transfer: &Transfer) -> Result<(), CreateTransferResult> {
    use CreateTransferResult as R;

    let flags = transfer.flags;
    if flags.contains(TransferFlags::POST_PENDING_TRANSFER | TransferFlags::VOID_PENDING_TRANSFER)
        || flags.contains(TransferFlags::PENDING)
        || flags.is_balancing()
        || flags.is_closing()
    {
        return Err(R::FlagsAreMutuallyExclusive);
    }
    if transfer.pending_id == 0 {
        return Err(R::PendingIdMustNotBeZero);
    }
    if transfer.pending_id == ID_MAX {
        return Err(R::PendingIdMustNotBeIntMax);
    }
    if transfer.pending_id == transfer.id {
        return Err(R::PendingIdMustBeDifferent);
    }
    if transfer.timeout != 0 {
        return Err(R::TimeoutReservedForPendingTransfer);
    }
    Ok(())
}

/// Check a post or void against the pending transfer it references
///
/// Zero-valued account ids, ledger and code are inherited and always match.
pub fn validate_against_pending(
    transfer: &Transfer,
    pending: &Transfer,
) -> Result<(), CreateTransferResult> {
    use CreateTransferResult as R;

    if !pending.is_pending() {
        return Err(R::PendingTransferNotPending);
    }
    if transfer.debit_account_id != 0 && transfer.debit_account_id != pending.debit_account_id {
        return Err(R::PendingTransferHasDifferentDebitAccountId);
    }
    if transfer.credit_account_id != 0 && transfer.credit_account_id != pending.credit_account_id
    {
        return Err(R::PendingTransferHasDifferentCreditAccountId);
    }
    if transfer.ledger != 0 && transfer.ledger != pending.ledger {
        return Err(R::PendingTransferHasDifferentLedger);
    }
    if transfer.code != 0 && transfer.code != pending.code {
        return Err(R::PendingTransferHasDifferentCode);
    }
    if transfer.flags.contains(TransferFlags::POST_PENDING_TRANSFER) {
        if transfer.amount != AMOUNT_MAX && transfer.amount > pending.amount {
            return Err(R::ExceedsPendingTransferAmount);
        }
    } else if transfer.amount != 0
        && transfer.amount != AMOUNT_MAX
        && transfer.amount != pending.amount
    {
        return Err(R::PendingTransferHasDifferentAmount);
    }
    Ok(())
}

/// The record a post or void would store, with inherited fields filled in
///
/// The amount is what is actually posted; a void always records the full
/// pending amount it released.
pub fn resolve_post_or_void(transfer: &Transfer, pending: &Transfer) -> Transfer {
    let amount = if transfer.flags.contains(TransferFlags::VOID_PENDING_TRANSFER)
        || transfer.amount == AMOUNT_MAX
    {
        pending.amount
    } else {
        transfer.amount
    };

    Transfer {
        debit_account_id: pending.debit_account_id,
        credit_account_id: pending.credit_account_id,
        amount,
        user_data_128: inherit(transfer.user_data_128, pending.user_data_128),
        user_data_64: inherit(transfer.user_data_64, pending.user_data_64),
        user_data_32: inherit(transfer.user_data_32, pending.user_data_32),
        ledger: pending.ledger,
        code: pending.code,
        ..*transfer
    }
}

fn inherit<T: Default + PartialEq>(value: T, fallback: T) -> T {
    if value == T::default() {
        fallback
    } else {
        value
    }
}

/// Compare a resubmitted plain or pending transfer with the stored one
pub fn transfer_exists(input: &Transfer, existing: &Transfer) -> CreateTransferResult {
    use CreateTransferResult as R;

    if input.flags != existing.flags {
        return R::ExistsWithDifferentFlags;
    }
    if input.debit_account_id != existing.debit_account_id {
        return R::ExistsWithDifferentDebitAccountId;
    }
    if input.credit_account_id != existing.credit_account_id {
        return R::ExistsWithDifferentCreditAccountId;
    }
    let amount_differs = if input.flags.is_balancing() {
        // The stored amount is whatever the bound allowed at the time
        unbounded(input.amount) < existing.amount
    } else {
        input.amount != existing.amount
    };
    if amount_differs {
        return R::ExistsWithDifferentAmount;
    }
    same_tags(input, existing)
}

/// Compare a resubmitted post or void, resolved against its pending transfer,
/// with the stored one
pub fn post_or_void_exists(
    input: &Transfer,
    resolved: &Transfer,
    existing: &Transfer,
) -> CreateTransferResult {
    use CreateTransferResult as R;

    if input.flags != existing.flags {
        return R::ExistsWithDifferentFlags;
    }
    if input.pending_id != existing.pending_id {
        return R::ExistsWithDifferentPendingId;
    }
    if resolved.debit_account_id != existing.debit_account_id {
        return R::ExistsWithDifferentDebitAccountId;
    }
    if resolved.credit_account_id != existing.credit_account_id {
        return R::ExistsWithDifferentCreditAccountId;
    }
    if resolved.amount != existing.amount {
        return R::ExistsWithDifferentAmount;
    }
    same_tags(resolved, existing)
}

fn same_tags(input: &Transfer, existing: &Transfer) -> CreateTransferResult {
    use CreateTransferResult as R;

    if input.user_data_128 != existing.user_data_128 {
        return R::ExistsWithDifferentUserData128;
    }
    if input.user_data_64 != existing.user_data_64 {
        return R::ExistsWithDifferentUserData64;
    }
    if input.user_data_32 != existing.user_data_32 {
        return R::ExistsWithDifferentUserData32;
    }
    if input.timeout != existing.timeout {
        return R::ExistsWithDifferentTimeout;
    }
    if input.code != existing.code {
        return R::ExistsWithDifferentCode;
    }
    R::Exists
}

/// Amount a transfer actually moves
///
/// For balancing transfers the requested amount is an upper bound (zero
/// meaning none), clamped to the headroom of the balancing side(s).
pub fn applied_amount(transfer: &Transfer, debit: &Account, credit: &Account) -> Amount128 {
    if !transfer.flags.is_balancing() {
        return transfer.amount;
    }

    let mut amount = unbounded(transfer.amount);
    if transfer.flags.contains(TransferFlags::BALANCING_DEBIT) {
        amount = amount.min(debit.debit_headroom());
    }
    if transfer.flags.contains(TransferFlags::BALANCING_CREDIT) {
        amount = amount.min(credit.credit_headroom());
    }
    amount
}

fn unbounded(amount: Amount128) -> Amount128 {
    if amount == 0 {
        AMOUNT_MAX
    } else {
        amount
    }
}
