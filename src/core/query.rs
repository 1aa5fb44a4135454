//! Read-only range queries over the committed ledgers
//!
//! Queries never see staged state and never fail: a filter that cannot match
//! anything (zero limit, reserved flags, inverted timestamp range) yields an
//! empty result.

use std::ops::RangeInclusive;

use super::account_ledger::AccountLedger;
use super::transfer_ledger::TransferLedger;
use crate::types::{
    Account, AccountBalance, AccountFilter, AccountFilterFlags, AccountFlags, QueryFilter,
    Timestamp, Transfer,
};

/// Transfers debiting and/or crediting the filter's account
pub fn get_account_transfers(transfers: &TransferLedger, filter: &AccountFilter) -> Vec<Transfer> {
    if !filter.is_valid() {
        return Vec::new();
    }
    let range = timestamp_range(filter.timestamp_min, filter.timestamp_max);
    let matches = transfers
        .for_account(filter.account_id, range)
        .filter(|transfer| matches_account_filter(filter, transfer));
    take(matches, filter.is_reversed(), filter.limit)
}

/// Balance snapshots of a `history` account
///
/// Each snapshot is selected by the transfer that produced it, using the same
/// predicates as [`get_account_transfers`].
pub fn get_account_balances(
    accounts: &AccountLedger,
    transfers: &TransferLedger,
    filter: &AccountFilter,
) -> Vec<AccountBalance> {
    if !filter.is_valid() {
        return Vec::new();
    }
    let keeps_history = accounts
        .get(filter.account_id)
        .is_some_and(|account| account.flags.contains(AccountFlags::HISTORY));
    if !keeps_history {
        return Vec::new();
    }

    let range = timestamp_range(filter.timestamp_min, filter.timestamp_max);
    let matches = accounts
        .history(filter.account_id)
        .iter()
        .filter(|balance| range.contains(&balance.timestamp))
        .filter(|balance| {
            transfers
                .at(balance.timestamp)
                .is_some_and(|transfer| matches_account_filter(filter, transfer))
        });
    take(matches, filter.is_reversed(), filter.limit)
}

pub fn query_accounts(accounts: &AccountLedger, filter: &QueryFilter) -> Vec<Account> {
    if !filter.is_valid() {
        return Vec::new();
    }
    let range = timestamp_range(filter.timestamp_min, filter.timestamp_max);
    let matches = accounts.by_timestamp(range).filter(|account| {
        matches_query(
            filter,
            account.user_data_128,
            account.user_data_64,
            account.user_data_32,
            account.ledger,
            account.code,
        )
    });
    take(matches, filter.is_reversed(), filter.limit)
}

pub fn query_transfers(transfers: &TransferLedger, filter: &QueryFilter) -> Vec<Transfer> {
    if !filter.is_valid() {
        return Vec::new();
    }
    let range = timestamp_range(filter.timestamp_min, filter.timestamp_max);
    let matches = transfers.by_timestamp(range).filter(|transfer| {
        matches_query(
            filter,
            transfer.user_data_128,
            transfer.user_data_64,
            transfer.user_data_32,
            transfer.ledger,
            transfer.code,
        )
    });
    take(matches, filter.is_reversed(), filter.limit)
}

/// Zero bounds are open
fn timestamp_range(min: Timestamp, max: Timestamp) -> RangeInclusive<Timestamp> {
    let max = if max == 0 { Timestamp::MAX } else { max };
    min..=max
}

fn matches_account_filter(filter: &AccountFilter, transfer: &Transfer) -> bool {
    let debit = filter.flags.contains(AccountFilterFlags::DEBITS)
        && transfer.debit_account_id == filter.account_id;
    let credit = filter.flags.contains(AccountFilterFlags::CREDITS)
        && transfer.credit_account_id == filter.account_id;

    (debit || credit)
        && field_matches(filter.user_data_128, transfer.user_data_128)
        && field_matches(filter.user_data_64, transfer.user_data_64)
        && field_matches(filter.user_data_32, transfer.user_data_32)
        && field_matches(filter.code, transfer.code)
}

fn matches_query(
    filter: &QueryFilter,
    user_data_128: u128,
    user_data_64: u64,
    user_data_32: u32,
    ledger: u32,
    code: u16,
) -> bool {
    field_matches(filter.user_data_128, user_data_128)
        && field_matches(filter.user_data_64, user_data_64)
        && field_matches(filter.user_data_32, user_data_32)
        && field_matches(filter.ledger, ledger)
        && field_matches(filter.code, code)
}

fn field_matches<T: Default + PartialEq>(wanted: T, actual: T) -> bool {
    wanted == T::default() || wanted == actual
}

fn take<'a, T, I>(matches: I, reversed: bool, limit: u32) -> Vec<T>
where
    T: Copy + 'a,
    I: DoubleEndedIterator<Item = &'a T>,
{
    let limit = limit as usize;
    if reversed {
        matches.rev().take(limit).copied().collect()
    } else {
        matches.take(limit).copied().collect()
    }
}
