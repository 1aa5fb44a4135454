//! Account ledger
//!
//! This module provides the committed account store and the account rules of
//! the decision engine:
//! - `AccountLedger` holds every committed account, indexed by id and by
//!   timestamp, plus the balance history of accounts with `history` set
//! - `create` stages a new account in an [`Overlay`]
//! - `apply_transfer_effect` stages one balance mutation caused by a transfer
//!
//! Accounts are never deleted, and only their balances and `closed` flag ever
//! change after creation.

use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;

use super::overlay::{EventContext, Overlay};
use super::validator;
use crate::types::{
    Account, AccountBalance, AccountFlags, BalanceEffect, CreateAccountResult,
    CreateTransferResult, Id128, Side, Timestamp,
};

/// Committed accounts
#[derive(Debug, Default)]
pub struct AccountLedger {
    /// Map of account ids to account records
    accounts: HashMap<Id128, Account>,

    /// Creation order; timestamps are unique across the whole ledger
    by_timestamp: BTreeMap<Timestamp, Id128>,

    /// Balance snapshots of `history` accounts, oldest first
    history: HashMap<Id128, Vec<AccountBalance>>,
}

impl AccountLedger {
    /// Create an empty AccountLedger
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Id128) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// Look up accounts by id
    ///
    /// # Arguments
    ///
    /// * `ids` - Account ids, in the order the caller wants them back
    ///
    /// # Returns
    ///
    /// The accounts found, in request order. Unknown ids are omitted.
    pub fn lookup(&self, ids: &[Id128]) -> Vec<Account> {
        ids.iter().filter_map(|id| self.get(*id)).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Accounts created within `range`, in timestamp order
    pub fn by_timestamp(
        &self,
        range: RangeInclusive<Timestamp>,
    ) -> impl DoubleEndedIterator<Item = &Account> + '_ {
        self.by_timestamp
            .range(range)
            .filter_map(|(_, id)| self.accounts.get(id))
    }

    /// Balance snapshots of an account, oldest first
    ///
    /// Empty for unknown accounts and accounts without `history`.
    pub fn history(&self, id: Id128) -> &[AccountBalance] {
        self.history.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Get all accounts sorted by id
    ///
    /// Returns a vector of all accounts, sorted by account id in ascending
    /// order. This provides deterministic output for CSV generation.
    pub fn all_by_id(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.accounts.values().copied().collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    /// Apply the account part of a successful chain
    ///
    /// New accounts are indexed by timestamp; existing ones are replaced by
    /// their updated copies.
    pub(crate) fn commit(
        &mut self,
        accounts: Vec<Account>,
        history: Vec<(Id128, AccountBalance)>,
    ) {
        for account in accounts {
            if self.accounts.insert(account.id, account).is_none() {
                self.by_timestamp.insert(account.timestamp, account.id);
            }
        }
        for (id, balance) in history {
            self.history.entry(id).or_default().push(balance);
        }
    }
}

/// Stage the creation of `account`
///
/// Field rules are checked first, then an existing account with the same id
/// (staged earlier in the chain or committed) turns the create into an
/// idempotence check. Imported accounts must carry a timestamp newer than
/// anything recorded so far.
///
/// # Arguments
///
/// * `overlay` - Staging area of the current chain
/// * `account` - The account as submitted
/// * `ctx` - Clock reading and the timestamp the account will get
///
/// # Returns
///
/// * `Ok(())` if the account was staged
/// * `Err(CreateAccountResult)` with the first rule it violated
pub fn create(
    overlay: &mut Overlay<'_>,
    account: &Account,
    ctx: &EventContext,
) -> Result<(), CreateAccountResult> {
    validator::validate_account(account)?;

    if let Some(existing) = overlay.account(account.id) {
        return Err(validator::account_exists(account, existing));
    }

    if account.flags.contains(AccountFlags::IMPORTED)
        && account.timestamp <= overlay.last_timestamp()
    {
        return Err(CreateAccountResult::TimestampMustBeGreaterThanValue);
    }

    overlay.insert_account(Account {
        timestamp: ctx.timestamp,
        ..*account
    });
    Ok(())
}

/// Stage one balance mutation on an account
///
/// The mutation is applied to the overlay's copy of the account and the
/// account invariants (no overflow, exceed-limits) are re-checked.
///
/// # Arguments
///
/// * `overlay` - Staging area of the current chain
/// * `account_id` - The account to mutate
/// * `effect` - Which balance to change, and by how much
///
/// # Returns
///
/// * `Ok(())` if the mutation keeps the account consistent
/// * `Err(CreateTransferResult)` with the violated invariant, or the
///   not-found code for the side the account was referenced from
pub fn apply_transfer_effect(
    overlay: &mut Overlay<'_>,
    account_id: Id128,
    effect: BalanceEffect,
) -> Result<(), CreateTransferResult> {
    let account = overlay.account_mut(account_id).ok_or(match effect.side {
        Side::Debit => CreateTransferResult::DebitAccountNotFound,
        Side::Credit => CreateTransferResult::CreditAccountNotFound,
    })?;
    account.apply_effect(effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::TimestampSequence;
    use crate::core::transfer_ledger::TransferLedger;
    use crate::types::{Delta, Phase};

    const NOW: Timestamp = 1_000;

    fn ctx(timestamp: Timestamp) -> EventContext {
        EventContext {
            now: NOW,
            timestamp,
        }
    }

    fn committed() -> AccountLedger {
        let mut ledger = AccountLedger::new();
        let mut account = Account::new(1, 1, 1).with_flags(AccountFlags::HISTORY);
        account.timestamp = 10;
        ledger.commit(vec![account], vec![(1, account.balance(10))]);
        ledger
    }

    #[test]
    fn test_new_creates_empty_ledger() {
        let ledger = AccountLedger::new();
        assert!(ledger.is_empty());
        assert!(ledger.get(1).is_none());
        assert!(ledger.history(1).is_empty());
    }

    #[test]
    fn test_create_stages_account_with_timestamp() {
        let accounts = committed();
        let transfers = TransferLedger::new();
        let mut overlay = Overlay::new(&accounts, &transfers, TimestampSequence::new(10));

        create(&mut overlay, &Account::new(2, 1, 1), &ctx(11)).unwrap();

        assert_eq!(overlay.account(2).map(|a| a.timestamp), Some(11));
        assert!(accounts.get(2).is_none());
    }

    #[test]
    fn test_create_existing_reports_exists() {
        let accounts = committed();
        let transfers = TransferLedger::new();
        let mut overlay = Overlay::new(&accounts, &transfers, TimestampSequence::new(10));

        let again = Account::new(1, 1, 1).with_flags(AccountFlags::HISTORY);
        assert_eq!(
            create(&mut overlay, &again, &ctx(11)),
            Err(CreateAccountResult::Exists)
        );
        assert_eq!(
            create(&mut overlay, &Account::new(1, 2, 1), &ctx(11)),
            Err(CreateAccountResult::ExistsWithDifferentFlags)
        );
    }

    #[test]
    fn test_create_sees_earlier_staged_account() {
        let accounts = committed();
        let transfers = TransferLedger::new();
        let mut overlay = Overlay::new(&accounts, &transfers, TimestampSequence::new(10));

        create(&mut overlay, &Account::new(2, 1, 1), &ctx(11)).unwrap();
        assert_eq!(
            create(&mut overlay, &Account::new(2, 1, 1), &ctx(12)),
            Err(CreateAccountResult::Exists)
        );
    }

    #[test]
    fn test_create_imported_must_be_newer_than_last() {
        let accounts = committed();
        let transfers = TransferLedger::new();
        let mut overlay = Overlay::new(&accounts, &transfers, TimestampSequence::new(10));

        let mut imported = Account::new(2, 1, 1).with_flags(AccountFlags::IMPORTED);
        imported.timestamp = 10;
        assert_eq!(
            create(&mut overlay, &imported, &ctx(10)),
            Err(CreateAccountResult::TimestampMustBeGreaterThanValue)
        );

        imported.timestamp = 11;
        assert_eq!(create(&mut overlay, &imported, &ctx(11)), Ok(()));
    }

    #[test]
    fn test_apply_transfer_effect_is_staged() {
        let accounts = committed();
        let transfers = TransferLedger::new();
        let mut overlay = Overlay::new(&accounts, &transfers, TimestampSequence::new(10));

        apply_transfer_effect(
            &mut overlay,
            1,
            BalanceEffect::credit(Phase::Posted, Delta::Increase(25)),
        )
        .unwrap();

        assert_eq!(overlay.account(1).unwrap().credits_posted, 25);
        assert_eq!(accounts.get(1).unwrap().credits_posted, 0);
    }

    #[test]
    fn test_apply_transfer_effect_unknown_account() {
        let accounts = committed();
        let transfers = TransferLedger::new();
        let mut overlay = Overlay::new(&accounts, &transfers, TimestampSequence::new(10));

        let result = apply_transfer_effect(
            &mut overlay,
            9,
            BalanceEffect::credit(Phase::Posted, Delta::Increase(1)),
        );
        assert_eq!(result, Err(CreateTransferResult::CreditAccountNotFound));
    }

    #[test]
    fn test_commit_indexes_new_accounts_once() {
        let mut ledger = committed();
        let mut updated = *ledger.get(1).unwrap();
        updated.credits_posted = 5;
        let mut added = Account::new(2, 1, 1);
        added.timestamp = 20;

        ledger.commit(vec![updated, added], vec![(1, updated.balance(20))]);

        let ids: Vec<_> = ledger.by_timestamp(0..=u64::MAX).map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(ledger.get(1).unwrap().credits_posted, 5);
        assert_eq!(ledger.history(1).len(), 2);
        assert_eq!(ledger.lookup(&[2, 7, 1]).len(), 2);
        assert_eq!(ledger.all_by_id()[0].id, 1);
    }
}
