//! Copy-on-write staging area for one chain
//!
//! Every event of a chain is validated and applied against an [`Overlay`]
//! layered over the committed ledgers. Reads fall through to the committed
//! state; writes land in the overlay only. When the chain succeeds the overlay
//! is turned into a [`ChangeSet`] and committed in one step, otherwise it is
//! simply dropped.

use std::collections::HashMap;

use super::account_ledger::AccountLedger;
use super::clock::TimestampSequence;
use super::transfer_ledger::TransferLedger;
use crate::types::{Account, AccountBalance, AccountFlags, Id128, PendingStatus, Timestamp, Transfer};

/// Per-event inputs the ledgers need besides the event itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventContext {
    /// Clock reading taken once for the whole batch
    pub now: Timestamp,

    /// Timestamp the event is stamped with if it succeeds
    pub timestamp: Timestamp,
}

/// Staged state of a chain in progress
#[derive(Debug)]
pub struct Overlay<'a> {
    accounts: &'a AccountLedger,
    transfers: &'a TransferLedger,

    staged_accounts: HashMap<Id128, Account>,
    account_order: Vec<Id128>,

    staged_transfers: Vec<Transfer>,
    transfer_index: HashMap<Id128, usize>,

    statuses: HashMap<Id128, PendingStatus>,
    history: Vec<(Id128, AccountBalance)>,
    sequence: TimestampSequence,
}

/// Everything a successful chain changed, in the order it changed it
#[derive(Debug, Default)]
pub struct ChangeSet {
    /// New accounts and updated copies of existing ones
    pub accounts: Vec<Account>,
    pub transfers: Vec<Transfer>,
    pub statuses: Vec<(Id128, PendingStatus)>,
    pub history: Vec<(Id128, AccountBalance)>,
    pub sequence: TimestampSequence,
}

impl<'a> Overlay<'a> {
    pub fn new(
        accounts: &'a AccountLedger,
        transfers: &'a TransferLedger,
        sequence: TimestampSequence,
    ) -> Self {
        Overlay {
            accounts,
            transfers,
            staged_accounts: HashMap::new(),
            account_order: Vec::new(),
            staged_transfers: Vec::new(),
            transfer_index: HashMap::new(),
            statuses: HashMap::new(),
            history: Vec::new(),
            sequence,
        }
    }

    pub fn account(&self, id: Id128) -> Option<&Account> {
        self.staged_accounts
            .get(&id)
            .or_else(|| self.accounts.get(id))
    }

    /// Mutable access, copying the committed record into the overlay first
    pub fn account_mut(&mut self, id: Id128) -> Option<&mut Account> {
        if !self.staged_accounts.contains_key(&id) {
            let committed = *self.accounts.get(id)?;
            self.staged_accounts.insert(id, committed);
            self.account_order.push(id);
        }
        self.staged_accounts.get_mut(&id)
    }

    pub fn insert_account(&mut self, account: Account) {
        if self.staged_accounts.insert(account.id, account).is_none() {
            self.account_order.push(account.id);
        }
    }

    pub fn transfer(&self, id: Id128) -> Option<&Transfer> {
        match self.transfer_index.get(&id) {
            Some(&index) => self.staged_transfers.get(index),
            None => self.transfers.get(id),
        }
    }

    pub fn insert_transfer(&mut self, transfer: Transfer) {
        self.transfer_index
            .insert(transfer.id, self.staged_transfers.len());
        self.staged_transfers.push(transfer);
    }

    pub fn pending_status(&self, id: Id128) -> Option<PendingStatus> {
        self.statuses
            .get(&id)
            .copied()
            .or_else(|| self.transfers.status(id))
    }

    pub fn set_status(&mut self, id: Id128, status: PendingStatus) {
        self.statuses.insert(id, status);
    }

    /// Did a transfer with this id fail for a state-dependent reason before?
    pub fn has_failed(&self, id: Id128) -> bool {
        self.transfers.has_failed(id)
    }

    /// Highest timestamp committed or staged so far
    pub fn last_timestamp(&self) -> Timestamp {
        self.sequence.last()
    }

    /// Timestamp a non-imported event evaluated now would receive
    pub fn next_timestamp(&self, now: Timestamp) -> Timestamp {
        self.sequence.peek(now)
    }

    pub fn advance_to(&mut self, timestamp: Timestamp) {
        self.sequence.advance_to(timestamp);
    }

    /// Append a balance snapshot if the account keeps history
    pub fn snapshot(&mut self, id: Id128, timestamp: Timestamp) {
        if let Some(account) = self.account(id) {
            if account.flags.contains(AccountFlags::HISTORY) {
                let balance = account.balance(timestamp);
                self.history.push((id, balance));
            }
        }
    }

    pub fn into_changes(mut self) -> ChangeSet {
        let accounts = self
            .account_order
            .iter()
            .filter_map(|id| self.staged_accounts.remove(id))
            .collect();

        ChangeSet {
            accounts,
            transfers: self.staged_transfers,
            statuses: self.statuses.into_iter().collect(),
            history: self.history,
            sequence: self.sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledgers() -> (AccountLedger, TransferLedger) {
        let mut accounts = AccountLedger::new();
        let mut committed = Account::new(1, 1, 1);
        committed.timestamp = 10;
        accounts.commit(vec![committed], Vec::new());
        (accounts, TransferLedger::new())
    }

    #[test]
    fn test_reads_fall_through_to_committed_state() {
        let (accounts, transfers) = ledgers();
        let overlay = Overlay::new(&accounts, &transfers, TimestampSequence::new(10));
        assert_eq!(overlay.account(1).map(|a| a.timestamp), Some(10));
        assert!(overlay.account(2).is_none());
        assert!(overlay.transfer(1).is_none());
    }

    #[test]
    fn test_writes_are_copy_on_write() {
        let (accounts, transfers) = ledgers();
        let mut overlay = Overlay::new(&accounts, &transfers, TimestampSequence::new(10));

        overlay.account_mut(1).unwrap().credits_posted = 50;
        assert_eq!(overlay.account(1).unwrap().credits_posted, 50);
        assert_eq!(accounts.get(1).unwrap().credits_posted, 0);

        let changes = overlay.into_changes();
        assert_eq!(changes.accounts.len(), 1);
        assert_eq!(changes.accounts[0].credits_posted, 50);
    }

    #[test]
    fn test_staged_records_are_visible_and_ordered() {
        let (accounts, transfers) = ledgers();
        let mut overlay = Overlay::new(&accounts, &transfers, TimestampSequence::new(10));

        overlay.insert_account(Account::new(3, 1, 1));
        overlay.insert_account(Account::new(2, 1, 1));
        overlay.insert_transfer(Transfer::new(9, 1, 2, 5, 1, 1));
        overlay.set_status(9, PendingStatus::Pending);

        assert!(overlay.account(3).is_some());
        assert_eq!(overlay.transfer(9).map(|t| t.amount), Some(5));
        assert_eq!(overlay.pending_status(9), Some(PendingStatus::Pending));

        let changes = overlay.into_changes();
        let ids: Vec<_> = changes.accounts.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(changes.transfers.len(), 1);
    }

    #[test]
    fn test_timestamps_advance_inside_overlay_only() {
        let (accounts, transfers) = ledgers();
        let sequence = TimestampSequence::new(10);
        let mut overlay = Overlay::new(&accounts, &transfers, sequence);

        assert_eq!(overlay.next_timestamp(5), 11);
        overlay.advance_to(11);
        assert_eq!(overlay.next_timestamp(5), 12);
        assert_eq!(sequence.last(), 10);
    }

    #[test]
    fn test_snapshot_only_for_history_accounts() {
        let (accounts, transfers) = ledgers();
        let mut overlay = Overlay::new(&accounts, &transfers, TimestampSequence::new(10));
        overlay.insert_account(Account::new(2, 1, 1).with_flags(AccountFlags::HISTORY));

        overlay.snapshot(1, 20);
        overlay.snapshot(2, 20);

        let changes = overlay.into_changes();
        assert_eq!(changes.history.len(), 1);
        assert_eq!(changes.history[0].0, 2);
        assert_eq!(changes.history[0].1.timestamp, 20);
    }
}
