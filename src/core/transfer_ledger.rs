//! Transfer ledger
//!
//! This module provides the committed transfer store and the transfer rules of
//! the decision engine:
//! - `TransferLedger` holds every committed transfer, indexed by id, timestamp,
//!   account and expiry deadline, plus the lifecycle of pending transfers and
//!   the ids of transfers that failed for state-dependent reasons
//! - `create` stages a plain, pending, post or void transfer in an [`Overlay`]
//! - `expire` stages the expiry of a pending transfer
//!
//! Pending lifecycle: `pending -> {posted, voided, expired}`. Every transition
//! is terminal and releases the full reservation on both accounts.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::ops::RangeInclusive;

use super::account_ledger;
use super::overlay::{EventContext, Overlay};
use super::validator;
use crate::types::{
    AccountFlags, BalanceEffect, CreateTransferResult, Delta, Id128, PendingStatus, Phase,
    Timestamp, Transfer, TransferFlags, ID_MAX,
};

type R = CreateTransferResult;

/// Committed transfers
#[derive(Debug, Default)]
pub struct TransferLedger {
    /// Map of transfer ids to transfer records
    transfers: HashMap<Id128, Transfer>,

    /// Creation order; timestamps are unique across the whole ledger
    by_timestamp: BTreeMap<Timestamp, Id128>,

    /// `(account id, transfer timestamp)` for both sides of every transfer
    by_account: BTreeSet<(Id128, Timestamp)>,

    /// Lifecycle of every pending transfer
    statuses: HashMap<Id128, PendingStatus>,

    /// `(deadline, id)` of pending transfers that can still expire
    expiry: BTreeSet<(Timestamp, Id128)>,

    /// Ids burned by a state-dependent failure
    failed: HashSet<Id128>,
}

impl TransferLedger {
    /// Create an empty TransferLedger
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Id128) -> Option<&Transfer> {
        self.transfers.get(&id)
    }

    /// Look up transfers by id, omitting unknown ids
    pub fn lookup(&self, ids: &[Id128]) -> Vec<Transfer> {
        ids.iter().filter_map(|id| self.get(*id)).copied().collect()
    }

    /// Lifecycle state of a pending transfer (`None` for anything else)
    pub fn status(&self, id: Id128) -> Option<PendingStatus> {
        self.statuses.get(&id).copied()
    }

    pub fn has_failed(&self, id: Id128) -> bool {
        self.failed.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Transfers created within `range`, in timestamp order
    pub fn by_timestamp(
        &self,
        range: RangeInclusive<Timestamp>,
    ) -> impl DoubleEndedIterator<Item = &Transfer> + '_ {
        self.by_timestamp
            .range(range)
            .filter_map(|(_, id)| self.transfers.get(id))
    }

    /// Transfers debiting or crediting `account_id` within `range`, in
    /// timestamp order
    pub fn for_account(
        &self,
        account_id: Id128,
        range: RangeInclusive<Timestamp>,
    ) -> impl DoubleEndedIterator<Item = &Transfer> + '_ {
        let (min, max) = range.into_inner();
        self.by_account
            .range((account_id, min)..=(account_id, max))
            .filter_map(|(_, timestamp)| self.by_timestamp.get(timestamp))
            .filter_map(|id| self.transfers.get(id))
    }

    /// Transfer at an exact timestamp
    pub fn at(&self, timestamp: Timestamp) -> Option<&Transfer> {
        self.by_timestamp
            .get(&timestamp)
            .and_then(|id| self.transfers.get(id))
    }

    /// Pending transfers whose deadline is at or before `as_of`, earliest first
    pub fn due(&self, as_of: Timestamp) -> Vec<Id128> {
        self.expiry
            .range(..=(as_of, ID_MAX))
            .map(|(_, id)| *id)
            .collect()
    }

    /// Burn the id of a transfer that failed for a state-dependent reason
    pub(crate) fn record_failure(&mut self, id: Id128) {
        self.failed.insert(id);
    }

    /// Apply the transfer part of a successful chain or expiry sweep
    pub(crate) fn commit(&mut self, transfers: Vec<Transfer>, statuses: Vec<(Id128, PendingStatus)>) {
        for transfer in transfers {
            self.by_timestamp.insert(transfer.timestamp, transfer.id);
            self.by_account
                .insert((transfer.debit_account_id, transfer.timestamp));
            self.by_account
                .insert((transfer.credit_account_id, transfer.timestamp));
            if transfer.is_pending() {
                if let Some(deadline) = transfer.expires_at() {
                    self.expiry.insert((deadline, transfer.id));
                }
            }
            self.transfers.insert(transfer.id, transfer);
        }

        for (id, status) in statuses {
            if status != PendingStatus::Pending {
                if let Some(deadline) = self.transfers.get(&id).and_then(Transfer::expires_at) {
                    self.expiry.remove(&(deadline, id));
                }
            }
            self.statuses.insert(id, status);
        }
    }
}

/// Stage the creation of `transfer`
///
/// Dispatches post and void transfers to their own rule set; plain and
/// pending transfers are checked here.
///
/// # Arguments
///
/// * `overlay` - Staging area of the current chain
/// * `transfer` - The transfer as submitted
/// * `ctx` - Clock reading and the timestamp the transfer will get
///
/// # Returns
///
/// * `Ok(())` if the transfer and its balance effects were staged
/// * `Err(CreateTransferResult)` with the first rule it violated
pub fn create(
    overlay: &mut Overlay<'_>,
    transfer: &Transfer,
    ctx: &EventContext,
) -> Result<(), CreateTransferResult> {
    validator::validate_transfer_id(transfer)?;
    if transfer.flags.is_post_or_void() {
        return post_or_void(overlay, transfer, ctx);
    }
    validator::validate_transfer(transfer)?;

    let debit = *overlay
        .account(transfer.debit_account_id)
        .ok_or(R::DebitAccountNotFound)?;
    let credit = *overlay
        .account(transfer.credit_account_id)
        .ok_or(R::CreditAccountNotFound)?;
    if debit.ledger != credit.ledger {
        return Err(R::AccountsMustHaveTheSameLedger);
    }
    if transfer.ledger != debit.ledger {
        return Err(R::TransferMustHaveTheSameLedgerAsAccounts);
    }

    // An existing transfer must not be re-evaluated against current balances
    if let Some(existing) = overlay.transfer(transfer.id) {
        return Err(validator::transfer_exists(transfer, existing));
    }
    if overlay.has_failed(transfer.id) {
        return Err(R::IdAlreadyFailed);
    }

    if transfer.flags.contains(TransferFlags::IMPORTED) {
        if transfer.timestamp <= overlay.last_timestamp() {
            return Err(R::TimestampMustBeGreaterThanValue);
        }
        if transfer.timestamp <= debit.timestamp {
            return Err(R::ImportedEventTimestampMustPostdateDebitAccount);
        }
        if transfer.timestamp <= credit.timestamp {
            return Err(R::ImportedEventTimestampMustPostdateCreditAccount);
        }
        if transfer.timeout != 0 {
            return Err(R::ImportedEventTimeoutMustBeZero);
        }
    }

    if debit.is_closed() {
        return Err(R::DebitAccountAlreadyClosed);
    }
    if credit.is_closed() {
        return Err(R::CreditAccountAlreadyClosed);
    }

    let amount = validator::applied_amount(transfer, &debit, &credit);
    let pending = transfer.is_pending();

    if pending {
        if debit.debits_pending.checked_add(amount).is_none() {
            return Err(R::OverflowsDebitsPending);
        }
        if credit.credits_pending.checked_add(amount).is_none() {
            return Err(R::OverflowsCreditsPending);
        }
    }
    if debit.debits_posted.checked_add(amount).is_none() {
        return Err(R::OverflowsDebitsPosted);
    }
    if credit.credits_posted.checked_add(amount).is_none() {
        return Err(R::OverflowsCreditsPosted);
    }
    if debit
        .debits_pending
        .checked_add(debit.debits_posted)
        .and_then(|debits| debits.checked_add(amount))
        .is_none()
    {
        return Err(R::OverflowsDebits);
    }
    if credit
        .credits_pending
        .checked_add(credit.credits_posted)
        .and_then(|credits| credits.checked_add(amount))
        .is_none()
    {
        return Err(R::OverflowsCredits);
    }

    let stored = Transfer {
        amount,
        timestamp: ctx.timestamp,
        ..*transfer
    };
    if stored.timeout != 0 && stored.expires_at().is_none() {
        return Err(R::OverflowsTimeout);
    }

    if debit.debits_exceed_credits(amount) {
        return Err(R::ExceedsCredits);
    }
    if credit.credits_exceed_debits(amount) {
        return Err(R::ExceedsDebits);
    }

    let phase = if pending { Phase::Pending } else { Phase::Posted };
    account_ledger::apply_transfer_effect(
        overlay,
        debit.id,
        BalanceEffect::debit(phase, Delta::Increase(amount)),
    )?;
    account_ledger::apply_transfer_effect(
        overlay,
        credit.id,
        BalanceEffect::credit(phase, Delta::Increase(amount)),
    )?;

    if pending {
        if transfer.flags.contains(TransferFlags::CLOSING_DEBIT) {
            set_closed(overlay, debit.id, true);
        }
        if transfer.flags.contains(TransferFlags::CLOSING_CREDIT) {
            set_closed(overlay, credit.id, true);
        }
        overlay.set_status(stored.id, PendingStatus::Pending);
    }

    overlay.insert_transfer(stored);
    overlay.snapshot(debit.id, stored.timestamp);
    overlay.snapshot(credit.id, stored.timestamp);
    Ok(())
}

fn post_or_void(
    overlay: &mut Overlay<'_>,
    transfer: &Transfer,
    ctx: &EventContext,
) -> Result<(), CreateTransferResult> {
    validator::validate_post_or_void(transfer)?;

    let pending = *overlay
        .transfer(transfer.pending_id)
        .ok_or(R::PendingTransferNotFound)?;
    validator::validate_against_pending(transfer, &pending)?;

    let resolved = Transfer {
        timestamp: ctx.timestamp,
        ..validator::resolve_post_or_void(transfer, &pending)
    };

    // Checked before the lifecycle so that a replayed post reports `exists`
    if let Some(existing) = overlay.transfer(transfer.id) {
        return Err(validator::post_or_void_exists(transfer, &resolved, existing));
    }
    if overlay.has_failed(transfer.id) {
        return Err(R::IdAlreadyFailed);
    }
    if transfer.flags.contains(TransferFlags::IMPORTED)
        && transfer.timestamp <= overlay.last_timestamp()
    {
        return Err(R::TimestampMustBeGreaterThanValue);
    }

    match overlay.pending_status(pending.id) {
        Some(PendingStatus::Posted) => return Err(R::PendingTransferAlreadyPosted),
        Some(PendingStatus::Voided) => return Err(R::PendingTransferAlreadyVoided),
        Some(PendingStatus::Expired) => return Err(R::PendingTransferExpired),
        Some(PendingStatus::Pending) | None => {}
    }
    if pending
        .expires_at()
        .is_some_and(|deadline| deadline <= resolved.timestamp)
    {
        return Err(R::PendingTransferExpired);
    }

    let debit = *overlay
        .account(pending.debit_account_id)
        .ok_or(R::DebitAccountNotFound)?;
    let credit = *overlay
        .account(pending.credit_account_id)
        .ok_or(R::CreditAccountNotFound)?;

    let post = transfer.flags.contains(TransferFlags::POST_PENDING_TRANSFER);
    if post {
        if !pending.flags.contains(TransferFlags::CLOSING_DEBIT) && debit.is_closed() {
            return Err(R::DebitAccountAlreadyClosed);
        }
        if !pending.flags.contains(TransferFlags::CLOSING_CREDIT) && credit.is_closed() {
            return Err(R::CreditAccountAlreadyClosed);
        }
        if debit.debits_posted.checked_add(resolved.amount).is_none() {
            return Err(R::OverflowsDebitsPosted);
        }
        if credit.credits_posted.checked_add(resolved.amount).is_none() {
            return Err(R::OverflowsCreditsPosted);
        }
    }

    release(overlay, &pending)?;
    if post {
        account_ledger::apply_transfer_effect(
            overlay,
            debit.id,
            BalanceEffect::debit(Phase::Posted, Delta::Increase(resolved.amount)),
        )?;
        account_ledger::apply_transfer_effect(
            overlay,
            credit.id,
            BalanceEffect::credit(Phase::Posted, Delta::Increase(resolved.amount)),
        )?;
        overlay.set_status(pending.id, PendingStatus::Posted);
    } else {
        reopen(overlay, &pending);
        overlay.set_status(pending.id, PendingStatus::Voided);
    }

    overlay.insert_transfer(resolved);
    overlay.snapshot(debit.id, resolved.timestamp);
    overlay.snapshot(credit.id, resolved.timestamp);
    Ok(())
}

/// Stage the expiry of a pending transfer
///
/// Releases the reservation and reopens accounts the transfer closed, like a
/// void, but creates no transfer record.
pub fn expire(overlay: &mut Overlay<'_>, id: Id128) -> Result<(), CreateTransferResult> {
    let pending = *overlay.transfer(id).ok_or(R::PendingTransferNotFound)?;
    match overlay.pending_status(id) {
        Some(PendingStatus::Pending) => {}
        Some(PendingStatus::Posted) => return Err(R::PendingTransferAlreadyPosted),
        Some(PendingStatus::Voided) => return Err(R::PendingTransferAlreadyVoided),
        Some(PendingStatus::Expired) => return Err(R::PendingTransferExpired),
        None => return Err(R::PendingTransferNotPending),
    }

    release(overlay, &pending)?;
    reopen(overlay, &pending);
    overlay.set_status(id, PendingStatus::Expired);
    Ok(())
}

/// Give back the full reservation of a pending transfer on both accounts
fn release(overlay: &mut Overlay<'_>, pending: &Transfer) -> Result<(), CreateTransferResult> {
    account_ledger::apply_transfer_effect(
        overlay,
        pending.debit_account_id,
        BalanceEffect::debit(Phase::Pending, Delta::Decrease(pending.amount)),
    )?;
    account_ledger::apply_transfer_effect(
        overlay,
        pending.credit_account_id,
        BalanceEffect::credit(Phase::Pending, Delta::Decrease(pending.amount)),
    )
}

fn reopen(overlay: &mut Overlay<'_>, pending: &Transfer) {
    if pending.flags.contains(TransferFlags::CLOSING_DEBIT) {
        set_closed(overlay, pending.debit_account_id, false);
    }
    if pending.flags.contains(TransferFlags::CLOSING_CREDIT) {
        set_closed(overlay, pending.credit_account_id, false);
    }
}

fn set_closed(overlay: &mut Overlay<'_>, account_id: Id128, closed: bool) {
    if let Some(account) = overlay.account_mut(account_id) {
        account.flags.set(AccountFlags::CLOSED, closed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::account_ledger::AccountLedger;
    use crate::core::clock::TimestampSequence;
    use crate::types::{Account, Amount128, AMOUNT_MAX, NS_PER_SECOND};

    const START: Timestamp = 100;

    fn accounts() -> AccountLedger {
        let mut ledger = AccountLedger::new();
        let debit = Account {
            timestamp: 1,
            ..Account::new(1, 1, 1)
        };
        let credit = Account {
            timestamp: 2,
            ..Account::new(2, 1, 1)
        };
        let limited = Account {
            timestamp: 3,
            ..Account::new(3, 1, 1).with_flags(AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS)
        };
        let other_ledger = Account {
            timestamp: 4,
            ..Account::new(4, 2, 1)
        };
        ledger.commit(vec![debit, credit, limited, other_ledger], Vec::new());
        ledger
    }

    /// Committed ledgers that each test transfer is staged against
    struct Harness {
        accounts: AccountLedger,
        transfers: TransferLedger,
        sequence: TimestampSequence,
    }

    impl Harness {
        fn new() -> Self {
            Harness {
                accounts: accounts(),
                transfers: TransferLedger::new(),
                sequence: TimestampSequence::new(START),
            }
        }

        /// Stage and commit a single transfer
        fn run(&mut self, transfer: Transfer) -> Result<(), CreateTransferResult> {
            let mut overlay = Overlay::new(&self.accounts, &self.transfers, self.sequence);
            let timestamp = if transfer.flags.contains(TransferFlags::IMPORTED) {
                transfer.timestamp
            } else {
                overlay.next_timestamp(START)
            };
            let ctx = EventContext {
                now: START,
                timestamp,
            };
            create(&mut overlay, &transfer, &ctx)?;
            overlay.advance_to(timestamp);
            let changes = overlay.into_changes();
            self.accounts.commit(changes.accounts, changes.history);
            self.transfers.commit(changes.transfers, changes.statuses);
            self.sequence = changes.sequence;
            Ok(())
        }

        fn account(&self, id: Id128) -> Account {
            *self.accounts.get(id).unwrap()
        }
    }

    fn plain(id: Id128, debit: Id128, credit: Id128, amount: Amount128) -> Transfer {
        Transfer::new(id, debit, credit, amount, 1, 1)
    }

    fn pending(id: Id128, amount: Amount128) -> Transfer {
        plain(id, 1, 2, amount).with_flags(TransferFlags::PENDING)
    }

    #[test]
    fn test_plain_transfer_posts_both_sides() {
        let mut harness = Harness::new();
        harness.run(plain(10, 1, 2, 50)).unwrap();

        assert_eq!(harness.account(1).debits_posted, 50);
        assert_eq!(harness.account(2).credits_posted, 50);
        assert_eq!(harness.transfers.get(10).unwrap().timestamp, START + 1);
        assert_eq!(harness.transfers.status(10), None);
    }

    #[test]
    fn test_lookup_failures() {
        let mut harness = Harness::new();
        assert_eq!(harness.run(plain(10, 9, 2, 1)), Err(R::DebitAccountNotFound));
        assert_eq!(harness.run(plain(10, 1, 9, 1)), Err(R::CreditAccountNotFound));
        assert_eq!(harness.run(plain(10, 1, 4, 1)), Err(R::AccountsMustHaveTheSameLedger));
        assert_eq!(
            harness.run(Transfer { ledger: 2, ..plain(10, 1, 2, 1) }),
            Err(R::TransferMustHaveTheSameLedgerAsAccounts)
        );
    }

    #[test]
    fn test_existing_transfer_is_not_reapplied() {
        let mut harness = Harness::new();
        harness.run(plain(10, 1, 2, 50)).unwrap();
        assert_eq!(harness.run(plain(10, 1, 2, 50)), Err(R::Exists));
        assert_eq!(
            harness.run(plain(10, 1, 2, 51)),
            Err(R::ExistsWithDifferentAmount)
        );
        assert_eq!(harness.account(1).debits_posted, 50);
    }

    #[test]
    fn test_exceeds_credits() {
        let mut harness = Harness::new();
        harness.run(plain(10, 1, 3, 30)).unwrap();
        assert_eq!(harness.run(plain(11, 3, 2, 31)), Err(R::ExceedsCredits));
        harness.run(plain(12, 3, 2, 30)).unwrap();
        assert_eq!(harness.account(3).debits_posted, 30);
    }

    #[test]
    fn test_overflow_checks() {
        let mut harness = Harness::new();
        harness.run(plain(10, 1, 2, AMOUNT_MAX - 1)).unwrap();
        assert_eq!(harness.run(plain(11, 1, 4, 2)), Err(R::AccountsMustHaveTheSameLedger));
        assert_eq!(harness.run(plain(11, 1, 3, 2)), Err(R::OverflowsDebitsPosted));
        assert_eq!(
            harness.run(plain(12, 3, 1, 2).with_flags(TransferFlags::PENDING)),
            Err(R::ExceedsCredits)
        );
        harness.run(pending(13, 1)).unwrap();
        assert_eq!(harness.run(pending(14, 1)), Err(R::OverflowsDebits));
    }

    #[test]
    fn test_pending_then_post_full_amount() {
        let mut harness = Harness::new();
        harness.run(pending(10, 40)).unwrap();
        assert_eq!(harness.account(1).debits_pending, 40);
        assert_eq!(harness.transfers.status(10), Some(PendingStatus::Pending));

        let post = Transfer::resolving(11, 10, AMOUNT_MAX, TransferFlags::POST_PENDING_TRANSFER);
        harness.run(post).unwrap();

        let debit = harness.account(1);
        assert_eq!(debit.debits_pending, 0);
        assert_eq!(debit.debits_posted, 40);
        assert_eq!(harness.account(2).credits_posted, 40);
        assert_eq!(harness.transfers.status(10), Some(PendingStatus::Posted));

        let stored = harness.transfers.get(11).unwrap();
        assert_eq!(stored.amount, 40);
        assert_eq!(stored.debit_account_id, 1);

        assert_eq!(harness.run(post), Err(R::Exists));
        let again = Transfer::resolving(12, 10, AMOUNT_MAX, TransferFlags::POST_PENDING_TRANSFER);
        assert_eq!(harness.run(again), Err(R::PendingTransferAlreadyPosted));
    }

    #[test]
    fn test_partial_post_releases_remainder() {
        let mut harness = Harness::new();
        harness.run(pending(10, 40)).unwrap();
        harness
            .run(Transfer::resolving(11, 10, 15, TransferFlags::POST_PENDING_TRANSFER))
            .unwrap();

        let debit = harness.account(1);
        assert_eq!(debit.debits_pending, 0);
        assert_eq!(debit.debits_posted, 15);
    }

    #[test]
    fn test_void_releases_reservation() {
        let mut harness = Harness::new();
        harness.run(pending(10, 40)).unwrap();
        harness
            .run(Transfer::resolving(11, 10, 0, TransferFlags::VOID_PENDING_TRANSFER))
            .unwrap();

        let debit = harness.account(1);
        assert_eq!(debit.debits_pending, 0);
        assert_eq!(debit.debits_posted, 0);
        assert_eq!(harness.transfers.status(10), Some(PendingStatus::Voided));

        let post = Transfer::resolving(12, 10, AMOUNT_MAX, TransferFlags::POST_PENDING_TRANSFER);
        assert_eq!(harness.run(post), Err(R::PendingTransferAlreadyVoided));
    }

    #[test]
    fn test_post_of_unknown_or_plain_transfer() {
        let mut harness = Harness::new();
        harness.run(plain(10, 1, 2, 5)).unwrap();

        let post = Transfer::resolving(11, 99, AMOUNT_MAX, TransferFlags::POST_PENDING_TRANSFER);
        assert_eq!(harness.run(post), Err(R::PendingTransferNotFound));

        let post = Transfer::resolving(11, 10, AMOUNT_MAX, TransferFlags::POST_PENDING_TRANSFER);
        assert_eq!(harness.run(post), Err(R::PendingTransferNotPending));
    }

    #[test]
    fn test_post_after_deadline_is_expired() {
        let mut harness = Harness::new();
        harness
            .run(Transfer {
                timeout: 1,
                ..pending(10, 40)
            })
            .unwrap();
        let created = harness.transfers.get(10).unwrap().timestamp;
        assert_eq!(harness.transfers.due(created + NS_PER_SECOND), vec![10]);

        harness.sequence = TimestampSequence::new(created + NS_PER_SECOND - 1);
        let post = Transfer::resolving(11, 10, AMOUNT_MAX, TransferFlags::POST_PENDING_TRANSFER);
        assert_eq!(harness.run(post), Err(R::PendingTransferExpired));
    }

    #[test]
    fn test_expire_releases_and_clears_deadline() {
        let mut harness = Harness::new();
        harness
            .run(Transfer {
                timeout: 1,
                ..pending(10, 40)
            })
            .unwrap();

        let mut overlay = Overlay::new(&harness.accounts, &harness.transfers, harness.sequence);
        expire(&mut overlay, 10).unwrap();
        assert_eq!(expire(&mut overlay, 10), Err(R::PendingTransferExpired));
        let changes = overlay.into_changes();
        harness.accounts.commit(changes.accounts, changes.history);
        harness.transfers.commit(changes.transfers, changes.statuses);

        assert_eq!(harness.account(1).debits_pending, 0);
        assert_eq!(harness.transfers.status(10), Some(PendingStatus::Expired));
        assert!(harness.transfers.due(u64::MAX).is_empty());
    }

    #[test]
    fn test_closing_transfer_closes_and_void_reopens() {
        let mut harness = Harness::new();
        harness
            .run(pending(10, 5).with_flags(TransferFlags::PENDING | TransferFlags::CLOSING_DEBIT))
            .unwrap();
        assert!(harness.account(1).is_closed());
        assert_eq!(harness.run(plain(11, 1, 2, 1)), Err(R::DebitAccountAlreadyClosed));
        assert_eq!(harness.run(plain(12, 2, 1, 1)), Err(R::CreditAccountAlreadyClosed));

        harness
            .run(Transfer::resolving(13, 10, 0, TransferFlags::VOID_PENDING_TRANSFER))
            .unwrap();
        assert!(!harness.account(1).is_closed());
    }

    #[test]
    fn test_balancing_transfer_stores_applied_amount() {
        let mut harness = Harness::new();
        harness.run(plain(10, 1, 3, 30)).unwrap();
        harness
            .run(plain(11, 3, 2, 0).with_flags(TransferFlags::BALANCING_DEBIT))
            .unwrap();

        assert_eq!(harness.transfers.get(11).unwrap().amount, 30);
        assert_eq!(harness.account(3).debits_posted, 30);
    }

    #[test]
    fn test_imported_transfer_timestamps() {
        let mut harness = Harness::new();
        let imported = |timestamp| Transfer {
            timestamp,
            ..plain(10, 1, 2, 5).with_flags(TransferFlags::IMPORTED)
        };

        assert_eq!(
            harness.run(imported(START)),
            Err(R::TimestampMustBeGreaterThanValue)
        );

        harness.sequence = TimestampSequence::new(0);
        assert_eq!(
            harness.run(imported(1)),
            Err(R::ImportedEventTimestampMustPostdateDebitAccount)
        );
        assert_eq!(
            harness.run(imported(2)),
            Err(R::ImportedEventTimestampMustPostdateCreditAccount)
        );
        assert_eq!(
            harness.run(Transfer {
                timeout: 1,
                ..imported(50).with_flags(TransferFlags::IMPORTED | TransferFlags::PENDING)
            }),
            Err(R::ImportedEventTimeoutMustBeZero)
        );
        harness.run(imported(50)).unwrap();
        assert_eq!(harness.transfers.get(10).unwrap().timestamp, 50);
    }

    #[test]
    fn test_failed_ids_are_burned() {
        let mut harness = Harness::new();
        harness.transfers.record_failure(10);
        assert_eq!(harness.run(plain(10, 1, 2, 5)), Err(R::IdAlreadyFailed));
    }

    #[test]
    fn test_for_account_index() {
        let mut harness = Harness::new();
        harness.run(plain(10, 1, 2, 5)).unwrap();
        harness.run(plain(11, 2, 3, 5)).unwrap();
        harness.run(plain(12, 3, 1, 5)).unwrap();

        let ids: Vec<_> = harness
            .transfers
            .for_account(1, 0..=u64::MAX)
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![10, 12]);

        let newest = harness.transfers.for_account(2, 0..=u64::MAX).next_back();
        assert_eq!(newest.map(|t| t.id), Some(11));
        assert_eq!(harness.transfers.lookup(&[12, 99, 10]).len(), 2);
    }
}
