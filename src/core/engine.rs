//! Ledger engine
//!
//! This module provides the LedgerEngine that owns the committed ledgers and
//! turns each submitted batch into a deterministic sequence of state changes.
//!
//! The engine enforces the batch-level rules:
//! - A batch is split into linked chains that succeed or fail as a unit
//! - Imported and non-imported events are never mixed within a chain
//! - Every successful event gets a unique, strictly increasing timestamp
//! - Only failures are reported, each by its index in the batch

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use super::account_ledger::{self, AccountLedger};
use super::chain::{self, Chain};
use super::clock::{Clock, SystemClock, TimestampSequence};
use super::overlay::{ChangeSet, EventContext, Overlay};
use super::query;
use super::traits::{LedgerEvent, ResultCode};
use super::transfer_ledger::{self, TransferLedger};
use super::validator;
use crate::types::{
    Account, AccountBalance, AccountFilter, Batch, BatchResults, CreateAccountsResult,
    CreateTransfersResult, Id128, PendingStatus, QueryFilter, Timestamp, Transfer,
};

/// Ledger engine
///
/// Single-writer state machine over an [`AccountLedger`] and a
/// [`TransferLedger`]. All mutation goes through `create_accounts`,
/// `create_transfers` and `expire_due`; everything else is a read.
#[derive(Debug)]
pub struct LedgerEngine {
    clock: Arc<dyn Clock>,
    sequence: TimestampSequence,
    accounts: AccountLedger,
    transfers: TransferLedger,
}

impl LedgerEngine {
    /// Create an empty LedgerEngine reading time from `clock`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_high_water_mark(clock, 0)
    }

    /// Create an empty LedgerEngine whose first timestamp is above
    /// `high_water_mark`
    ///
    /// Used when resuming after timestamps up to `high_water_mark` have
    /// already been handed out elsewhere.
    pub fn with_high_water_mark(clock: Arc<dyn Clock>, high_water_mark: Timestamp) -> Self {
        LedgerEngine {
            clock,
            sequence: TimestampSequence::new(high_water_mark),
            accounts: AccountLedger::new(),
            transfers: TransferLedger::new(),
        }
    }

    /// Create a batch of accounts
    ///
    /// # Arguments
    ///
    /// * `accounts` - Accounts in submission order; `linked` groups them into
    ///   chains
    ///
    /// # Returns
    ///
    /// One entry per rejected account, ascending by index. An empty vector
    /// means every account was created (or the batch was empty).
    pub fn create_accounts(&mut self, accounts: &[Account]) -> Vec<CreateAccountsResult> {
        self.execute(accounts, account_ledger::create)
            .into_iter()
            .map(|(index, result)| CreateAccountsResult { index, result })
            .collect()
    }

    /// Create a batch of transfers
    ///
    /// Plain, pending, post, void, balancing and closing transfers may be
    /// mixed freely in one batch; a later transfer sees the effects of every
    /// earlier successful one.
    ///
    /// # Returns
    ///
    /// One entry per rejected transfer, ascending by index
    pub fn create_transfers(&mut self, transfers: &[Transfer]) -> Vec<CreateTransfersResult> {
        self.execute(transfers, transfer_ledger::create)
            .into_iter()
            .map(|(index, result)| CreateTransfersResult { index, result })
            .collect()
    }

    /// Apply a batch of either kind
    pub fn submit(&mut self, batch: &Batch) -> BatchResults {
        match batch {
            Batch::Accounts(accounts) => BatchResults::Accounts(self.create_accounts(accounts)),
            Batch::Transfers(transfers) => {
                BatchResults::Transfers(self.create_transfers(transfers))
            }
        }
    }

    /// Expire every pending transfer whose timeout has elapsed at `as_of`
    ///
    /// Releases the pending amounts and marks the transfers expired. Calling
    /// this again for the same instant is a no-op.
    ///
    /// # Returns
    ///
    /// Ids of the transfers expired by this call, earliest deadline first
    pub fn expire_due(&mut self, as_of: Timestamp) -> Vec<Id128> {
        let due = self.transfers.due(as_of);
        if due.is_empty() {
            return due;
        }

        let mut overlay = Overlay::new(&self.accounts, &self.transfers, self.sequence);
        let mut expired = Vec::with_capacity(due.len());
        for id in due {
            match transfer_ledger::expire(&mut overlay, id) {
                Ok(()) => expired.push(id),
                Err(result) => warn!(id, %result, "pending transfer could not be expired"),
            }
        }
        let changes = overlay.into_changes();
        self.commit(changes);

        info!(as_of, expired = expired.len(), "expired pending transfers");
        expired
    }

    /// Look up accounts by id, in request order, omitting unknown ids
    pub fn lookup_accounts(&self, ids: &[Id128]) -> Vec<Account> {
        self.accounts.lookup(ids)
    }

    /// Look up transfers by id, in request order, omitting unknown ids
    pub fn lookup_transfers(&self, ids: &[Id128]) -> Vec<Transfer> {
        self.transfers.lookup(ids)
    }

    pub fn get_account_transfers(&self, filter: &AccountFilter) -> Vec<Transfer> {
        query::get_account_transfers(&self.transfers, filter)
    }

    pub fn get_account_balances(&self, filter: &AccountFilter) -> Vec<AccountBalance> {
        query::get_account_balances(&self.accounts, &self.transfers, filter)
    }

    pub fn query_accounts(&self, filter: &QueryFilter) -> Vec<Account> {
        query::query_accounts(&self.accounts, filter)
    }

    pub fn query_transfers(&self, filter: &QueryFilter) -> Vec<Transfer> {
        query::query_transfers(&self.transfers, filter)
    }

    /// Lifecycle state of a pending transfer
    pub fn pending_status(&self, id: Id128) -> Option<PendingStatus> {
        self.transfers.status(id)
    }

    /// Get final account states for output
    ///
    /// # Returns
    ///
    /// Every account, sorted by id
    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.all_by_id()
    }

    /// Highest timestamp assigned so far
    pub fn high_water_mark(&self) -> Timestamp {
        self.sequence.last()
    }

    /// Current reading of the engine's clock
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Run a batch of events through `create`, one chain at a time
    ///
    /// The clock is read once; every event of the batch is evaluated against
    /// the same `now`.
    fn execute<E, F>(&mut self, events: &[E], create: F) -> Vec<(u32, E::Result)>
    where
        E: LedgerEvent,
        F: Fn(&mut Overlay<'_>, &E, &EventContext) -> Result<(), E::Result>,
    {
        let now = self.clock.now();
        let chains = chain::partition(events);
        let mut results = Vec::new();

        for chain in &chains {
            self.execute_chain(events, chain, now, &create, &mut results);
        }

        info!(
            kind = E::KIND,
            events = events.len(),
            chains = chains.len(),
            rejected = results.len(),
            "batch applied"
        );
        results
    }

    fn execute_chain<E, F>(
        &mut self,
        events: &[E],
        chain: &Chain,
        now: Timestamp,
        create: &F,
        results: &mut Vec<(u32, E::Result)>,
    ) where
        E: LedgerEvent,
        F: Fn(&mut Overlay<'_>, &E, &EventContext) -> Result<(), E::Result>,
    {
        let members = &events[chain.range.clone()];
        let Some(first) = members.first() else {
            return;
        };
        let imported = first.is_imported();

        let mut overlay = Overlay::new(&self.accounts, &self.transfers, self.sequence);
        let mut failure = None;

        for (offset, event) in members.iter().enumerate() {
            if chain.open && offset + 1 == members.len() {
                failure = Some((offset, <E::Result as ResultCode>::LINKED_EVENT_CHAIN_OPEN));
                break;
            }
            if let Err(result) = validator::check_timestamp(event, imported, now) {
                failure = Some((offset, result));
                break;
            }

            let timestamp = if imported {
                event.timestamp()
            } else {
                overlay.next_timestamp(now)
            };
            match create(&mut overlay, event, &EventContext { now, timestamp }) {
                Ok(()) => {
                    trace!(id = event.id(), timestamp, "event staged");
                    overlay.advance_to(timestamp);
                }
                Err(result) => {
                    failure = Some((offset, result));
                    break;
                }
            }
        }

        let Some((failed_at, result)) = failure else {
            let changes = overlay.into_changes();
            self.commit(changes);
            debug!(kind = E::KIND, start = chain.range.start, len = chain.len(), "chain committed");
            return;
        };
        drop(overlay);

        let failed_id = members[failed_at].id();
        if result.is_transient() {
            self.transfers.record_failure(failed_id);
        }
        debug!(
            kind = E::KIND,
            start = chain.range.start,
            len = chain.len(),
            index = chain.range.start + failed_at,
            id = failed_id,
            %result,
            "chain rolled back"
        );

        for offset in 0..members.len() {
            let code = if offset == failed_at {
                result
            } else if chain.open && offset + 1 == members.len() {
                <E::Result as ResultCode>::LINKED_EVENT_CHAIN_OPEN
            } else {
                <E::Result as ResultCode>::LINKED_EVENT_FAILED
            };
            results.push(((chain.range.start + offset) as u32, code));
        }
    }

    fn commit(&mut self, changes: ChangeSet) {
        self.accounts.commit(changes.accounts, changes.history);
        self.transfers.commit(changes.transfers, changes.statuses);
        self.sequence = changes.sequence;
    }
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
