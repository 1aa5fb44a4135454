//! Shared ledger engine for async callers
//!
//! This module provides the `AsyncLedgerEngine` struct, a cloneable handle to
//! a single [`LedgerEngine`] guarded by a tokio `RwLock`.
//!
//! # Design
//!
//! The decision engine is strictly single-writer: a batch must observe every
//! earlier batch and nothing that commits concurrently with it. Writes
//! (account and transfer batches, expiry) hold the write lock for the whole
//! batch; lookups and queries share the read lock, so they always see a state
//! between two batches and never a partially applied chain.
//!
//! # Architecture
//!
//! ```text
//! AsyncLedgerEngine (Clone)
//!     └── Arc<RwLock<LedgerEngine>>
//!             ├── AccountLedger
//!             └── TransferLedger
//! ```

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::core::LedgerEngine;
use crate::types::{
    Account, AccountBalance, AccountFilter, Batch, BatchResults, CreateAccountsResult,
    CreateTransfersResult, Id128, PendingStatus, QueryFilter, Timestamp, Transfer,
};

/// Cloneable, thread-safe handle to one ledger
#[derive(Debug, Clone)]
pub struct AsyncLedgerEngine {
    inner: Arc<RwLock<LedgerEngine>>,
}

impl AsyncLedgerEngine {
    /// Wrap an engine so it can be shared across async tasks
    ///
    /// # Arguments
    ///
    /// * `engine` - The engine to take ownership of
    ///
    /// # Returns
    ///
    /// A handle that can be cloned into any number of tasks
    pub fn new(engine: LedgerEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    pub async fn create_accounts(&self, accounts: &[Account]) -> Vec<CreateAccountsResult> {
        self.inner.write().await.create_accounts(accounts)
    }

    pub async fn create_transfers(&self, transfers: &[Transfer]) -> Vec<CreateTransfersResult> {
        self.inner.write().await.create_transfers(transfers)
    }

    pub async fn submit(&self, batch: &Batch) -> BatchResults {
        self.inner.write().await.submit(batch)
    }

    /// Expire due pending transfers using the engine's own clock
    pub async fn expire_due_now(&self) -> Vec<Id128> {
        let mut engine = self.inner.write().await;
        let now = engine.now();
        engine.expire_due(now)
    }

    pub async fn expire_due(&self, as_of: Timestamp) -> Vec<Id128> {
        self.inner.write().await.expire_due(as_of)
    }

    pub async fn lookup_accounts(&self, ids: &[Id128]) -> Vec<Account> {
        self.inner.read().await.lookup_accounts(ids)
    }

    pub async fn lookup_transfers(&self, ids: &[Id128]) -> Vec<Transfer> {
        self.inner.read().await.lookup_transfers(ids)
    }

    pub async fn get_account_transfers(&self, filter: &AccountFilter) -> Vec<Transfer> {
        self.inner.read().await.get_account_transfers(filter)
    }

    pub async fn get_account_balances(&self, filter: &AccountFilter) -> Vec<AccountBalance> {
        self.inner.read().await.get_account_balances(filter)
    }

    pub async fn query_accounts(&self, filter: &QueryFilter) -> Vec<Account> {
        self.inner.read().await.query_accounts(filter)
    }

    pub async fn query_transfers(&self, filter: &QueryFilter) -> Vec<Transfer> {
        self.inner.read().await.query_transfers(filter)
    }

    pub async fn pending_status(&self, id: Id128) -> Option<PendingStatus> {
        self.inner.read().await.pending_status(id)
    }

    /// Every account, sorted by id
    pub async fn accounts(&self) -> Vec<Account> {
        self.inner.read().await.accounts()
    }

    pub async fn high_water_mark(&self) -> Timestamp {
        self.inner.read().await.high_water_mark()
    }
}

impl Default for AsyncLedgerEngine {
    fn default() -> Self {
        Self::new(LedgerEngine::default())
    }
}
