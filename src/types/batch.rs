//! Batches as submitted by collaborators and the sparse results they produce

use super::account::Account;
use super::numeric::Id128;
use super::result::{CreateAccountsResult, CreateTransfersResult};
use super::transfer::Transfer;

/// An ordered batch of events of one kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Batch {
    Accounts(Vec<Account>),
    Transfers(Vec<Transfer>),
}

impl Batch {
    pub fn len(&self) -> usize {
        match self {
            Batch::Accounts(accounts) => accounts.len(),
            Batch::Transfers(transfers) => transfers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Batch::Accounts(_) => "accounts",
            Batch::Transfers(_) => "transfers",
        }
    }

    /// Id of the event at `index`
    pub fn id_at(&self, index: usize) -> Option<Id128> {
        match self {
            Batch::Accounts(accounts) => accounts.get(index).map(|a| a.id),
            Batch::Transfers(transfers) => transfers.get(index).map(|t| t.id),
        }
    }
}

/// Failures of one batch, ascending by index; successes have no entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchResults {
    Accounts(Vec<CreateAccountsResult>),
    Transfers(Vec<CreateTransfersResult>),
}

impl BatchResults {
    /// Number of rejected events
    pub fn failures(&self) -> usize {
        match self {
            BatchResults::Accounts(results) => results.len(),
            BatchResults::Transfers(results) => results.len(),
        }
    }

    /// `(index, code)` pairs rendered for logging
    pub fn entries(&self) -> Vec<(u32, String)> {
        match self {
            BatchResults::Accounts(results) => results
                .iter()
                .map(|r| (r.index, r.result.to_string()))
                .collect(),
            BatchResults::Transfers(results) => results
                .iter()
                .map(|r| (r.index, r.result.to_string()))
                .collect(),
        }
    }
}
