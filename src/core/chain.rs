//! Partitioning of a batch into linked chains
//!
//! A chain is a maximal run of events in which every event but the last has
//! `linked` set. Chains are computed up front as index ranges, so the
//! processor never has to infer membership while it is evaluating events.

use std::ops::Range;

use super::traits::LedgerEvent;

/// One chain of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// Indices of the chain's events in the batch
    pub range: Range<usize>,

    /// The batch ended while the chain's last event still had `linked` set
    pub open: bool,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Split `events` into chains, in order
///
/// Every index of the batch belongs to exactly one chain. Only the final
/// chain can be open.
pub fn partition<E: LedgerEvent>(events: &[E]) -> Vec<Chain> {
    let mut chains = Vec::new();
    let mut start = 0;

    for (index, event) in events.iter().enumerate() {
        if !event.is_linked() {
            chains.push(Chain {
                range: start..index + 1,
                open: false,
            });
            start = index + 1;
        }
    }

    if start < events.len() {
        chains.push(Chain {
            range: start..events.len(),
            open: true,
        });
    }

    chains
}
