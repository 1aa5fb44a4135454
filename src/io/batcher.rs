//! Grouping of parsed records into engine batches
//!
//! Records arrive one at a time in file order. A batch holds consecutive
//! records of one kind, at most `batch_size` of them. When a batch fills up in
//! the middle of a linked chain, the chain is carried over whole into the next
//! batch; only a chain longer than a full batch is ever split.

use crate::io::csv_format::EventRecord;
use crate::types::{Batch, BATCH_MAX};

/// Incremental batch builder
#[derive(Debug)]
pub struct BatchBuilder {
    batch_size: usize,
    pending: Vec<EventRecord>,

    /// Index in `pending` where the trailing, still-open chain begins
    chain_start: usize,
}

impl BatchBuilder {
    /// # Arguments
    ///
    /// * `batch_size` - Maximum events per batch, clamped to `1..=BATCH_MAX`
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.clamp(1, BATCH_MAX);
        Self {
            batch_size,
            pending: Vec::with_capacity(batch_size),
            chain_start: 0,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Add the next record
    ///
    /// # Returns
    ///
    /// Batches completed by this record, in order (zero, one or two)
    pub fn push(&mut self, record: EventRecord) -> Vec<Batch> {
        let mut ready = Vec::new();

        let kind_changed = self
            .pending
            .first()
            .is_some_and(|first| first.kind() != record.kind());
        if kind_changed {
            ready.extend(self.take_all());
        }

        if self.pending.len() == self.batch_size {
            if self.chain_start > 0 {
                let carried = self.pending.split_off(self.chain_start);
                ready.extend(into_batch(std::mem::replace(&mut self.pending, carried)));
                self.chain_start = 0;
            } else {
                ready.extend(self.take_all());
            }
        }

        self.pending.push(record);
        if !record.is_linked() {
            self.chain_start = self.pending.len();
        }
        ready
    }

    /// Flush whatever is left at end of input
    pub fn finish(&mut self) -> Option<Batch> {
        self.take_all()
    }

    fn take_all(&mut self) -> Option<Batch> {
        self.chain_start = 0;
        into_batch(std::mem::take(&mut self.pending))
    }
}

/// Build a batch from records of one kind (`None` if empty)
fn into_batch(records: Vec<EventRecord>) -> Option<Batch> {
    match records.first()? {
        EventRecord::Account(_) => Some(Batch::Accounts(
            records
                .into_iter()
                .filter_map(|record| match record {
                    EventRecord::Account(account) => Some(account),
                    EventRecord::Transfer(_) => None,
                })
                .collect(),
        )),
        EventRecord::Transfer(_) => Some(Batch::Transfers(
            records
                .into_iter()
                .filter_map(|record| match record {
                    EventRecord::Transfer(transfer) => Some(transfer),
                    EventRecord::Account(_) => None,
                })
                .collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Account, AccountFlags, Transfer, TransferFlags};

    fn account(id: u128) -> EventRecord {
        EventRecord::Account(Account::new(id, 1, 1))
    }

    fn transfer(id: u128, linked: bool) -> EventRecord {
        let flags = if linked {
            TransferFlags::LINKED
        } else {
            TransferFlags::empty()
        };
        EventRecord::Transfer(Transfer::new(id, 1, 2, 1, 1, 1).with_flags(flags))
    }

    fn run(builder: &mut BatchBuilder, records: Vec<EventRecord>) -> Vec<Batch> {
        let mut batches: Vec<Batch> = records
            .into_iter()
            .flat_map(|record| builder.push(record))
            .collect();
        batches.extend(builder.finish());
        batches
    }

    fn ids(batch: &Batch) -> Vec<u128> {
        match batch {
            Batch::Accounts(accounts) => accounts.iter().map(|a| a.id).collect(),
            Batch::Transfers(transfers) => transfers.iter().map(|t| t.id).collect(),
        }
    }

    #[test]
    fn test_fills_batches_up_to_size() {
        let mut builder = BatchBuilder::new(2);
        let batches = run(&mut builder, (1..=5).map(account).collect());
        let sizes: Vec<_> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_kind_change_closes_batch() {
        let mut builder = BatchBuilder::new(10);
        let batches = run(
            &mut builder,
            vec![account(1), account(2), transfer(10, false), account(3)],
        );
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].kind(), "accounts");
        assert_eq!(batches[1].kind(), "transfers");
        assert_eq!(ids(&batches[2]), vec![3]);
    }

    #[test]
    fn test_chain_is_carried_to_next_batch() {
        let mut builder = BatchBuilder::new(3);
        let batches = run(
            &mut builder,
            vec![
                transfer(1, false),
                transfer(2, true),
                transfer(3, true),
                transfer(4, false),
                transfer(5, false),
            ],
        );
        assert_eq!(ids(&batches[0]), vec![1]);
        assert_eq!(ids(&batches[1]), vec![2, 3, 4]);
        assert_eq!(ids(&batches[2]), vec![5]);
    }

    #[test]
    fn test_chain_longer_than_batch_is_split() {
        let mut builder = BatchBuilder::new(2);
        let batches = run(
            &mut builder,
            vec![transfer(1, true), transfer(2, true), transfer(3, false)],
        );
        assert_eq!(ids(&batches[0]), vec![1, 2]);
        assert_eq!(ids(&batches[1]), vec![3]);
    }

    #[test]
    fn test_batch_size_is_clamped() {
        assert_eq!(BatchBuilder::new(0).batch_size(), 1);
        assert_eq!(BatchBuilder::new(BATCH_MAX + 1).batch_size(), BATCH_MAX);
    }

    #[test]
    fn test_open_chain_at_end_of_input_is_flushed() {
        let mut builder = BatchBuilder::new(4);
        let linked = EventRecord::Account(Account::new(1, 1, 1).with_flags(AccountFlags::LINKED));
        let batches = run(&mut builder, vec![linked]);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
    }
}
