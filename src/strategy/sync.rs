//! Synchronous processing strategy
//!
//! This module provides a single-threaded implementation of the
//! ProcessingStrategy trait. It coordinates the SyncReader (CSV input), the
//! BatchBuilder (chain-preserving batching) and the LedgerEngine.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Batching to `BatchBuilder`
//! - Event evaluation to `LedgerEngine`
//! - CSV output to `csv_format::write_accounts_csv`
//!
//! # Memory Efficiency
//!
//! Rows are streamed; at most one batch of unsubmitted events is held at a
//! time. The ledger itself grows with the number of accounts and transfers.

use crate::core::LedgerEngine;
use crate::io::csv_format::write_accounts_csv;
use crate::io::{BatchBuilder, SyncReader};
use crate::strategy::{log_rejections, BatchConfig, ProcessingStrategy};
use crate::types::{Batch, LedgerError};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use ledger_engine::strategy::{BatchConfig, ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(BatchConfig::default());
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("events.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncProcessingStrategy {
    config: BatchConfig,
}

impl SyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Replay events from input file and write account states to output
    ///
    /// 1. Streams records from the CSV file with a SyncReader
    /// 2. Groups them into batches with a BatchBuilder
    /// 3. Submits every batch to one LedgerEngine, logging rejections
    /// 4. Writes all accounts to output
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError> {
        let mut engine = LedgerEngine::default();
        let reader = SyncReader::new(input_path)?;
        let mut builder = BatchBuilder::new(self.config.batch_size);

        let mut submitted = 0usize;
        let mut submit = |batch: Batch| {
            let results = engine.submit(&batch);
            log_rejections(&batch, &results);
            submitted += 1;
        };

        for result in reader {
            match result {
                Ok(record) => builder.push(record).into_iter().for_each(&mut submit),
                Err(error) => warn!(%error, "skipping input row"),
            }
        }
        if let Some(batch) = builder.finish() {
            submit(batch);
        }

        info!(batches = submitted, "replay finished");
        write_accounts_csv(&engine.accounts(), output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "kind,id,debit_account_id,credit_account_id,amount,pending_id,user_data_128,user_data_64,user_data_32,timeout,ledger,code,flags,timestamp\n";

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(rows: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(format!("{}{}", HEADER, rows).as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn run(strategy: &SyncProcessingStrategy, rows: &str) -> String {
        let file = create_temp_csv(rows);
        let mut output = Vec::new();
        strategy.process(file.path(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_sync_strategy_posts_transfer() {
        let output = run(
            &SyncProcessingStrategy::default(),
            "account,1,,,,,,,,,700,10,,\n\
             account,2,,,,,,,,,700,10,,\n\
             transfer,100,1,2,250,,,,,,700,1,,\n",
        );
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "id,ledger,code,flags,debits_pending,debits_posted,credits_pending,credits_posted",
                "1,700,10,,0,250,0,0",
                "2,700,10,,0,0,0,250",
            ]
        );
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let strategy = SyncProcessingStrategy::default();
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(matches!(result, Err(LedgerError::FileNotFound { .. })));
        assert!(output.is_empty());
    }

    #[test]
    fn test_sync_strategy_continues_on_malformed_record() {
        let output = run(
            &SyncProcessingStrategy::default(),
            "account,1,,,,,,,,,700,10,,\n\
             account,not-a-number,,,,,,,,,700,10,,\n\
             account,3,,,,,,,,,700,10,,\n",
        );
        assert_eq!(output.lines().count(), 3);
        assert!(output.contains("\n1,700"));
        assert!(output.contains("\n3,700"));
    }

    #[test]
    fn test_sync_strategy_rejected_event_leaves_state_untouched() {
        let output = run(
            &SyncProcessingStrategy::default(),
            "account,1,,,,,,,,,700,10,debits_must_not_exceed_credits,\n\
             account,2,,,,,,,,,700,10,,\n\
             transfer,100,1,2,5,,,,,,700,1,,\n",
        );
        assert!(output.contains("1,700,10,debits_must_not_exceed_credits,0,0,0,0"));
        assert!(output.contains("2,700,10,,0,0,0,0"));
    }

    #[test]
    fn test_sync_strategy_small_batches_keep_chains_whole() {
        // Transfer 101 fails, so its linked partner 100 must roll back even
        // though the batch size is smaller than the input
        let output = run(
            &SyncProcessingStrategy::new(BatchConfig::new(2, 1)),
            "account,1,,,,,,,,,700,10,,\n\
             account,2,,,,,,,,,700,10,,\n\
             transfer,99,1,2,1,,,,,,700,1,,\n\
             transfer,100,1,2,10,,,,,,700,1,linked,\n\
             transfer,101,1,3,10,,,,,,700,1,,\n",
        );
        assert!(output.contains("1,700,10,,0,1,0,0"));
        assert!(output.contains("2,700,10,,0,0,0,1"));
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncProcessingStrategy>();
    }
}
