//! Processing strategy module for ledger replay
//!
//! This module defines the Strategy pattern for complete replay pipelines,
//! encompassing CSV parsing, batching and engine submission. This allows
//! different processing implementations (in-thread, pipelined async) to be
//! selected at runtime. Both feed the same engine the same batches, so they
//! produce identical output for the same input.

use crate::cli::StrategyType;
use crate::types::{Batch, BatchResults, LedgerError, BATCH_MAX};
use std::io::Write;
use std::path::Path;
use tracing::warn;

pub mod r#async;
pub mod sync;

pub use self::r#async::AsyncProcessingStrategy;
pub use sync::SyncProcessingStrategy;

/// Configuration for batching and pipelining
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Maximum events per batch (1..=BATCH_MAX)
    pub batch_size: usize,
    /// Batches that may queue ahead of the writer (async only)
    pub channel_capacity: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: BATCH_MAX,
            channel_capacity: 4,
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Out-of-range values are replaced by the defaults with a warning.
    pub fn new(batch_size: usize, channel_capacity: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 || batch_size > BATCH_MAX {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let channel_capacity = if channel_capacity == 0 {
            warn!(
                channel_capacity,
                default = default.channel_capacity,
                "invalid channel capacity, using default"
            );
            default.channel_capacity
        } else {
            channel_capacity
        };

        Self {
            batch_size,
            channel_capacity,
        }
    }
}

/// Processing strategy trait for complete replay pipelines
///
/// Each strategy reads events from a CSV file, submits them to a ledger
/// engine in batches and writes the final account states to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Replay events from input file and write account states to output
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the input CSV file containing event records
    /// * `output` - Writer receiving the account CSV
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the whole file was replayed
    /// * `Err(LedgerError)` if a fatal error occurred
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened
    /// - The async runtime or its writer task fails
    /// - Output cannot be written
    ///
    /// Malformed rows and rejected events are logged and do not stop the run.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Batching configuration; defaults when `None`
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    let config = config.unwrap_or_default();
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(config)),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(config)),
    }
}

/// Log every rejected event of a batch
pub(crate) fn log_rejections(batch: &Batch, results: &BatchResults) {
    for (index, result) in results.entries() {
        warn!(
            kind = batch.kind(),
            index,
            id = batch.id_at(index as usize).unwrap_or_default(),
            %result,
            "event rejected"
        );
    }
}
