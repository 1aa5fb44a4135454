//! Asynchronous pipelined processing strategy
//!
//! This module provides a tokio-based implementation of the
//! ProcessingStrategy trait. Reading and evaluation overlap: a reader task
//! parses and batches the next rows while the writer task applies the current
//! batch.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, channel_capacity)
//!     ├── reader task: AsyncReader → BatchBuilder ──mpsc──┐
//!     │                                                   ↓
//!     └── submitter: BatchProcessor ──> writer task ──> AsyncLedgerEngine
//! ```
//!
//! # Ordering
//!
//! There is exactly one producer and one writer, connected by FIFO
//! channels, so batches reach the engine in file order and the result is
//! identical to the synchronous strategy.

use crate::core::r#async::{AsyncLedgerEngine, BatchProcessor};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_accounts_csv;
use crate::io::BatchBuilder;
use crate::strategy::{log_rejections, BatchConfig, ProcessingStrategy};
use crate::types::{Batch, LedgerError};
use std::io::Write;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Asynchronous pipelined processing strategy
///
/// # Configuration
///
/// The strategy accepts a BatchConfig with:
/// - `batch_size`: Events per batch (default: 8190)
/// - `channel_capacity`: Batches buffered between the stages (default: 4)
#[derive(Debug, Clone, Default)]
pub struct AsyncProcessingStrategy {
    /// Batch processing configuration
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy with the specified configuration
    ///
    /// # Arguments
    ///
    /// * `config` - BatchConfig with batch_size and channel_capacity
    ///
    /// # Returns
    ///
    /// A new `AsyncProcessingStrategy`
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Replay events from input file and write account states to output
    ///
    /// 1. Creates a multi-threaded tokio runtime
    /// 2. Starts the BatchProcessor writer task over a fresh AsyncLedgerEngine
    /// 3. Spawns a reader task that streams rows into batches
    /// 4. Submits each batch as it arrives, logging rejections
    /// 5. Waits for both tasks, then writes all accounts to output
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| LedgerError::runtime(format!("failed to create tokio runtime: {}", e)))?;

        runtime.block_on(async {
            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| LedgerError::open_failed(input_path, e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);

            let engine = AsyncLedgerEngine::default();
            let (processor, writer) =
                BatchProcessor::spawn(engine.clone(), self.config.channel_capacity);

            let (sender, mut receiver) = mpsc::channel::<Batch>(self.config.channel_capacity);
            let batch_size = self.config.batch_size;
            let reader_task = tokio::spawn(async move {
                let mut reader = AsyncReader::new(compat_file);
                let mut builder = BatchBuilder::new(batch_size);
                loop {
                    let records = reader.read_batch(batch_size).await;
                    if records.is_empty() {
                        break;
                    }
                    for record in records {
                        for batch in builder.push(record) {
                            if sender.send(batch).await.is_err() {
                                debug!("submitter went away, reader stopping");
                                return;
                            }
                        }
                    }
                }
                if let Some(batch) = builder.finish() {
                    let _ = sender.send(batch).await;
                }
            });

            let mut submitted = 0usize;
            while let Some(batch) = receiver.recv().await {
                let results = processor.submit(batch.clone()).await?;
                log_rejections(&batch, &results);
                submitted += 1;
            }

            reader_task
                .await
                .map_err(|e| LedgerError::runtime(format!("reader task failed: {}", e)))?;
            drop(processor);
            writer
                .await
                .map_err(|e| LedgerError::runtime(format!("writer task failed: {}", e)))?;

            info!(batches = submitted, "replay finished");
            write_accounts_csv(&engine.accounts().await, output)
        })
    }
}
