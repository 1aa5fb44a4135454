//! Single-writer batch submission for async callers
//!
//! This module provides the `BatchProcessor` struct, a cloneable front end to
//! one writer task that applies batches to an [`AsyncLedgerEngine`] strictly
//! in the order they were submitted.
//!
//! # Design
//!
//! Callers push a batch onto a bounded mpsc channel together with a oneshot
//! reply sender, then await the reply. The writer task owns the receiving end
//! and submits each batch to the engine before taking the next one, so batch
//! order is channel order no matter how many callers there are. The channel
//! bound applies back-pressure to producers.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor (Clone) ──mpsc──> writer task ──> AsyncLedgerEngine
//!        ^                              │
//!        └────────── oneshot ───────────┘
//! ```
//!
//! # Shutdown
//!
//! The writer task exits once every `BatchProcessor` clone has been dropped
//! and the channel is drained. Await the returned `JoinHandle` to wait for it.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use super::AsyncLedgerEngine;
use crate::types::{Batch, BatchResults, LedgerError, BATCH_MAX};

/// A batch waiting for the writer, and where to send its results
#[derive(Debug)]
struct Request {
    batch: Batch,
    reply: oneshot::Sender<BatchResults>,
}

/// Cloneable handle for submitting batches to the writer task
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    sender: mpsc::Sender<Request>,
}

impl BatchProcessor {
    /// Start the writer task on the current tokio runtime
    ///
    /// # Arguments
    ///
    /// * `engine` - The engine every batch is applied to
    /// * `capacity` - Number of batches that may queue before `submit` waits
    ///   (at least 1)
    ///
    /// # Returns
    ///
    /// The submission handle and the writer task's `JoinHandle`
    pub fn spawn(engine: AsyncLedgerEngine, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(writer_loop(engine, receiver));
        (Self { sender }, task)
    }

    /// Submit one batch and wait for its results
    ///
    /// # Arguments
    ///
    /// * `batch` - Accounts or transfers, at most `BATCH_MAX` events
    ///
    /// # Returns
    ///
    /// * `Ok(BatchResults)` with one entry per rejected event
    /// * `Err(LedgerError::InvalidBatch)` if the batch is too large; nothing
    ///   in it was evaluated
    /// * `Err(LedgerError::Runtime)` if the writer task is gone
    pub async fn submit(&self, batch: Batch) -> Result<BatchResults, LedgerError> {
        if batch.len() > BATCH_MAX {
            return Err(LedgerError::invalid_batch(format!(
                "{} batch of {} events exceeds the maximum of {}",
                batch.kind(),
                batch.len(),
                BATCH_MAX
            )));
        }

        let (reply, response) = oneshot::channel();
        self.sender
            .send(Request { batch, reply })
            .await
            .map_err(|_| LedgerError::runtime("batch processor has shut down"))?;
        response
            .await
            .map_err(|_| LedgerError::runtime("batch processor dropped the batch"))
    }
}

async fn writer_loop(engine: AsyncLedgerEngine, mut receiver: mpsc::Receiver<Request>) {
    while let Some(Request { batch, reply }) = receiver.recv().await {
        let results = engine.submit(&batch).await;
        if reply.send(results).is_err() {
            debug!(kind = batch.kind(), "submitter went away before its results");
        }
    }
    debug!("batch processor stopped");
}
