//! Asynchronous access to the ledger engine
//!
//! This module provides the concurrency boundary around the single-threaded
//! decision engine using tokio primitives.
//!
//! # Architecture
//!
//! - **AsyncLedgerEngine**: Cloneable handle; writes take a write lock for the
//!   whole batch, reads share a read lock
//! - **BatchProcessor**: One writer task fed by a bounded channel, applying
//!   batches in submission order
//! - **ExpirySweeper**: Periodic expiry of pending transfers
//!
//! # Thread Safety
//!
//! There is exactly one logical writer at any time. Readers never observe a
//! partially applied batch.

pub mod batch_processor;
pub mod engine;
pub mod expiry;

pub use batch_processor::BatchProcessor;
pub use engine::AsyncLedgerEngine;
pub use expiry::{spawn_expiry_sweeper, ExpirySweeper};
