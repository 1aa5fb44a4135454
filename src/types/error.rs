//! Error types for the ledger engine
//!
//! Business rejections are not errors: they are reported per event as
//! [`CreateAccountResult`](super::CreateAccountResult) /
//! [`CreateTransferResult`](super::CreateTransferResult) data. This module covers
//! everything else, failures that stop a batch or a whole run.
//!
//! # Error Categories
//!
//! - **Batch Errors**: A batch rejected as a whole before any event is evaluated
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **CSV Errors**: Malformed CSV, or a record that does not describe an event
//! - **Runtime Errors**: The async pipeline lost its worker or channel

use thiserror::Error;

/// Process-level error type for the ledger engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// The batch was rejected without evaluating any of its events
    ///
    /// Raised at the processing boundary, e.g. for batches above `BATCH_MAX`.
    #[error("Invalid batch: {reason}")]
    InvalidBatch {
        /// Why the batch was rejected
        reason: String,
    },

    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed record is skipped
    /// and processing continues with the next record.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// A well-formed CSV record that does not describe a valid event
    ///
    /// This is a recoverable error - the record is skipped.
    #[error("Invalid record{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    InvalidRecord {
        /// Line number of the record (if available)
        line: Option<u64>,
        /// What is wrong with the record
        message: String,
    },

    /// The async runtime, a worker task or a channel failed
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the failure
        message: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

impl From<csv_async::Error> for LedgerError {
    fn from(error: csv_async::Error) -> Self {
        LedgerError::Parse {
            line: None,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidBatch error
    pub fn invalid_batch(reason: impl Into<String>) -> Self {
        LedgerError::InvalidBatch {
            reason: reason.into(),
        }
    }

    /// Create an InvalidRecord error
    pub fn invalid_record(line: Option<u64>, message: impl Into<String>) -> Self {
        LedgerError::InvalidRecord {
            line,
            message: message.into(),
        }
    }

    /// Create a Runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        LedgerError::Runtime {
            message: message.into(),
        }
    }

    /// Map a failure to open `path`, keeping "not found" distinct
    pub fn open_failed(path: &std::path::Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => LedgerError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => LedgerError::from(error),
        }
    }

    /// Attach a line number to a record-level error that lacks one
    pub fn at_line(self, line: u64) -> Self {
        match self {
            LedgerError::InvalidRecord { line: None, message } => LedgerError::InvalidRecord {
                line: Some(line),
                message,
            },
            LedgerError::Parse { line: None, message } => LedgerError::Parse {
                line: Some(line),
                message,
            },
            other => other,
        }
    }
}
