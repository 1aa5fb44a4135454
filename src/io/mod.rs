//! I/O module
//!
//! Handles CSV import of ledger events and CSV export of account state.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, output serialization)
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `async_reader` - Asynchronous CSV reader with chunked reading interface
//! - `batcher` - Grouping of records into chain-preserving engine batches

pub mod async_reader;
pub mod batcher;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use batcher::BatchBuilder;
pub use csv_format::{convert_csv_record, write_accounts_csv, CsvRecord, EventRecord};
pub use sync_reader::SyncReader;
