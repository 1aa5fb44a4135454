//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over event records from a CSV source.
//! Supports chunked reading for the async pipeline.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - futures' `AsyncRead`, so tokio files are plugged in through
//!   tokio-util's compat layer
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → chunks of EventRecords → BatchBuilder
//!                  ↓
//!           csv_format module
//!           (CsvRecord, convert_csv_record)
//! ```

use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

use crate::io::csv_format::{convert_csv_record, CsvRecord, EventRecord};
use crate::types::LedgerError;

/// Asynchronous CSV reader
///
/// Reads records in chunks with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: u64,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    ///
    /// # Arguments
    ///
    /// * `reader` - Async reader providing CSV data
    ///
    /// # Returns
    ///
    /// A new AsyncReader instance
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);
        Self {
            csv_reader,
            line_num: 1,
        }
    }

    /// Read a chunk of event records
    ///
    /// Reads rows until `batch_size` records have been converted or the
    /// input ends. Rows that cannot be parsed or converted are logged with
    /// their line number and skipped.
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Maximum number of records to return
    ///
    /// # Returns
    ///
    /// The converted records, in file order. An empty vector means the end
    /// of the input was reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<EventRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            let Some(result) = records.next().await else {
                break;
            };
            self.line_num += 1;

            let line = self.line_num;
            let converted = result
                .map_err(|e| LedgerError::from(e).at_line(line))
                .and_then(|csv_record| {
                    convert_csv_record(csv_record)
                        .map_err(|message| LedgerError::invalid_record(Some(line), message))
                });
            match converted {
                Ok(record) => batch.push(record),
                Err(error) => warn!(%error, "skipping input row"),
            }
        }
        batch
    }
}
