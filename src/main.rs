//! Ledger Engine CLI
//!
//! Command-line interface for replaying ledger events from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- events.csv > accounts.csv
//! cargo run -- --strategy sync events.csv > accounts.csv
//! cargo run -- --strategy async --batch-size 1000 --channel-capacity 8 events.csv > accounts.csv
//! RUST_LOG=debug cargo run -- --log-format json events.csv > accounts.csv
//! ```
//!
//! The program reads account and transfer records from the input CSV file,
//! submits them to the ledger in batches using the selected processing
//! strategy, and writes the final account states to stdout. Rejected events
//! and skipped rows are logged to stderr.
//!
//! # Processing Strategies
//!
//! - **sync**: Reading and evaluation on the calling thread
//! - **async**: Reading pipelined with a single writer task (default)
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use ledger_engine::{cli, logging, strategy};
use std::process;
use tracing::error;

fn main() {
    let args = cli::parse_args();
    logging::init(args.log_format);

    let strategy = strategy::create_strategy(args.strategy, Some(args.to_batch_config()));

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        error!(error = %e, "replay failed");
        process::exit(1);
    }
}
