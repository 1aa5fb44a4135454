use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay ledger events from CSV through the double-entry engine
#[derive(Parser, Debug)]
#[command(name = "ledger-engine")]
#[command(about = "Replay account and transfer events through a double-entry ledger", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing account and transfer records
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for in-thread or 'async' for the pipelined writer"
    )]
    pub strategy: StrategyType,

    /// Number of events per batch
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Maximum events per batch (default and maximum: 8190)"
    )]
    pub batch_size: Option<usize>,

    /// Depth of the async pipeline
    #[arg(
        long = "channel-capacity",
        value_name = "COUNT",
        help = "Batches that may queue ahead of the writer (async mode only, default: 4)"
    )]
    pub channel_capacity: Option<usize>,

    /// Log output format
    #[arg(
        long = "log-format",
        value_name = "FORMAT",
        default_value = "text",
        help = "Log format on stderr: 'text' or 'json' (level via RUST_LOG)"
    )]
    pub log_format: LogFormat,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// Available log formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values fall back to the defaults; invalid ones are replaced by
    /// the defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        let default = BatchConfig::default();
        BatchConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.channel_capacity.unwrap_or(default.channel_capacity),
        )
    }
}
