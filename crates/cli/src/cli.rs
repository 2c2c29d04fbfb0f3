//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Bulk Relay - batch newline-delimited JSON records into bulk ingestion calls
#[derive(Parser, Debug)]
#[command(
    name = "bulk-relay",
    author,
    version,
    about = "Batching relay for bulk document ingestion",
    long_about = "Reads newline-delimited JSON records, groups them into batches by size \n\
                  or flush interval, and posts each batch to <address>/api/_bulk \n\
                  with a fixed pool of concurrent workers."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BULK_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "BULK_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Relay records from a file or stdin
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "config.toml", env = "BULK_RELAY_CONFIG")]
    pub config: PathBuf,

    /// NDJSON input file (reads stdin when omitted)
    #[arg(short, long, env = "BULK_RELAY_INPUT")]
    pub input: Option<PathBuf>,

    /// Override remote addresses from configuration (repeatable)
    #[arg(long = "address", env = "BULK_RELAY_ADDRESSES", value_delimiter = ',')]
    pub addresses: Vec<String>,

    /// Override index pattern from configuration
    #[arg(long, env = "BULK_RELAY_INDEX")]
    pub index: Option<String>,

    /// Validate configuration and exit without relaying
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "BULK_RELAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::parse_from([
            "bulk-relay",
            "-v",
            "run",
            "--config",
            "relay.toml",
            "--address",
            "http://a:4080,http://b:4080",
            "--index",
            "logs",
        ]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("relay.toml"));
                assert_eq!(args.addresses, vec!["http://a:4080", "http://b:4080"]);
                assert_eq!(args.index.as_deref(), Some("logs"));
                assert!(args.input.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["bulk-relay", "-q", "-v", "validate"]);
        assert!(result.is_err());
    }
}
