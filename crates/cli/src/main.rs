//! # Bulk Relay CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading and validation
//! - NDJSON relay into the batching engine
//! - Graceful shutdown handling

mod cli;
mod commands;
mod error;
mod relay;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_relay, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Bulk relay starting");

    // Execute command
    let result = match &cli.command {
        Commands::Run(args) => run_relay(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging, plus the metrics endpoint when `run` asks for one
fn init_logging(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let metrics_port = match &cli.command {
        Commands::Run(args) if !args.dry_run => args.metrics_port,
        _ => 0,
    };

    observability::init_with_config(
        observability::ObservabilityConfig::new(cli.log_format.into(), default_log_level)
            .with_metrics_port(metrics_port),
    )
}
