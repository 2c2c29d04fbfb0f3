//! `run` command implementation.

use std::time::Instant;

use anyhow::{Context, Result};
use batch_engine::BulkOutput;
use contracts::OutputConfig;
use tracing::{error, info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::relay::{self, RunSummary};

/// Execute the `run` command
pub async fn run_relay(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let config = load_config(args)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        addresses = ?config.addresses,
        index = %config.index,
        batch_size = config.batch_size,
        concurrency = config.concurrency,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let input = relay::open_input(args.input.as_deref()).await?;
    let output = BulkOutput::connect(config).map_err(CliError::from)?;

    info!("Relaying records...");
    let started = Instant::now();
    let pumped = relay::pump(input.reader, &output, &input.name, setup_shutdown_signal()).await;

    // Drain and stop even when reading failed
    let report = output.shutdown().await;
    let stats = output.stats().await;
    let pumped = pumped?;

    if pumped.interrupted {
        warn!("Received shutdown signal, input not fully consumed");
    }

    let summary = RunSummary::new(input.name, pumped, stats, report, started.elapsed());
    info!(
        emitted = summary.emitted,
        invalid_lines = summary.invalid_lines,
        batches_delivered = summary.batches_delivered,
        batches_failed = summary.batches_failed,
        duration_secs = summary.duration_secs,
        rate = format!("{:.2}", summary.records_per_sec()),
        "Relay completed"
    );
    summary.print_summary();

    info!("Bulk relay finished");
    Ok(())
}

/// Load the configuration file and apply CLI overrides
fn load_config(args: &RunArgs) -> crate::error::Result<OutputConfig> {
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()));
    }

    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)?;

    let mut overridden = false;
    if !args.addresses.is_empty() {
        info!(addresses = ?args.addresses, "Overriding addresses from CLI");
        config.addresses = args.addresses.clone();
        overridden = true;
    }
    if let Some(ref index) = args.index {
        info!(index = %index, "Overriding index from CLI");
        config.index = index.clone();
        overridden = true;
    }
    if overridden {
        config_loader::ConfigLoader::validate(&config)?;
    }

    Ok(config)
}

/// Setup Ctrl+C and SIGTERM signal handlers
///
/// A handler that cannot be installed is logged and never fires.
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &OutputConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Addresses ({}):", config.addresses.len());
    for address in &config.addresses {
        println!("  - {}", address);
    }
    println!("\nIndex: {}", config.index);
    println!("User: {}", config.username);
    println!("\nBatching:");
    println!("  Batch size: {}", config.batch_size);
    println!("  Flush interval: {}s", config.batch_flush_interval);
    println!("  Workers: {}", config.concurrency);
    println!("  Queue capacity: {}", config.queue_capacity());
    println!("  Request timeout: {}s", config.request_timeout);
    println!();
}
