//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::OutputConfig;
use dispatcher::bulk_url;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    addresses: Vec<EndpointInfo>,
    auth: AuthInfo,
    index: String,
    batching: BatchingInfo,
}

#[derive(Serialize)]
struct EndpointInfo {
    address: String,
    bulk_url: String,
}

#[derive(Serialize)]
struct AuthInfo {
    username: String,
    password: &'static str,
}

#[derive(Serialize)]
struct BatchingInfo {
    batch_size: usize,
    batch_flush_interval_secs: u64,
    concurrency: usize,
    queue_capacity: usize,
    request_timeout_secs: u64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn build_config_info(config: &OutputConfig) -> ConfigInfo {
    ConfigInfo {
        addresses: config
            .addresses
            .iter()
            .map(|address| EndpointInfo {
                address: address.clone(),
                bulk_url: bulk_url(address),
            })
            .collect(),
        auth: AuthInfo {
            username: config.username.clone(),
            password: "***",
        },
        index: config.index.clone(),
        batching: BatchingInfo {
            batch_size: config.batch_size,
            batch_flush_interval_secs: config.batch_flush_interval,
            concurrency: config.concurrency,
            queue_capacity: config.queue_capacity(),
            request_timeout_secs: config.request_timeout,
        },
    }
}

fn print_config_info(config: &OutputConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Bulk Relay Configuration                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🌐 Addresses ({})", config.addresses.len());
    for (i, address) in config.addresses.iter().enumerate() {
        let is_last = i == config.addresses.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        println!("   {} {}", prefix, bulk_url(address));
    }

    println!("\n🔑 Auth");
    println!("   ├─ User: {}", config.username);
    println!("   └─ Password: ***");

    println!("\n🗂  Index: {}", config.index);

    println!("\n⚙️  Batching");
    println!("   ├─ Batch size: {}", config.batch_size);
    println!("   ├─ Flush interval: {}s", config.batch_flush_interval);
    println!("   ├─ Workers: {}", config.concurrency);
    println!("   ├─ Queue capacity: {}", config.queue_capacity());
    println!("   └─ Request timeout: {}s", config.request_timeout);

    println!();
}
