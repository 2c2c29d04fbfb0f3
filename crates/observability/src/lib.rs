//! # Observability
//!
//! Logging and Prometheus export for the bulk relay.
//!
//! - `tracing` subscriber with an `EnvFilter` (RUST_LOG wins over the default level)
//! - JSON, Pretty or Compact output
//! - optional Prometheus listener; without it the metric helpers are no-ops
//!
//! ```ignore
//! let config = ObservabilityConfig::new(LogFormat::Json, "info").with_metrics_port(9000);
//! observability::init_with_config(config)?;
//! observability::record_batch_delivered("http://zinc:4080", 100);
//! ```

pub mod metrics;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    record_batch_delivered, record_batch_failed, record_batch_handed_off,
    record_delivery_latency_ms, record_live_workers, record_queue_depth, record_record_dropped,
    record_record_emitted, DropReason, HandOffTrigger,
};

/// Log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logs
    Json,
    /// Human-readable
    #[default]
    Pretty,
    /// Compact single-line
    Compact,
}

/// What to install at process start
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Filter directive used when RUST_LOG is unset
    pub default_log_level: String,
    /// Prometheus listener port (None = metrics disabled)
    pub metrics_port: Option<u16>,
}

impl ObservabilityConfig {
    /// Logging only; metrics stay disabled
    pub fn new(log_format: LogFormat, default_log_level: impl Into<String>) -> Self {
        Self {
            log_format,
            default_log_level: default_log_level.into(),
            metrics_port: None,
        }
    }

    /// Serve metrics on `port`; 0 keeps them disabled
    pub fn with_metrics_port(mut self, port: u16) -> Self {
        self.metrics_port = (port != 0).then_some(port);
        self
    }

    fn metrics_addr(&self) -> Option<SocketAddr> {
        self.metrics_port
            .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    }
}

/// Install the global subscriber and, if a port is set, the Prometheus recorder
///
/// # Errors
/// Fails if a subscriber or recorder is already installed, or the port cannot be bound.
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(config.log_format))
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(addr) = config.metrics_addr() {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus recorder")?;
        tracing::info!(%addr, "Prometheus metrics endpoint listening");
    }

    tracing::info!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );
    Ok(())
}

fn fmt_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    }
}
