//! BulkOutput - batching engine facade
//!
//! Wires the accumulator, flush trigger and worker pool together and owns
//! their lifecycle:
//!
//! ```text
//! emit(record) -> encode -> Accumulator --(size | timer)--> dispatch channel
//!     -> WorkerPool -> BatchDelivery -> endpoint /api/_bulk
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{
    BatchDelivery, BulkSender, ContractError, DeliveryObserver, OutputConfig, Record,
    RecordEncoder,
};
use dispatcher::{
    dispatch_channel, EndpointSelector, FireAndForget, HttpBulkSender, LogObserver,
    MetricsSnapshot, PoolMetrics, ShutdownReport, WorkerPool,
};
use ingestion::JsonRecordEncoder;
use observability::{DropReason, HandOffTrigger};
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, instrument, warn};

use crate::accumulator::Accumulator;
use crate::error::Result;
use crate::trigger::FlushTrigger;

/// Builder for creating a BulkOutput
pub struct BulkOutputBuilder {
    config: OutputConfig,
    encoder: Option<Arc<dyn RecordEncoder>>,
    observer: Option<Arc<dyn DeliveryObserver>>,
    flush_interval: Option<Duration>,
}

impl BulkOutputBuilder {
    /// Start from a configuration
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            encoder: None,
            observer: None,
            flush_interval: None,
        }
    }

    /// Replace the default `JsonRecordEncoder`
    pub fn encoder<E: RecordEncoder + 'static>(mut self, encoder: E) -> Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    /// Replace the default `LogObserver`
    ///
    /// Only used by `start` and `start_with_sender`.
    pub fn observer(mut self, observer: Arc<dyn DeliveryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Override `batch_flush_interval` with a finer duration
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    /// Start with HTTP delivery to the configured addresses
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> Result<BulkOutput> {
        config_loader::ConfigLoader::validate(&self.config)?;
        let sender =
            HttpBulkSender::new(self.config.credentials(), self.config.request_timeout())?;
        self.launch_with_sender(sender)
    }

    /// Start with fire-and-forget delivery over a custom sender
    pub fn start_with_sender<S>(self, sender: S) -> Result<BulkOutput>
    where
        S: BulkSender + Sync + 'static,
    {
        config_loader::ConfigLoader::validate(&self.config)?;
        self.launch_with_sender(sender)
    }

    /// Start with a custom delivery policy
    pub fn start_with_delivery<D>(self, delivery: Arc<D>) -> Result<BulkOutput>
    where
        D: BatchDelivery + Send + Sync + 'static,
    {
        config_loader::ConfigLoader::validate(&self.config)?;
        self.launch(delivery, Arc::new(PoolMetrics::new()))
    }

    /// Config already validated
    fn launch_with_sender<S>(self, sender: S) -> Result<BulkOutput>
    where
        S: BulkSender + Sync + 'static,
    {
        let metrics = Arc::new(PoolMetrics::new());
        let selector = EndpointSelector::new(self.config.addresses.clone())?;
        let observer: Arc<dyn DeliveryObserver> = match self.observer.clone() {
            Some(observer) => observer,
            None => Arc::new(LogObserver::new(Arc::clone(&metrics))),
        };
        let delivery = Arc::new(FireAndForget::new(sender, selector, observer));
        self.launch(delivery, metrics)
    }

    #[instrument(name = "bulk_output_launch", skip_all, fields(concurrency = self.config.concurrency))]
    fn launch<D>(self, delivery: Arc<D>, metrics: Arc<PoolMetrics>) -> Result<BulkOutput>
    where
        D: BatchDelivery + Send + Sync + 'static,
    {
        let config = self.config;
        let encoder: Arc<dyn RecordEncoder> = match self.encoder {
            Some(encoder) => encoder,
            None => Arc::new(JsonRecordEncoder::from_pattern(&config.index)?),
        };
        let flush_interval = self.flush_interval.unwrap_or_else(|| config.flush_interval());
        if flush_interval.is_zero() {
            return Err(ContractError::config_validation(
                "batch_flush_interval",
                "batch_flush_interval must be > 0",
            )
            .into());
        }

        let (tx, rx) = dispatch_channel(config.queue_capacity());
        let accumulator = Arc::new(Accumulator::new(config.batch_size, tx.clone())?);
        let pool = WorkerPool::spawn(config.concurrency, tx, rx, delivery, Arc::clone(&metrics))?;
        let trigger = FlushTrigger::spawn(Arc::clone(&accumulator), flush_interval);

        info!(
            addresses = ?config.addresses,
            index = %config.index,
            batch_size = config.batch_size,
            flush_interval_ms = flush_interval.as_millis() as u64,
            concurrency = config.concurrency,
            queue_capacity = config.queue_capacity(),
            "Bulk output started"
        );

        Ok(BulkOutput {
            encoder,
            accumulator,
            accepting: RwLock::new(true),
            running: Mutex::new(Some(Running { trigger, pool })),
            metrics,
            counters: Counters::default(),
        })
    }
}

struct Running {
    trigger: FlushTrigger,
    pool: WorkerPool,
}

#[derive(Default)]
struct Counters {
    emitted: AtomicU64,
    encode_failed: AtomicU64,
    rejected: AtomicU64,
}

/// Running batching engine
pub struct BulkOutput {
    encoder: Arc<dyn RecordEncoder>,
    accumulator: Arc<Accumulator>,
    /// Read-held by every emit, write-held once by shutdown
    accepting: RwLock<bool>,
    running: Mutex<Option<Running>>,
    metrics: Arc<PoolMetrics>,
    counters: Counters,
}

impl BulkOutput {
    /// Create a builder
    pub fn builder(config: OutputConfig) -> BulkOutputBuilder {
        BulkOutputBuilder::new(config)
    }

    /// Start with default encoder and HTTP delivery
    pub fn connect(config: OutputConfig) -> Result<Self> {
        BulkOutputBuilder::new(config).start()
    }

    /// Ingest one record
    ///
    /// Never fails: records that cannot be encoded, or that arrive after
    /// shutdown has begun, are logged and dropped.
    pub async fn emit(&self, record: &Record) {
        let accepting = self.accepting.read().await;
        if !*accepting {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            observability::record_record_dropped(DropReason::Shutdown, 1);
            warn!("Bulk output is shut down, record dropped");
            return;
        }

        let entry = match self.encoder.encode(record) {
            Ok(entry) => entry,
            Err(e) => {
                self.counters.encode_failed.fetch_add(1, Ordering::Relaxed);
                observability::record_record_dropped(DropReason::Encode, 1);
                error!(error = %e, "Encode failed, record dropped");
                return;
            }
        };

        self.accumulator.append(entry).await;
        self.counters.emitted.fetch_add(1, Ordering::Relaxed);
        observability::record_record_emitted();
    }

    /// Drain and stop the engine
    ///
    /// Waits for in-flight emits, stops the flush trigger, hands off the
    /// open batch, then terminates every worker and closes the channel.
    /// Returns `None` if the engine was already shut down.
    #[instrument(name = "bulk_output_shutdown", skip(self))]
    pub async fn shutdown(&self) -> Option<ShutdownReport> {
        {
            let mut accepting = self.accepting.write().await;
            if !*accepting {
                return None;
            }
            *accepting = false;
        }
        info!("Bulk output is shutting down...");

        let running = self.running.lock().await.take()?;
        running.trigger.stop().await;

        let flushed = self.accumulator.flush(HandOffTrigger::Shutdown).await;
        let report = running.pool.shutdown().await;

        info!(
            final_flush = flushed,
            workers = report.workers_joined,
            "Bulk output shutdown completed"
        );
        Some(report)
    }

    /// True until shutdown begins
    pub async fn is_running(&self) -> bool {
        *self.accepting.read().await
    }

    /// Current counters
    pub async fn stats(&self) -> EngineStats {
        EngineStats {
            emitted: self.counters.emitted.load(Ordering::Relaxed),
            encode_failed: self.counters.encode_failed.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            pending: self.accumulator.pending().await,
            pool: self.metrics.snapshot(),
        }
    }
}

/// Snapshot of engine counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Records accepted into a batch
    pub emitted: u64,
    /// Records dropped because encoding failed
    pub encode_failed: u64,
    /// Records dropped because shutdown had begun
    pub rejected: u64,
    /// Entries in the open batch
    pub pending: usize,
    /// Worker pool counters
    pub pool: MetricsSnapshot,
}
