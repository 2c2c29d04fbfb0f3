//! WorkerPool - fixed set of delivery workers on a shared dispatch channel

use std::sync::Arc;
use std::time::Duration;

use async_channel::{Receiver, Sender};
use contracts::{BatchDelivery, DispatchMessage};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::error::DispatcherError;
use crate::metrics::PoolMetrics;

/// How often a blocked terminate send re-checks for live workers
const LIVENESS_POLL: Duration = Duration::from_millis(50);

/// Bounded FIFO carrying batches from producers to workers
pub fn dispatch_channel(
    capacity: usize,
) -> (Sender<DispatchMessage>, Receiver<DispatchMessage>) {
    async_channel::bounded(capacity.max(1))
}

/// Handle to the running workers
pub struct WorkerPool {
    concurrency: usize,
    tx: Sender<DispatchMessage>,
    workers: Vec<JoinHandle<()>>,
    metrics: Arc<PoolMetrics>,
}

/// Outcome of a pool shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Termination signals placed on the channel
    pub signals_sent: usize,
    /// Workers joined
    pub workers_joined: usize,
    /// Workers that ended by panicking
    pub workers_panicked: usize,
}

impl WorkerPool {
    /// Spawn `concurrency` workers consuming from `rx`
    ///
    /// `tx` is kept to send termination signals and close the channel
    /// at shutdown.
    pub fn spawn<D>(
        concurrency: usize,
        tx: Sender<DispatchMessage>,
        rx: Receiver<DispatchMessage>,
        delivery: Arc<D>,
        metrics: Arc<PoolMetrics>,
    ) -> Result<Self, DispatcherError>
    where
        D: BatchDelivery + Send + Sync + 'static,
    {
        if concurrency == 0 {
            return Err(DispatcherError::NoWorkers);
        }

        let workers = (0..concurrency)
            .map(|id| {
                let rx = rx.clone();
                let delivery = Arc::clone(&delivery);
                let live = LiveWorker::enter(Arc::clone(&metrics));
                tokio::spawn(async move {
                    worker_loop(id, rx, delivery, live).await;
                })
            })
            .collect();

        info!(concurrency, "Worker pool started");
        observability::record_live_workers(concurrency);

        Ok(Self {
            concurrency,
            tx,
            workers,
            metrics,
        })
    }

    /// Configured worker count
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Workers currently running
    pub fn live_workers(&self) -> usize {
        self.metrics.live_workers()
    }

    /// Items waiting on the dispatch channel
    pub fn queue_len(&self) -> usize {
        self.tx.len()
    }

    /// Shared metrics
    pub fn metrics(&self) -> &Arc<PoolMetrics> {
        &self.metrics
    }

    /// Stop every worker and close the channel
    ///
    /// Sends one `Terminate` per worker behind any queued batches, waits
    /// for all workers to exit (in-flight calls finish), then closes the
    /// channel so later sends fail fast.
    #[instrument(name = "worker_pool_shutdown", skip(self), fields(concurrency = self.concurrency))]
    pub async fn shutdown(self) -> ShutdownReport {
        let mut signals_sent = 0;
        while signals_sent < self.concurrency {
            if self.metrics.live_workers() == 0 {
                break;
            }
            // A full channel whose last workers die would never drain
            match tokio::time::timeout(
                LIVENESS_POLL,
                self.tx.send(DispatchMessage::Terminate),
            )
            .await
            {
                Ok(Ok(())) => signals_sent += 1,
                Ok(Err(_)) => {
                    warn!(
                        sent = signals_sent,
                        expected = self.concurrency,
                        "Dispatch channel closed, terminate signals not delivered"
                    );
                    break;
                }
                Err(_) => continue,
            }
        }

        let mut workers_joined = 0;
        let mut workers_panicked = 0;
        for handle in self.workers {
            match handle.await {
                Ok(()) => workers_joined += 1,
                Err(e) => {
                    workers_joined += 1;
                    workers_panicked += 1;
                    error!(error = ?e, "Worker task panicked");
                }
            }
        }

        self.tx.close();
        observability::record_live_workers(self.metrics.live_workers());
        info!(
            joined = workers_joined,
            panicked = workers_panicked,
            "Worker pool stopped"
        );

        ShutdownReport {
            signals_sent,
            workers_joined,
            workers_panicked,
        }
    }
}

/// Counts a worker as live from spawn until its task ends, panics included
struct LiveWorker {
    metrics: Arc<PoolMetrics>,
}

impl LiveWorker {
    fn enter(metrics: Arc<PoolMetrics>) -> Self {
        metrics.worker_started();
        Self { metrics }
    }
}

impl Drop for LiveWorker {
    fn drop(&mut self) {
        let remaining = self.metrics.worker_stopped();
        debug!(remaining, "Worker exited");
    }
}

/// Worker task: one batch at a time until terminated
#[instrument(name = "worker_loop", skip(rx, delivery, live))]
async fn worker_loop<D: BatchDelivery>(
    id: usize,
    rx: Receiver<DispatchMessage>,
    delivery: Arc<D>,
    live: LiveWorker,
) {
    debug!(worker = id, "Worker started");

    loop {
        match rx.recv().await {
            Ok(DispatchMessage::Data(batch)) => {
                live.metrics.inc_batches_received();
                delivery.deliver(batch).await;
            }
            Ok(DispatchMessage::Terminate) => {
                debug!(worker = id, "Terminate received");
                break;
            }
            Err(_) => {
                debug!(worker = id, "Dispatch channel closed");
                break;
            }
        }
    }

    drop(live);
}
