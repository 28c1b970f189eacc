//! Periodic certificate collection.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{watch, Semaphore};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use x509_core::{CertificateInfo, ExporterError, HostTarget, Result};
use x509_probe::Prober;

use crate::metrics::SharedMetrics;

/// Outcome of one collection round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    /// Hosts whose certificate was read
    pub succeeded: usize,
    /// Hosts that could not be read
    pub failed: usize,
}

/// Probes every configured host and updates the shared metrics.
pub struct Collector {
    prober: Arc<dyn Prober>,
    hosts: Vec<HostTarget>,
    metrics: SharedMetrics,
    interval: Duration,
    concurrency: usize,
}

impl Collector {
    /// Create a collector. `concurrency` is clamped to at least 1.
    pub fn new(
        prober: Arc<dyn Prober>,
        hosts: Vec<HostTarget>,
        metrics: SharedMetrics,
        interval: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            prober,
            hosts,
            metrics,
            interval,
            concurrency: concurrency.max(1),
        }
    }

    /// Probe every host once and publish the results.
    pub async fn collect_once(&self) -> CollectionSummary {
        let start = Instant::now();
        let results = self.probe_all().await;

        let mut summary = CollectionSummary::default();
        let now = Utc::now();
        let mut metrics = self.metrics.write().await;
        for (target, result) in &results {
            let recorded = match result {
                Ok(cert) => metrics.record_certificate(target, cert, now).map_err(|e| {
                    error!(host = %target, error = %e, "failed to record certificate");
                }),
                Err(e) => {
                    warn!(host = %target, error = %e, "failed to read certificate");
                    Err(())
                }
            };
            if recorded.is_ok() {
                summary.succeeded += 1;
                continue;
            }
            summary.failed += 1;
            if let Err(e) = metrics.record_failure(target) {
                error!(host = %target, error = %e, "failed to record host error");
            }
        }
        if let Err(e) = metrics.set_read_errors(summary.failed) {
            error!(error = %e, "failed to record read error count");
        }
        drop(metrics);

        info!(
            hosts = self.hosts.len(),
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed_ms = start.elapsed().as_millis(),
            "collection round complete"
        );
        summary
    }

    /// Collect now and then every interval until `shutdown` flips or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    info!("begin metrics fetch");
                    self.collect_once().await;
                }
                _ = shutdown.changed() => {
                    info!("collector stopping");
                    break;
                }
            }
        }
    }

    /// Probe all hosts with bounded concurrency, keeping host order.
    async fn probe_all(&self) -> Vec<(HostTarget, Result<CertificateInfo>)> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(self.hosts.len());

        for target in &self.hosts {
            let sem = Arc::clone(&semaphore);
            let prober = Arc::clone(&self.prober);
            let task_target = target.clone();

            let handle = tokio::spawn(async move {
                let _permit = sem
                    .acquire_owned()
                    .await
                    .map_err(|e| ExporterError::Metrics(format!("probe slot unavailable: {e}")))?;
                prober.probe(&task_target).await
            });
            handles.push((target.clone(), handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (target, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(ExporterError::Metrics(format!("probe task failed: {e}"))),
            };
            results.push((target, result));
        }
        results
    }
}
