//! `x509-exporter serve` - Run the exporter.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{info, warn};
use x509_core::BuildInfo;
use x509_metrics::{server, Collector, ExporterMetrics};
use x509_probe::TlsProber;

use super::Context;
use crate::cli::args::ServeArgs;
use crate::shutdown;

/// How long background tasks get to finish after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn execute(ctx: Context, args: ServeArgs) -> Result<()> {
    let mut config = ctx.load_config()?;
    if let Some(port) = args.port {
        config.metrics.port = port;
    }
    config.validate()?;

    let build = BuildInfo::from_env();
    info!(
        version = %build.version,
        git_ref = %build.git_ref,
        hosts = config.hosts.len(),
        labels = ?config.label_names(),
        "starting x509 certificate exporter"
    );
    if config.hosts.is_empty() {
        warn!("no hosts configured, only build metadata will be exported");
    }

    let metrics = ExporterMetrics::new(&config.labels, &build)?.shared();
    let prober = TlsProber::new(config.metrics.probe_timeout())?;
    let collector = Arc::new(Collector::new(
        Arc::new(prober),
        config.hosts.clone(),
        Arc::clone(&metrics),
        config.metrics.polling_period(),
        config.metrics.concurrency,
    ));

    if args.once {
        collector.collect_once().await;
        print!("{}", metrics.read().await.render());
        return Ok(());
    }

    let listener = server::bind(config.metrics.port).await?;
    let (stop_tx, stop_rx) = watch::channel(false);

    let collector_task = {
        let collector = Arc::clone(&collector);
        let stop_rx = stop_rx.clone();
        tokio::spawn(async move { collector.run(stop_rx).await })
    };

    let mut server_stop = stop_rx;
    let mut server_task = tokio::spawn(server::serve(listener, metrics, async move {
        let _ = server_stop.changed().await;
    }));

    let served = tokio::select! {
        () = shutdown::signal() => None,
        result = &mut server_task => Some(result),
    };

    let _ = stop_tx.send(true);

    let result = match served {
        // The server stopped on its own, which only happens on error.
        Some(joined) => joined?.map_err(anyhow::Error::from),
        None => match tokio::time::timeout(DRAIN_TIMEOUT, server_task).await {
            Ok(joined) => joined?.map_err(anyhow::Error::from),
            Err(_) => {
                warn!("metrics server did not stop within {:?}", DRAIN_TIMEOUT);
                Ok(())
            }
        },
    };

    if tokio::time::timeout(DRAIN_TIMEOUT, collector_task).await.is_err() {
        warn!("collector did not stop within {:?}", DRAIN_TIMEOUT);
    }

    info!("exporter stopped");
    result
}
