//! HTTP endpoint serving `/metrics` and `/health`.

use std::future::Future;
use std::net::SocketAddr;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use x509_core::{ExporterError, Result};

use crate::metrics::SharedMetrics;
use crate::registry::CONTENT_TYPE;

/// Build the router.
pub fn router(metrics: SharedMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(metrics)
}

/// Bind the metrics listener on all interfaces.
pub async fn bind(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr)
        .await
        .map_err(|e| ExporterError::Server(format!("bind {addr}: {e}")))
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, metrics: SharedMetrics, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| ExporterError::Server(e.to_string()))?;
    info!(%addr, "serving metrics on http://{addr}/metrics");

    axum::serve(listener, router(metrics))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ExporterError::Server(e.to_string()))
}

/// Handler for `/metrics`.
async fn metrics_handler(State(metrics): State<SharedMetrics>) -> impl IntoResponse {
    let body = metrics.read().await.render();
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], body)
}

/// Handler for `/health`.
async fn health_handler() -> &'static str {
    "ok"
}
