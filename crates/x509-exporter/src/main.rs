//! x509-exporter - Prometheus exporter for TLS host certificates

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    x509_exporter::run().await
}
