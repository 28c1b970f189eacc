//! The seam between collection and the network.

use async_trait::async_trait;
use std::time::Duration;
use tokio_rustls::TlsConnector;
use tracing::debug;

use x509_core::{CertificateInfo, HostTarget, Result};

use crate::parse::parse_certificate;
use crate::tls::{fetch_with, inspecting_connector};

/// Reads the certificate a host presents.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Fetch and parse the leaf certificate of `target`.
    async fn probe(&self, target: &HostTarget) -> Result<CertificateInfo>;
}

/// Prober that performs a real TLS handshake.
#[derive(Clone)]
pub struct TlsProber {
    connector: TlsConnector,
    timeout: Duration,
}

impl TlsProber {
    /// Create a prober with the given per-host timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            connector: inspecting_connector()?,
            timeout,
        })
    }
}

#[async_trait]
impl Prober for TlsProber {
    async fn probe(&self, target: &HostTarget) -> Result<CertificateInfo> {
        let der = fetch_with(&self.connector, target, self.timeout).await?;
        let info = parse_certificate(&der)?;
        debug!(
            host = %target,
            subject = info.subject.common_name.as_deref().unwrap_or(""),
            not_after = %info.not_after,
            "read certificate"
        );
        Ok(info)
    }
}
