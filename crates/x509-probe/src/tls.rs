//! TLS handshake that captures the peer's leaf certificate.
//!
//! The exporter reports on certificates; it does not trust them. The client
//! config therefore accepts any chain, so an expired or self-signed
//! certificate is still read. Handshake signatures are checked against the
//! presented key.

use std::sync::Arc;
use std::time::Duration;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{ring as ring_provider, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use x509_core::{ExporterError, HostTarget, Result};

/// Verifier that records instead of validating.
#[derive(Debug)]
struct AcceptAnyCertificate {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Build a connector that completes handshakes with any certificate.
pub fn inspecting_connector() -> Result<TlsConnector> {
    let provider = Arc::new(ring_provider::default_provider());
    let config = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()
        .map_err(|e| ExporterError::Config(format!("tls protocol versions: {e}")))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate { provider }))
        .with_no_client_auth();
    Ok(TlsConnector::from(Arc::new(config)))
}

/// Connect to `target` and return the DER bytes of its leaf certificate.
///
/// Connect and handshake together are bounded by `timeout`.
pub async fn fetch_peer_certificate(target: &HostTarget, timeout: Duration) -> Result<Vec<u8>> {
    let connector = inspecting_connector()?;
    fetch_with(&connector, target, timeout).await
}

/// Same as [`fetch_peer_certificate`] with a caller-owned connector.
pub async fn fetch_with(
    connector: &TlsConnector,
    target: &HostTarget,
    timeout: Duration,
) -> Result<Vec<u8>> {
    let address = target.address();
    let server_name = ServerName::try_from(target.name.clone())
        .map_err(|e| ExporterError::InvalidServerName(format!("{}: {e}", target.name)))?;

    let handshake = async {
        let tcp = TcpStream::connect((target.name.as_str(), target.port))
            .await
            .map_err(|source| ExporterError::Connect {
                host: address.clone(),
                source,
            })?;
        debug!(host = %address, "tcp connected");

        let tls = connector
            .connect(server_name, tcp)
            .await
            .map_err(|e| ExporterError::Handshake {
                host: address.clone(),
                reason: e.to_string(),
            })?;

        let (_, session) = tls.get_ref();
        let leaf = session
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| ExporterError::NoPeerCertificate {
                host: address.clone(),
            })?;
        debug!(
            host = %address,
            version = ?session.protocol_version(),
            "tls handshake complete"
        );
        Ok(leaf.as_ref().to_vec())
    };

    tokio::time::timeout(timeout, handshake)
        .await
        .map_err(|_| ExporterError::Timeout {
            host: address.clone(),
            secs: timeout.as_secs(),
        })?
}
