//! # x509-probe
//!
//! Reads the leaf certificate a TLS endpoint presents and turns it into a
//! [`CertificateInfo`](x509_core::CertificateInfo).
//!
//! ```text
//! HostTarget -> TCP connect -> TLS handshake (no chain validation)
//!            -> leaf DER -> x509-parser -> CertificateInfo
//! ```

pub mod parse;
pub mod prober;
pub mod tls;

pub use parse::{parse_certificate, parse_pem, sha256_hex};
pub use prober::{Prober, TlsProber};
pub use tls::{fetch_peer_certificate, inspecting_connector};
