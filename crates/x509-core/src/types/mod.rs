//! Domain types shared by the probe, metrics and CLI crates.

pub mod build;
pub mod cert;
pub mod target;

pub use build::BuildInfo;
pub use cert::{CertificateInfo, NameAttributes, CERTIFICATE_LABELS};
pub use target::{CustomLabel, HostTarget};
