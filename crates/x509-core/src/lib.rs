//! # x509-core
//!
//! Shared building blocks of the host X.509 certificate exporter:
//!
//! - **Types**: probe targets, constant labels, parsed certificate data, build info
//! - **Config**: YAML config file merged with `X509_CONFIG_*` environment variables
//! - **Release**: next patch version, image tag aliases and build date for the release pipeline
//! - **Errors**: the [`ExporterError`] shared by every crate in the workspace

pub mod config;
pub mod error;
pub mod release;
pub mod types;

pub use config::{AppConfig, MetricsConfig, DEFAULT_CONFIG_PATH};
pub use error::{ExporterError, Result};
pub use types::*;
