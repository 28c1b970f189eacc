//! # x509-exporter
//!
//! Command-line front end of the host X.509 certificate exporter.
//!
//! ## Commands
//!
//! - **serve**: probe configured hosts on an interval and serve `/metrics`
//! - **probe**: one-off certificate check of ad-hoc hosts
//! - **config**: print the effective configuration
//! - **release**: version and image tag computation for the release pipeline

pub mod cli;
pub mod logging;
pub mod output;
pub mod shutdown;

pub use cli::run;
