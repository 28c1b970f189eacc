//! Command implementations.

pub mod config;
pub mod probe;
pub mod release;
pub mod serve;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use x509_core::AppConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Configuration file path
    pub config_path: PathBuf,

    /// Verbose output
    pub verbose: bool,
}

impl Context {
    /// Load the merged file and environment configuration.
    pub fn load_config(&self) -> Result<AppConfig> {
        AppConfig::load(&self.config_path)
            .with_context(|| format!("loading configuration from {}", self.config_path.display()))
    }
}
