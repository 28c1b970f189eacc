//! Command-line argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use x509_core::DEFAULT_CONFIG_PATH;

use crate::output::OutputFormat;

/// Prometheus exporter for the X.509 certificates presented by TLS hosts.
///
/// Without a subcommand the exporter runs `serve`.
#[derive(Parser, Debug)]
#[command(name = "x509-exporter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "X509_CONFIG_FILE", default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe configured hosts on an interval and serve /metrics
    Serve(ServeArgs),

    /// Read the certificate of one or more hosts once
    Probe(ProbeArgs),

    /// Print the effective configuration as YAML
    Config,

    /// Release versioning helpers for the build pipeline
    Release(ReleaseArgs),
}

// ============================================================================
// Serve command
// ============================================================================

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Listen port (overrides metrics.port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Run a single collection round, print the metrics and exit
    #[arg(long)]
    pub once: bool,
}

// ============================================================================
// Probe command
// ============================================================================

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Hosts to probe, as host or host:port (port defaults to 443)
    #[arg(required = true)]
    pub targets: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Connect and handshake timeout in seconds
    #[arg(short, long, default_value = "10")]
    pub timeout: u64,
}

// ============================================================================
// Release command
// ============================================================================

#[derive(Args, Debug)]
pub struct ReleaseArgs {
    #[command(subcommand)]
    pub command: ReleaseCommands,
}

#[derive(Subcommand, Debug)]
pub enum ReleaseCommands {
    /// Print the version following the latest release tag
    NextVersion {
        /// Latest release tag (e.g. v1.2.3); omit for the first release
        #[arg(short, long)]
        latest: Option<String>,

        /// Print the git tag (v1.2.4) instead of the bare version
        #[arg(long)]
        tag: bool,
    },

    /// Print every image reference for a version, one per line
    Tags(ImageArgs),

    /// Print KEY=value build variables for the pipeline
    BuildInfo(ImageArgs),
}

#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Version being released
    #[arg(id = "release_version", value_name = "VERSION")]
    pub version: String,

    /// Image name
    #[arg(short, long, env = "PROJECT_NAME")]
    pub project: String,

    /// Registry prefix (repeatable), e.g. docker.io/acme
    #[arg(short, long = "registry", required = true)]
    pub registries: Vec<String>,
}
