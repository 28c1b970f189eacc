//! Exporter configuration: YAML file merged with `X509_CONFIG_*` environment variables.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ExporterError, Result};
use crate::types::{CustomLabel, HostTarget, CERTIFICATE_LABELS};

/// Config file used when neither `--config` nor `X509_CONFIG_FILE` is given.
pub const DEFAULT_CONFIG_PATH: &str = "./config/.configuration.yaml";

const ENV_PORT: &str = "X509_CONFIG_METRICS_PORT";
const ENV_POLLING_INTERVAL: &str = "X509_CONFIG_METRICS_POLLING_INTERVAL";
const ENV_TIMEOUT: &str = "X509_CONFIG_METRICS_TIMEOUT";
const ENV_CONCURRENCY: &str = "X509_CONFIG_METRICS_CONCURRENCY";
const HOST_PATTERN: &str = r"(?i)^X509_CONFIG_HOST_(\d+)$";
const LABEL_PATTERN: &str = r"(?i)^X509_CONFIG_LABEL_([A-Z0-9_-]+)$";
const LABEL_NAME_PATTERN: &str = r"^[a-zA-Z_][a-zA-Z0-9_]*$";

/// Metrics endpoint and polling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsConfig {
    /// HTTP port for `/metrics` (default: 8932).
    pub port: u16,

    /// Seconds between collection rounds (default: 43200).
    pub polling_interval: u64,

    /// Per-host connect + handshake timeout in seconds (default: 10).
    pub timeout: u64,

    /// Maximum hosts probed at once (default: 16).
    pub concurrency: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            polling_interval: default_polling_interval(),
            timeout: default_timeout(),
            concurrency: default_concurrency(),
        }
    }
}

impl MetricsConfig {
    /// Polling interval as a `Duration`.
    #[must_use]
    pub const fn polling_period(&self) -> Duration {
        Duration::from_secs(self.polling_interval)
    }

    /// Probe timeout as a `Duration`.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Effective exporter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Endpoint and polling settings.
    pub metrics: MetricsConfig,

    /// Endpoints to probe, file entries first.
    #[serde(default)]
    pub hosts: Vec<HostTarget>,

    /// Constant labels added to every certificate series.
    #[serde(default)]
    pub labels: Vec<CustomLabel>,
}

/// On-disk shape; every section is optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    metrics: Option<FileMetrics>,
    #[serde(default)]
    hosts: Option<Vec<HostTarget>>,
    #[serde(default)]
    labels: Option<Vec<CustomLabel>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileMetrics {
    port: Option<u16>,
    polling_interval: Option<u64>,
    timeout: Option<u64>,
    concurrency: Option<usize>,
}

impl AppConfig {
    /// Load config from `path` and the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, std::env::vars())
    }

    /// Load config from `path` and an explicit set of environment variables.
    ///
    /// File values win over environment values, which win over defaults.
    /// Hosts and labels from the environment are appended to those in the file.
    pub fn load_with_env(
        path: &Path,
        env: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self> {
        let env: Vec<(String, String)> = env.into_iter().collect();
        let file = read_file(path)?.unwrap_or_default();
        let file_metrics = file.metrics.unwrap_or_default();

        let metrics = MetricsConfig {
            port: pick(file_metrics.port, env_number(&env, ENV_PORT)?, default_port()),
            polling_interval: pick(
                file_metrics.polling_interval,
                env_number(&env, ENV_POLLING_INTERVAL)?,
                default_polling_interval(),
            ),
            timeout: pick(
                file_metrics.timeout,
                env_number(&env, ENV_TIMEOUT)?,
                default_timeout(),
            ),
            concurrency: pick(
                file_metrics.concurrency,
                env_number(&env, ENV_CONCURRENCY)?,
                default_concurrency(),
            ),
        };

        let mut hosts = file.hosts.unwrap_or_default();
        let env_hosts = hosts_from_env(&env)?;
        if !env_hosts.is_empty() {
            info!(count = env_hosts.len(), "appended hosts from environment variables");
            hosts.extend(env_hosts);
        }

        let mut labels = file.labels.unwrap_or_default();
        for label in labels_from_env(&env)? {
            if labels.iter().any(|existing| existing.name == label.name) {
                debug!(label = %label.name, "label already set in config file, ignoring environment value");
                continue;
            }
            info!(label = %label.name, "adding label from environment variables");
            labels.push(label);
        }

        Ok(Self {
            metrics,
            hosts,
            labels,
        })
    }

    /// Check that the configuration can be served.
    pub fn validate(&self) -> Result<()> {
        if self.metrics.port == 0 {
            return Err(ExporterError::Config("metrics port must be non-zero".into()));
        }
        if self.metrics.polling_interval == 0 {
            return Err(ExporterError::Config(
                "polling interval must be at least 1 second".into(),
            ));
        }
        if self.metrics.timeout == 0 {
            return Err(ExporterError::Config(
                "probe timeout must be at least 1 second".into(),
            ));
        }
        if self.metrics.concurrency == 0 {
            return Err(ExporterError::Config("concurrency must be at least 1".into()));
        }

        if let Some(host) = self.hosts.iter().find(|h| h.name.trim().is_empty()) {
            return Err(ExporterError::Config(format!(
                "host entry with port {} has an empty name",
                host.port
            )));
        }

        let valid_name = compile(LABEL_NAME_PATTERN)?;
        let mut seen = HashSet::new();
        for label in &self.labels {
            let name = label.metric_name();
            if !valid_name.is_match(&name) || name.starts_with("__") {
                return Err(ExporterError::Config(format!(
                    "invalid label name {:?}",
                    label.name
                )));
            }
            if CERTIFICATE_LABELS.contains(&name.as_str()) {
                return Err(ExporterError::Config(format!(
                    "label {name:?} collides with a built-in certificate label"
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(ExporterError::Config(format!("duplicate label {name:?}")));
            }
        }

        Ok(())
    }

    /// Custom label names as exposed in metrics.
    #[must_use]
    pub fn label_names(&self) -> Vec<String> {
        self.labels.iter().map(CustomLabel::metric_name).collect()
    }

    /// Serialize the effective configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ExporterError::Config(e.to_string()))
    }
}

/// Read and parse the config file; a missing file yields `None`.
fn read_file(path: &Path) -> Result<Option<FileConfig>> {
    if !path.exists() {
        debug!(path = %path.display(), "config file not found, using environment only");
        return Ok(None);
    }

    info!(path = %path.display(), "loading config file");
    let content = std::fs::read_to_string(path)
        .map_err(|e| ExporterError::io(path.display().to_string(), e))?;
    let content = content.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        return Ok(Some(FileConfig::default()));
    }

    serde_yaml::from_str(content)
        .map(Some)
        .map_err(|e| ExporterError::ConfigParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// `X509_CONFIG_HOST_<N>=name:port`, ordered by N.
fn hosts_from_env(env: &[(String, String)]) -> Result<Vec<HostTarget>> {
    let pattern = compile(HOST_PATTERN)?;
    let mut found: Vec<(u64, &str, &str)> = env
        .iter()
        .filter_map(|(key, value)| {
            let index = pattern.captures(key)?.get(1)?.as_str().parse().ok()?;
            Some((index, key.as_str(), value.as_str()))
        })
        .collect();
    found.sort_unstable();

    let mut hosts = Vec::with_capacity(found.len());
    for (_, key, value) in found {
        debug!(variable = key, "found host in environment");
        match HostTarget::parse(value) {
            Some(host) => hosts.push(host),
            None => warn!(variable = key, value, "ignoring host, expected name:port"),
        }
    }
    Ok(hosts)
}

/// `X509_CONFIG_LABEL_<NAME>=value`, name lowercased, ordered by name.
fn labels_from_env(env: &[(String, String)]) -> Result<Vec<CustomLabel>> {
    let pattern = compile(LABEL_PATTERN)?;
    let mut labels: Vec<CustomLabel> = env
        .iter()
        .filter_map(|(key, value)| {
            let name = pattern.captures(key)?.get(1)?.as_str().to_lowercase();
            debug!(variable = %key, "found label in environment");
            Some(CustomLabel::new(name, value.clone()))
        })
        .collect();
    labels.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(labels)
}

/// Numeric environment value; empty counts as unset.
fn env_number<T>(env: &[(String, String)], key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some((_, raw)) = env.iter().find(|(k, v)| k == key && !v.is_empty()) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e| ExporterError::Config(format!("{key}={raw:?}: {e}")))
}

fn pick<T>(file: Option<T>, env: Option<T>, default: T) -> T {
    file.or(env).unwrap_or(default)
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ExporterError::Config(format!("bad pattern {pattern}: {e}")))
}

// Default value functions.
const fn default_port() -> u16 {
    8932
}

const fn default_polling_interval() -> u64 {
    43_200
}

const fn default_timeout() -> u64 {
    10
}

const fn default_concurrency() -> usize {
    16
}
