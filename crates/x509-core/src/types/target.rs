//! Probe targets and constant labels.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A TLS endpoint whose certificate is exported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostTarget {
    /// DNS name or IP address, also used as SNI
    pub name: String,
    /// TCP port
    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,
}

impl HostTarget {
    /// Create a new target.
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
        }
    }

    /// `name:port`, the value of the `host` label.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.name, self.port)
    }

    /// Parse `name:port`.
    ///
    /// Returns `None` unless the input splits on `:` into exactly two parts
    /// with a non-empty name and a valid port.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.split(':');
        let (name, port) = (parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let port = port.trim().parse().ok()?;
        Some(Self::new(name, port))
    }
}

impl fmt::Display for HostTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.port)
    }
}

/// Ports may be written as `443` or `"443"` in YAML.
#[derive(Deserialize)]
#[serde(untagged)]
enum PortRepr {
    Number(u16),
    Text(String),
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    match PortRepr::deserialize(deserializer)? {
        PortRepr::Number(port) => Ok(port),
        PortRepr::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port: {text:?}"))),
    }
}

/// A constant label attached to every certificate series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomLabel {
    /// Label name as configured
    pub name: String,
    /// Label value
    pub value: String,
}

impl CustomLabel {
    /// Create a new label.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Name as exposed in metrics (`-` is not a legal label character).
    #[must_use]
    pub fn metric_name(&self) -> String {
        self.name.replace('-', "_")
    }
}
