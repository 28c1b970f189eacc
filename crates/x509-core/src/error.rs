use thiserror::Error;

/// Result type alias for exporter operations
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Errors that can occur while loading configuration, probing hosts or
/// serving metrics
#[derive(Error, Debug)]
pub enum ExporterError {
    /// Configuration is invalid or inconsistent
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file exists but could not be parsed
    #[error("failed to parse config file {path}: {reason}")]
    ConfigParse {
        /// Path of the offending file
        path: String,
        /// Parser message
        reason: String,
    },

    /// Filesystem I/O failed
    #[error("io error on {path}: {source}")]
    Io {
        /// Path being read or written
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TCP connection to a host failed
    #[error("connection to {host} failed: {source}")]
    Connect {
        /// `name:port` of the target
        host: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Connect + handshake did not finish in time
    #[error("timed out after {secs}s probing {host}")]
    Timeout {
        /// `name:port` of the target
        host: String,
        /// Configured timeout in seconds
        secs: u64,
    },

    /// TLS handshake failed
    #[error("tls handshake with {host} failed: {reason}")]
    Handshake {
        /// `name:port` of the target
        host: String,
        /// Handshake failure message
        reason: String,
    },

    /// The server completed the handshake without presenting a certificate
    #[error("{host} presented no certificate")]
    NoPeerCertificate {
        /// `name:port` of the target
        host: String,
    },

    /// Host name cannot be used as a TLS server name
    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    /// X.509 DER could not be parsed
    #[error("certificate parse error: {0}")]
    CertParse(String),

    /// PEM document could not be decoded
    #[error("pem decode error: {0}")]
    PemDecode(String),

    /// Version string is not valid semver
    #[error("invalid version {input:?}: {reason}")]
    InvalidVersion {
        /// The rejected input
        input: String,
        /// Parser message
        reason: String,
    },

    /// Metric registration or update was rejected
    #[error("metrics error: {0}")]
    Metrics(String),

    /// HTTP server failed to bind or serve
    #[error("server error: {0}")]
    Server(String),
}

impl ExporterError {
    /// Build an `Io` error for a path.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the error came from talking to a remote host
    #[must_use]
    pub const fn is_probe_error(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. }
                | Self::Timeout { .. }
                | Self::Handshake { .. }
                | Self::NoPeerCertificate { .. }
                | Self::InvalidServerName(_)
                | Self::CertParse(_)
        )
    }
}
