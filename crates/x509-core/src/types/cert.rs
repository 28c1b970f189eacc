//! Parsed leaf certificate information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Built-in labels of every certificate series, in exposition order.
pub const CERTIFICATE_LABELS: [&str; 14] = [
    "host",
    "issuer_C",
    "issuer_L",
    "issuer_O",
    "issuer_OU",
    "issuer_ST",
    "issuer_CN",
    "serial_number",
    "subject_C",
    "subject_L",
    "subject_O",
    "subject_OU",
    "subject_CN",
    "subject_ST",
];

/// Selected attributes of an X.509 distinguished name.
///
/// Each field holds the first value found for its OID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameAttributes {
    /// C
    pub country: Option<String>,
    /// L
    pub locality: Option<String>,
    /// O
    pub organization: Option<String>,
    /// OU
    pub organizational_unit: Option<String>,
    /// ST
    pub state_or_province: Option<String>,
    /// CN
    pub common_name: Option<String>,
}

/// Information about the certificate a host presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateInfo {
    /// Issuer name attributes
    pub issuer: NameAttributes,
    /// Subject name attributes
    pub subject: NameAttributes,
    /// Serial number (decimal)
    pub serial_number: String,
    /// Not valid before
    pub not_before: DateTime<Utc>,
    /// Not valid after
    pub not_after: DateTime<Utc>,
    /// SHA-256 fingerprint of DER bytes (hex)
    pub fingerprint: String,
}

impl CertificateInfo {
    /// Whether the certificate had expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.not_after < now
    }

    /// Seconds from `now` until expiry; negative once expired.
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.not_after - now).num_seconds()
    }

    /// Values for [`CERTIFICATE_LABELS`] in the same order.
    ///
    /// Missing name attributes become empty strings.
    #[must_use]
    pub fn label_values(&self, host: &str) -> Vec<String> {
        let attr = |value: &Option<String>| value.clone().unwrap_or_default();
        vec![
            host.to_string(),
            attr(&self.issuer.country),
            attr(&self.issuer.locality),
            attr(&self.issuer.organization),
            attr(&self.issuer.organizational_unit),
            attr(&self.issuer.state_or_province),
            attr(&self.issuer.common_name),
            self.serial_number.clone(),
            attr(&self.subject.country),
            attr(&self.subject.locality),
            attr(&self.subject.organization),
            attr(&self.subject.organizational_unit),
            attr(&self.subject.common_name),
            attr(&self.subject.state_or_province),
        ]
    }
}
