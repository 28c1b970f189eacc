//! The exporter's metric families.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use x509_core::{BuildInfo, CertificateInfo, CustomLabel, HostTarget, Result, CERTIFICATE_LABELS};

use crate::registry::{render, GaugeVec};

/// Metric name prefix.
pub const NAMESPACE: &str = "x509";

/// Metrics shared between the collector and the HTTP handler.
pub type SharedMetrics = Arc<RwLock<ExporterMetrics>>;

/// All gauges published by the exporter.
#[derive(Debug, Clone)]
pub struct ExporterMetrics {
    cert_not_after: GaugeVec,
    cert_not_before: GaugeVec,
    expired: GaugeVec,
    host_read_errors: GaugeVec,
    read_errors: GaugeVec,
    build_info: GaugeVec,
    custom_values: Vec<String>,
}

impl ExporterMetrics {
    /// Register every family and publish `x509_build_info`.
    pub fn new(custom_labels: &[CustomLabel], build: &BuildInfo) -> Result<Self> {
        let cert_labels: Vec<String> = CERTIFICATE_LABELS
            .iter()
            .map(ToString::to_string)
            .chain(custom_labels.iter().map(CustomLabel::metric_name))
            .collect();

        let mut read_errors = GaugeVec::new(
            metric_name("read_errors"),
            "Indicates if there was an error reading the certificate",
            Vec::new(),
        )?;
        read_errors.set(Vec::new(), 0.0)?;

        let mut build_info = GaugeVec::new(
            metric_name("build_info"),
            "A metric with a constant '1' value labeled with version",
            vec![
                "version".to_string(),
                "ref".to_string(),
                "build_date".to_string(),
                "sha".to_string(),
            ],
        )?;
        build_info.set(
            vec![
                build.version.clone(),
                build.git_ref.clone(),
                build.build_date.clone(),
                build.sha.clone(),
            ],
            1.0,
        )?;

        Ok(Self {
            cert_not_after: GaugeVec::new(
                metric_name("cert_not_after"),
                "The timestamp of when the certificate will expire",
                cert_labels.clone(),
            )?,
            cert_not_before: GaugeVec::new(
                metric_name("cert_not_before"),
                "The timestamp of when the certificate was issued",
                cert_labels.clone(),
            )?,
            expired: GaugeVec::new(
                metric_name("expired"),
                "Indicates if the certificate is currently expired",
                cert_labels,
            )?,
            host_read_errors: GaugeVec::new(
                metric_name("host_read_errors"),
                "Indicates if there was an error reading the certificate",
                vec!["host".to_string()],
            )?,
            read_errors,
            build_info,
            custom_values: custom_labels.iter().map(|l| l.value.clone()).collect(),
        })
    }

    /// Publish a successfully read certificate, replacing any earlier series for the host.
    pub fn record_certificate(
        &mut self,
        target: &HostTarget,
        cert: &CertificateInfo,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let host = target.address();
        for family in [
            &mut self.cert_not_after,
            &mut self.cert_not_before,
            &mut self.expired,
        ] {
            family.remove_matching("host", &host);
        }

        let mut labels = cert.label_values(&host);
        labels.extend(self.custom_values.iter().cloned());

        self.cert_not_after
            .set(labels.clone(), unix_seconds(cert.not_after))?;
        self.cert_not_before
            .set(labels.clone(), unix_seconds(cert.not_before))?;
        self.expired
            .set(labels, if cert.is_expired_at(now) { 1.0 } else { 0.0 })?;
        self.host_read_errors.set(vec![host], 0.0)
    }

    /// Flag a host whose certificate could not be read. Earlier series are kept.
    pub fn record_failure(&mut self, target: &HostTarget) -> Result<()> {
        self.host_read_errors.set(vec![target.address()], 1.0)
    }

    /// Number of hosts that failed in the last round.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_read_errors(&mut self, failed: usize) -> Result<()> {
        self.read_errors.set(Vec::new(), failed as f64)
    }

    /// `x509_cert_not_after`
    #[must_use]
    pub const fn cert_not_after(&self) -> &GaugeVec {
        &self.cert_not_after
    }

    /// `x509_expired`
    #[must_use]
    pub const fn expired(&self) -> &GaugeVec {
        &self.expired
    }

    /// `x509_host_read_errors`
    #[must_use]
    pub const fn host_read_errors(&self) -> &GaugeVec {
        &self.host_read_errors
    }

    /// `x509_read_errors`
    #[must_use]
    pub fn read_errors(&self) -> f64 {
        self.read_errors.get(&[]).unwrap_or_default()
    }

    /// Prometheus text exposition of every family.
    #[must_use]
    pub fn render(&self) -> String {
        render(&[
            &self.cert_not_after,
            &self.cert_not_before,
            &self.expired,
            &self.host_read_errors,
            &self.read_errors,
            &self.build_info,
        ])
    }

    /// Wrap for sharing with the collector and server.
    #[must_use]
    pub fn shared(self) -> SharedMetrics {
        Arc::new(RwLock::new(self))
    }
}

#[allow(clippy::cast_precision_loss)]
fn unix_seconds(t: DateTime<Utc>) -> f64 {
    t.timestamp() as f64
}

fn metric_name(name: &str) -> String {
    format!("{NAMESPACE}_{name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use x509_core::NameAttributes;

    fn cert(serial: &str, not_after_year: i32) -> CertificateInfo {
        CertificateInfo {
            issuer: NameAttributes {
                common_name: Some("Test CA".into()),
                ..Default::default()
            },
            subject: NameAttributes {
                common_name: Some("example.com".into()),
                ..Default::default()
            },
            serial_number: serial.into(),
            not_before: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            not_after: Utc.with_ymd_and_hms(not_after_year, 1, 1, 0, 0, 0).unwrap(),
            fingerprint: String::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_build_info_and_defaults() {
        let metrics = ExporterMetrics::new(&[], &BuildInfo::default()).unwrap();
        let text = metrics.render();
        assert!(text.contains(
            "x509_build_info{version=\"1.0.0-snapshot\",ref=\"unknown\",build_date=\"unknown\",sha=\"unknown\"} 1\n"
        ));
        assert!(text.contains("x509_read_errors 0\n"));
        assert!(text.contains("# TYPE x509_cert_not_after gauge\n"));
    }

    #[test]
    fn test_record_certificate() {
        let mut metrics = ExporterMetrics::new(
            &[CustomLabel::new("data-center", "east")],
            &BuildInfo::default(),
        )
        .unwrap();
        let target = HostTarget::new("example.com", 443);
        metrics.record_certificate(&target, &cert("42", 2030), now()).unwrap();

        let text = metrics.render();
        assert!(text.contains(
            "x509_cert_not_after{host=\"example.com:443\",issuer_C=\"\",issuer_L=\"\",issuer_O=\"\",\
             issuer_OU=\"\",issuer_ST=\"\",issuer_CN=\"Test CA\",serial_number=\"42\",subject_C=\"\",\
             subject_L=\"\",subject_O=\"\",subject_OU=\"\",subject_CN=\"example.com\",subject_ST=\"\",\
             data_center=\"east\"} 1893456000\n"
        ));
        assert!(text.contains("x509_host_read_errors{host=\"example.com:443\"} 0\n"));
        assert_eq!(metrics.expired().len(), 1);
        assert_eq!(metrics.expired().label_names().last().unwrap(), "data_center");
    }

    #[test]
    fn test_expired_flag() {
        let mut metrics = ExporterMetrics::new(&[], &BuildInfo::default()).unwrap();
        let target = HostTarget::new("old.example", 443);
        metrics.record_certificate(&target, &cert("1", 2024), now()).unwrap();
        assert!(metrics.render().contains("serial_number=\"1\""));
        assert!(metrics
            .render()
            .lines()
            .any(|l| l.starts_with("x509_expired{host=\"old.example:443\"") && l.ends_with(" 1")));
    }

    #[test]
    fn test_renewal_replaces_series() {
        let mut metrics = ExporterMetrics::new(&[], &BuildInfo::default()).unwrap();
        let target = HostTarget::new("example.com", 443);
        metrics.record_certificate(&target, &cert("1", 2026), now()).unwrap();
        metrics.record_certificate(&target, &cert("2", 2027), now()).unwrap();

        assert_eq!(metrics.cert_not_after().len(), 1);
        let text = metrics.render();
        assert!(text.contains("serial_number=\"2\""));
        assert!(!text.contains("serial_number=\"1\""));
    }

    #[test]
    fn test_failure_keeps_previous_series() {
        let mut metrics = ExporterMetrics::new(&[], &BuildInfo::default()).unwrap();
        let target = HostTarget::new("example.com", 443);
        metrics.record_certificate(&target, &cert("1", 2026), now()).unwrap();
        metrics.record_failure(&target).unwrap();
        metrics.set_read_errors(1).unwrap();

        assert_eq!(metrics.cert_not_after().len(), 1);
        assert_eq!(metrics.host_read_errors().get(&["example.com:443"]), Some(1.0));
        assert!((metrics.read_errors() - 1.0).abs() < f64::EPSILON);
    }
}
