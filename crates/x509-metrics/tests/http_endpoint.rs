//! `/metrics` and `/health` over a real socket.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::oneshot;

use x509_core::{
    BuildInfo, CertificateInfo, CustomLabel, ExporterError, HostTarget, NameAttributes, Result,
};
use x509_metrics::{server, Collector, ExporterMetrics, CONTENT_TYPE};
use x509_probe::Prober;

struct CannedProber;

#[async_trait]
impl Prober for CannedProber {
    async fn probe(&self, target: &HostTarget) -> Result<CertificateInfo> {
        if target.port != 443 {
            return Err(ExporterError::Handshake {
                host: target.address(),
                reason: "wrong port".into(),
            });
        }
        Ok(CertificateInfo {
            issuer: NameAttributes {
                organization: Some("Let's Encrypt".into()),
                common_name: Some("R3".into()),
                country: Some("US".into()),
                ..Default::default()
            },
            subject: NameAttributes {
                common_name: Some(target.name.clone()),
                ..Default::default()
            },
            serial_number: "1234567890".into(),
            not_before: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            not_after: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            fingerprint: String::new(),
        })
    }
}

#[tokio::test]
async fn metrics_endpoint_serves_collected_certificates() {
    let build = BuildInfo {
        version: "1.2.3".into(),
        git_ref: "refs/tags/v1.2.3".into(),
        build_date: "2024-03-09T14:05:07Z".into(),
        sha: "abc123".into(),
    };
    let metrics = ExporterMetrics::new(&[CustomLabel::new("env", "prod")], &build)
        .unwrap()
        .shared();

    let collector = Collector::new(
        Arc::new(CannedProber),
        vec![
            HostTarget::new("example.com", 443),
            HostTarget::new("broken.example", 8443),
        ],
        Arc::clone(&metrics),
        Duration::from_secs(3600),
        2,
    );
    let summary = collector.collect_once().await;
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);

    let listener = server::bind(0).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server_task = tokio::spawn(server::serve(listener, metrics, async move {
        let _ = stop_rx.await;
    }));

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{port}/metrics"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        CONTENT_TYPE
    );
    let body = response.text().await.unwrap();

    assert!(body.contains("# TYPE x509_cert_not_after gauge"));
    assert!(body.contains(
        "x509_cert_not_after{host=\"example.com:443\",issuer_C=\"US\",issuer_L=\"\",issuer_O=\"Let's Encrypt\",\
         issuer_OU=\"\",issuer_ST=\"\",issuer_CN=\"R3\",serial_number=\"1234567890\",subject_C=\"\",\
         subject_L=\"\",subject_O=\"\",subject_OU=\"\",subject_CN=\"example.com\",subject_ST=\"\",\
         env=\"prod\"} 1893456000\n"
    ));
    assert!(body.contains("x509_host_read_errors{host=\"broken.example:8443\"} 1\n"));
    assert!(body.contains("x509_host_read_errors{host=\"example.com:443\"} 0\n"));
    assert!(body.contains("x509_read_errors 1\n"));
    assert!(body.contains(
        "x509_build_info{version=\"1.2.3\",ref=\"refs/tags/v1.2.3\",build_date=\"2024-03-09T14:05:07Z\",sha=\"abc123\"} 1\n"
    ));

    let health = client
        .get(format!("http://127.0.0.1:{port}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), 200);
    assert_eq!(health.text().await.unwrap(), "ok");

    drop(client);
    stop_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server_task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
