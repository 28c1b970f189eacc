//! `x509-exporter probe` - One-off certificate check.

use std::time::Duration;

use anyhow::{bail, Result};
use chrono::Utc;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use x509_core::{CertificateInfo, HostTarget};
use x509_probe::{Prober, TlsProber};

use super::Context;
use crate::cli::args::ProbeArgs;
use crate::output::OutputFormat;

const DEFAULT_PORT: u16 = 443;

#[derive(Tabled)]
struct ProbeRow {
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Subject CN")]
    subject: String,
    #[tabled(rename = "Issuer CN")]
    issuer: String,
    #[tabled(rename = "Not After")]
    not_after: String,
    #[tabled(rename = "Days Left")]
    days_left: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Machine-readable result for one host.
#[derive(Serialize)]
struct ProbeReport {
    host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    certificate: Option<CertificateInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn execute(ctx: Context, args: ProbeArgs) -> Result<()> {
    let targets = args
        .targets
        .iter()
        .map(|raw| parse_target(raw.as_str()))
        .collect::<Result<Vec<_>>>()?;

    let prober = TlsProber::new(Duration::from_secs(args.timeout))?;
    let mut reports = Vec::with_capacity(targets.len());
    for target in &targets {
        let report = match prober.probe(target).await {
            Ok(cert) => ProbeReport {
                host: target.address(),
                certificate: Some(cert),
                error: None,
            },
            Err(e) => ProbeReport {
                host: target.address(),
                certificate: None,
                error: Some(e.to_string()),
            },
        };
        reports.push(report);
    }

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&reports)?),
        OutputFormat::Pretty => print_pretty(&reports, &ctx),
    }

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        bail!("{failed} of {} hosts could not be read", reports.len());
    }
    Ok(())
}

/// Accept `host` or `host:port`.
fn parse_target(raw: &str) -> Result<HostTarget> {
    if raw.contains(':') {
        return HostTarget::parse(raw)
            .ok_or_else(|| anyhow::anyhow!("invalid target {raw:?}, expected host or host:port"));
    }
    if raw.trim().is_empty() {
        bail!("empty target");
    }
    Ok(HostTarget::new(raw.trim(), DEFAULT_PORT))
}

fn print_pretty(reports: &[ProbeReport], ctx: &Context) {
    let now = Utc::now();
    let rows: Vec<ProbeRow> = reports
        .iter()
        .map(|report| match &report.certificate {
            Some(cert) => {
                let days = cert.seconds_until_expiry(now) / 86_400;
                let status = if cert.is_expired_at(now) {
                    "EXPIRED".red().bold().to_string()
                } else if days < 30 {
                    "expiring".yellow().to_string()
                } else {
                    "ok".green().to_string()
                };
                ProbeRow {
                    host: report.host.clone(),
                    subject: cert.subject.common_name.clone().unwrap_or_default(),
                    issuer: cert.issuer.common_name.clone().unwrap_or_default(),
                    not_after: cert.not_after.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                    days_left: days.to_string(),
                    status,
                }
            }
            None => ProbeRow {
                host: report.host.clone(),
                subject: String::new(),
                issuer: String::new(),
                not_after: String::new(),
                days_left: String::new(),
                status: "error".red().to_string(),
            },
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));

    for report in reports {
        if let Some(err) = &report.error {
            eprintln!("  {} {}: {}", "✗".red(), report.host.bold(), err);
        }
    }
    if ctx.verbose {
        for report in reports {
            if let Some(cert) = &report.certificate {
                println!(
                    "  {} serial={} sha256={}",
                    report.host.bold(),
                    cert.serial_number,
                    cert.fingerprint.dimmed()
                );
            }
        }
    }
}
