//! Labeled gauges and Prometheus text exposition (format 0.0.4).

use std::collections::BTreeMap;
use std::fmt::Write;

use x509_core::{ExporterError, Result};

/// Content type served with [`render`] output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// A gauge family: one value per distinct label value tuple.
#[derive(Debug, Clone)]
pub struct GaugeVec {
    name: String,
    help: String,
    label_names: Vec<String>,
    series: BTreeMap<Vec<String>, f64>,
}

impl GaugeVec {
    /// Create an empty family.
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        label_names: Vec<String>,
    ) -> Result<Self> {
        let name = name.into();
        if !is_valid_name(&name, true) {
            return Err(ExporterError::Metrics(format!("invalid metric name {name:?}")));
        }
        if let Some(bad) = label_names.iter().find(|l| !is_valid_name(l, false)) {
            return Err(ExporterError::Metrics(format!(
                "invalid label name {bad:?} on {name}"
            )));
        }
        Ok(Self {
            name,
            help: help.into(),
            label_names,
            series: BTreeMap::new(),
        })
    }

    /// Label names in exposition order.
    #[must_use]
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Set the series identified by `label_values`.
    pub fn set(&mut self, label_values: Vec<String>, value: f64) -> Result<()> {
        if label_values.len() != self.label_names.len() {
            return Err(ExporterError::Metrics(format!(
                "{} expects {} label values, got {}",
                self.name,
                self.label_names.len(),
                label_values.len()
            )));
        }
        self.series.insert(label_values, value);
        Ok(())
    }

    /// Current value of a series.
    #[must_use]
    pub fn get(&self, label_values: &[&str]) -> Option<f64> {
        self.series
            .iter()
            .find(|(key, _)| key.iter().map(String::as_str).eq(label_values.iter().copied()))
            .map(|(_, value)| *value)
    }

    /// Remove every series whose `label` equals `value`. Returns how many were removed.
    pub fn remove_matching(&mut self, label: &str, value: &str) -> usize {
        let Some(index) = self.label_names.iter().position(|l| l == label) else {
            return 0;
        };
        let before = self.series.len();
        self.series.retain(|key, _| key[index] != value);
        before - self.series.len()
    }

    /// Number of series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether the family has no series.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    fn render_into(&self, out: &mut String) {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "# HELP {} {}", self.name, escape_help(&self.help));
        let _ = writeln!(out, "# TYPE {} gauge", self.name);
        for (values, value) in &self.series {
            out.push_str(&self.name);
            if !values.is_empty() {
                out.push('{');
                for (i, (name, label_value)) in self.label_names.iter().zip(values).enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{name}=\"{}\"", escape_label_value(label_value));
                }
                out.push('}');
            }
            out.push(' ');
            out.push_str(&format_value(*value));
            out.push('\n');
        }
    }
}

/// Render families in the given order.
#[must_use]
pub fn render(families: &[&GaugeVec]) -> String {
    let mut out = String::new();
    for family in families {
        family.render_into(&mut out);
    }
    out
}

fn is_valid_name(name: &str, allow_colon: bool) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let head_ok = first.is_ascii_alphabetic() || first == '_' || (allow_colon && first == ':');
    head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || (allow_colon && c == ':'))
}

fn escape_help(help: &str) -> String {
    help.replace('\\', r"\\").replace('\n', r"\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', "\\\"")
        .replace('\n', r"\n")
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}
