//! Prometheus text exposition format.
//!
//! Renders gathered metric families into the text format (version 0.0.4)
//! for scraping by a Prometheus server or compatible agent.

use crate::registry::MetricFamily;

/// Content type of [`render_prometheus`] output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render metric families into Prometheus text format.
///
/// Every metric is a GAUGE with a single label. Families without samples
/// are left out entirely.
pub fn render_prometheus(families: &[MetricFamily]) -> String {
    let mut out = String::new();

    for family in families.iter().filter(|f| !f.samples.is_empty()) {
        let d = family.descriptor;
        out.push_str(&format!("# HELP {} {}\n", d.name, escape_help(d.help)));
        out.push_str(&format!("# TYPE {} gauge\n", d.name));
        for (label_value, value) in &family.samples {
            out.push_str(&format!(
                "{}{{{}=\"{}\"}} {}\n",
                d.name,
                d.label,
                escape_label_value(label_value),
                format_value(*value)
            ));
        }
    }

    out
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
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
