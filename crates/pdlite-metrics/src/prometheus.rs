//! Prometheus text exposition format.
//!
//! Renders every counter vector of a [`Metrics`] registry for scraping by a
//! Prometheus server or compatible agent.

use crate::Metrics;

/// Render all counters into Prometheus text format.
pub fn render_prometheus(metrics: &Metrics) -> String {
    let mut out = String::new();

    for vec in metrics.vectors() {
        out.push_str(&format!("# HELP {} {}\n", vec.name(), vec.help()));
        out.push_str(&format!("# TYPE {} counter\n", vec.name()));
        for (values, count) in vec.snapshot() {
            let labels: Vec<String> = vec
                .label_names()
                .iter()
                .zip(values.iter())
                .map(|(name, value)| format!("{name}=\"{}\"", escape_label(value)))
                .collect();
            out.push_str(&format!("{}{{{}}} {}\n", vec.name(), labels.join(","), count));
        }
    }

    out
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
