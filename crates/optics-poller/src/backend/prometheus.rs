//! Prometheus text exposition of the last finished cycle.
//!
//! Records are normalized into scalar points while a cycle runs; `done`
//! publishes the page so scrapes never see a half-built cycle.

use std::fmt::Write;
use std::sync::{Arc, Mutex, RwLock};

use optics_core::PollRecord;

use super::Backend;

pub struct PrometheusBackend {
    pending: Mutex<String>,
    page: RwLock<Arc<str>>,
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Sample value as Prometheus spells it.
fn format_value(v: f64) -> String {
    if v == f64::INFINITY {
        "+Inf".into()
    } else if v == f64::NEG_INFINITY {
        "-Inf".into()
    } else if v.is_nan() {
        "NaN".into()
    } else {
        v.to_string()
    }
}

/// Map a dotted key onto the Prometheus metric name charset.
fn metric_name(key: &str) -> String {
    let mut name: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == ':' { c } else { '_' })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

impl Default for PrometheusBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PrometheusBackend {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(String::new()),
            page: RwLock::new(Arc::from("")),
        }
    }

    /// Last published page.
    pub fn render(&self) -> Arc<str> {
        self.page
            .read()
            .map(|p| Arc::clone(&p))
            .unwrap_or_else(|_| Arc::from(""))
    }
}

impl Backend for PrometheusBackend {
    fn begin(&self) {
        if let Ok(mut p) = self.pending.lock() {
            p.clear();
        }
    }

    fn record(&self, record: &PollRecord) {
        let Ok(mut out) = self.pending.lock() else { return };
        let labels = format!(
            "host=\"{}\",source=\"{}\"",
            escape_label(&record.host),
            escape_label(&record.source)
        );

        record.normalize(&mut |ts, key, value| {
            let _ = writeln!(
                out,
                "{}{{{}}} {} {}",
                metric_name(key),
                labels,
                format_value(value),
                ts * 1000
            );
            true
        });
    }

    fn done(&self) {
        let Ok(mut pending) = self.pending.lock() else { return };
        let page: Arc<str> = Arc::from(std::mem::take(&mut *pending));
        if let Ok(mut p) = self.page.write() {
            *p = page;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_sanitized() {
        assert_eq!(metric_name("svc.web-1.latency"), "svc_web_1_latency");
        assert_eq!(metric_name("9lives"), "_9lives");
    }

    #[test]
    fn special_values_use_prometheus_spelling() {
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(2.0), "2");
    }
}
