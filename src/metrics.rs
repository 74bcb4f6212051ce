//! HTTP instrumentation registry.
//!
//! Label sets are flattened into sorted key vectors so every series renders in a
//! stable order. Durations are accumulated in microseconds and rendered in
//! seconds.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn render_labels(key: &LabelKey) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn micros_to_seconds(micros: u64) -> f64 {
    micros as f64 / 1_000_000.0
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", name, help);
        let _ = writeln!(out, "# TYPE {} counter", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, render_labels(r.key()), val);
        }
    }
}

/// Upper bounds in microseconds: 0.1s, 0.5s, 1s.
const BUCKETS_MICROS: [u64; 3] = [100_000, 500_000, 1_000_000];

#[derive(Default)]
struct AtomicHistogram {
    count: AtomicU64,
    sum_micros: AtomicU64,
    buckets: [AtomicU64; 3],
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self
            .map
            .entry(label_key(labels))
            .or_insert_with(AtomicHistogram::default);
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum_micros.fetch_add(micros, Ordering::Relaxed);
        for (i, &le) in BUCKETS_MICROS.iter().enumerate() {
            if micros <= le {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", name, help);
        let _ = writeln!(out, "# TYPE {} histogram", name);
        for r in self.map.iter() {
            let hist = r.value();
            let labels = render_labels(r.key());
            let prefix = if labels.is_empty() {
                String::new()
            } else {
                format!("{},", labels)
            };

            for (i, &le) in BUCKETS_MICROS.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(
                    out,
                    "{}_bucket{{{}le=\"{:?}\"}} {}",
                    name,
                    prefix,
                    micros_to_seconds(le),
                    count
                );
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);
            let sum = micros_to_seconds(hist.sum_micros.load(Ordering::Relaxed));
            let _ = writeln!(out, "{}_sum{{{}}} {}", name, labels, sum);
            let _ = writeln!(out, "{}_count{{{}}} {}", name, labels, count);
        }
    }
}

#[derive(Default)]
struct AtomicSummary {
    count: AtomicU64,
    sum: AtomicU64,
}

/// Sum and count only, no quantiles.
#[derive(Default)]
pub struct SummaryVec {
    map: DashMap<LabelKey, AtomicSummary>,
}

impl SummaryVec {
    pub fn observe(&self, labels: &[(&str, &str)], value: u64) {
        let summary = self
            .map
            .entry(label_key(labels))
            .or_insert_with(AtomicSummary::default);
        summary.count.fetch_add(1, Ordering::Relaxed);
        summary.sum.fetch_add(value, Ordering::Relaxed);
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", name, help);
        let _ = writeln!(out, "# TYPE {} summary", name);
        for r in self.map.iter() {
            let labels = render_labels(r.key());
            let summary = r.value();
            let _ = writeln!(
                out,
                "{}_sum{{{}}} {}",
                name,
                labels,
                summary.sum.load(Ordering::Relaxed)
            );
            let _ = writeln!(
                out,
                "{}_count{{{}}} {}",
                name,
                labels,
                summary.count.load(Ordering::Relaxed)
            );
        }
    }
}

#[derive(Default)]
pub struct HttpMetrics {
    pub requests: CounterVec,
    pub request_duration: HistogramVec,
    pub response_size: SummaryVec,
}

impl HttpMetrics {
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.requests.render(
            "http_requests_total",
            "Total number of requests by method, status and handler.",
            &mut out,
        );
        self.request_duration.render(
            "http_request_duration_seconds",
            "Latency with only few buckets by handler.",
            &mut out,
        );
        self.response_size.render(
            "http_response_size_bytes",
            "Content length of outgoing responses by handler.",
            &mut out,
        );
        out
    }
}

/// Collapses a status code into its class, e.g. `404` to `4xx`.
pub fn status_group(status: u16) -> String {
    format!("{}xx", status / 100)
}
