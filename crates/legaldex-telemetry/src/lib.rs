// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structured telemetry and metrics collection for pipeline and batch runs.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::info;

// ---------------------------------------------------------------------------
// StageMetrics
// ---------------------------------------------------------------------------

/// Metrics captured for a single pipeline stage execution (§4.5).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StageMetrics {
    /// Stage name (`"validate"`, `"extract"`, `"classify"`, `"store"`, `"index"`).
    pub stage: String,
    /// Document the stage ran against, if one had been assigned.
    pub document_id: Option<String>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Whether the stage succeeded.
    pub success: bool,
    /// Error kind, as a string, when `success` is `false`.
    pub error_kind: Option<String>,
    /// Number of retry attempts made before this outcome.
    pub retries: u32,
}

// ---------------------------------------------------------------------------
// RunMetricsSummary
// ---------------------------------------------------------------------------

/// Aggregated statistics across multiple stage executions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunMetricsSummary {
    /// Number of stage executions recorded.
    pub count: usize,
    /// Mean duration in milliseconds.
    pub mean_duration_ms: f64,
    /// Median (p50) duration in milliseconds.
    pub p50_duration_ms: f64,
    /// 99th-percentile duration in milliseconds.
    pub p99_duration_ms: f64,
    /// Fraction of recorded executions that failed.
    pub error_rate: f64,
    /// Per-stage execution counts (deterministic ordering).
    pub stage_counts: BTreeMap<String, usize>,
}

impl Default for RunMetricsSummary {
    fn default() -> Self {
        Self {
            count: 0,
            mean_duration_ms: 0.0,
            p50_duration_ms: 0.0,
            p99_duration_ms: 0.0,
            error_rate: 0.0,
            stage_counts: BTreeMap::new(),
        }
    }
}

/// Compute a percentile value from a **sorted** slice.
fn percentile(sorted: &[u64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0] as f64;
    }
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] as f64 * (1.0 - frac) + sorted[upper] as f64 * frac
}

// ---------------------------------------------------------------------------
// MetricsCollector
// ---------------------------------------------------------------------------

/// Thread-safe collector for [`StageMetrics`].
///
/// Wrap in an `Arc` to share across threads (the inner storage is already
/// behind a `Mutex`).
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<Vec<StageMetrics>>>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// Create a new, empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Record one stage execution's metrics.
    pub fn record(&self, metrics: StageMetrics) {
        let mut data = self.inner.lock().expect("metrics lock poisoned");
        data.push(metrics);
    }

    /// Return all recorded stage metrics.
    pub fn runs(&self) -> Vec<StageMetrics> {
        let data = self.inner.lock().expect("metrics lock poisoned");
        data.clone()
    }

    /// Number of executions recorded so far.
    pub fn len(&self) -> usize {
        let data = self.inner.lock().expect("metrics lock poisoned");
        data.len()
    }

    /// Whether the collector has no recorded executions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compute an aggregated summary of all recorded executions.
    pub fn summary(&self) -> RunMetricsSummary {
        let data = self.inner.lock().expect("metrics lock poisoned");
        if data.is_empty() {
            return RunMetricsSummary::default();
        }

        let count = data.len();
        let mut durations: Vec<u64> = data.iter().map(|r| r.duration_ms).collect();
        durations.sort_unstable();

        let total_duration: u64 = durations.iter().sum();
        let mean_duration_ms = total_duration as f64 / count as f64;
        let p50_duration_ms = percentile(&durations, 50.0);
        let p99_duration_ms = percentile(&durations, 99.0);

        let errors = data.iter().filter(|r| !r.success).count();
        let error_rate = errors as f64 / count as f64;

        let mut stage_counts: BTreeMap<String, usize> = BTreeMap::new();
        for r in data.iter() {
            *stage_counts.entry(r.stage.clone()).or_insert(0) += 1;
        }

        RunMetricsSummary {
            count,
            mean_duration_ms,
            p50_duration_ms,
            p99_duration_ms,
            error_rate,
            stage_counts,
        }
    }

    /// Clear all recorded metrics.
    pub fn clear(&self) {
        let mut data = self.inner.lock().expect("metrics lock poisoned");
        data.clear();
    }
}

// ---------------------------------------------------------------------------
// TelemetrySpan
// ---------------------------------------------------------------------------

/// A structured span for tracing integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySpan {
    /// Span name / operation.
    pub name: String,
    /// Arbitrary key-value attributes (deterministic ordering).
    pub attributes: BTreeMap<String, String>,
}

impl TelemetrySpan {
    /// Create a new span with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Insert an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Emit the span via `tracing::info!`.
    pub fn emit(&self) {
        info!(
            span_name = %self.name,
            attributes = ?self.attributes,
            "telemetry_span"
        );
    }
}

// ---------------------------------------------------------------------------
// TelemetryExporter
// ---------------------------------------------------------------------------

/// Trait for exporting collected metrics.
pub trait TelemetryExporter: Send + Sync {
    /// Export the given summary. Returns the serialized output on success.
    fn export(&self, summary: &RunMetricsSummary) -> Result<String, String>;
}

/// Exports metrics as pretty-printed JSON to a string.
#[derive(Debug, Default)]
pub struct JsonExporter;

impl TelemetryExporter for JsonExporter {
    fn export(&self, summary: &RunMetricsSummary) -> Result<String, String> {
        serde_json::to_string_pretty(summary).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn sample_metrics(stage: &str, duration: u64, success: bool) -> StageMetrics {
        StageMetrics {
            stage: stage.to_string(),
            document_id: Some("doc-1".to_string()),
            duration_ms: duration,
            success,
            error_kind: if success { None } else { Some("storage".to_string()) },
            retries: 0,
        }
    }

    #[test]
    fn collector_new_is_empty() {
        let c = MetricsCollector::new();
        assert!(c.is_empty());
        assert_eq!(c.len(), 0);
    }

    #[test]
    fn collector_record_and_len() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("extract", 100, true));
        assert_eq!(c.len(), 1);
        assert!(!c.is_empty());
    }

    #[test]
    fn collector_runs_returns_all() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("extract", 10, true));
        c.record(sample_metrics("classify", 20, true));
        let runs = c.runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].stage, "extract");
        assert_eq!(runs[1].stage, "classify");
    }

    #[test]
    fn collector_clear() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("store", 50, true));
        c.clear();
        assert!(c.is_empty());
    }

    #[test]
    fn empty_collector_summary() {
        let c = MetricsCollector::new();
        let s = c.summary();
        assert_eq!(s.count, 0);
        assert_eq!(s.mean_duration_ms, 0.0);
        assert_eq!(s.error_rate, 0.0);
        assert!(s.stage_counts.is_empty());
    }

    #[test]
    fn single_run_summary_matches() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("extract", 42, true));
        let s = c.summary();
        assert_eq!(s.count, 1);
        assert_eq!(s.mean_duration_ms, 42.0);
        assert_eq!(s.p50_duration_ms, 42.0);
        assert_eq!(s.p99_duration_ms, 42.0);
        assert_eq!(s.error_rate, 0.0);
        assert_eq!(s.stage_counts["extract"], 1);
    }

    #[test]
    fn summary_mean_duration() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("extract", 100, true));
        c.record(sample_metrics("extract", 200, true));
        c.record(sample_metrics("extract", 300, true));
        let s = c.summary();
        assert!((s.mean_duration_ms - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_p50_odd_count() {
        let c = MetricsCollector::new();
        for d in [10, 20, 30, 40, 50] {
            c.record(sample_metrics("extract", d, true));
        }
        let s = c.summary();
        assert!((s.p50_duration_ms - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_p99() {
        let c = MetricsCollector::new();
        for d in 1..=100 {
            c.record(sample_metrics("extract", d, true));
        }
        let s = c.summary();
        assert!(s.p99_duration_ms > 98.0);
        assert!(s.p99_duration_ms <= 100.0);
    }

    #[test]
    fn summary_error_rate() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("extract", 10, false));
        c.record(sample_metrics("extract", 20, true));
        c.record(sample_metrics("extract", 30, false));
        let s = c.summary();
        assert!((s.error_rate - (2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn summary_stage_counts() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("extract", 10, true));
        c.record(sample_metrics("classify", 20, true));
        c.record(sample_metrics("extract", 30, true));
        let s = c.summary();
        assert_eq!(s.stage_counts["extract"], 2);
        assert_eq!(s.stage_counts["classify"], 1);
    }

    #[test]
    fn stage_metrics_serde_roundtrip() {
        let m = sample_metrics("index", 999, false);
        let json = serde_json::to_string(&m).unwrap();
        let m2: StageMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(m, m2);
    }

    #[test]
    fn concurrent_recording() {
        let c = MetricsCollector::new();
        let mut handles = vec![];
        for i in 0..10 {
            let cc = c.clone();
            handles.push(thread::spawn(move || {
                cc.record(sample_metrics("store", i * 10, true));
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(c.len(), 10);
    }

    #[test]
    fn telemetry_span_attributes() {
        let span = TelemetrySpan::new("op")
            .with_attribute("key", "val")
            .with_attribute("another", "thing");
        assert_eq!(span.name, "op");
        assert_eq!(span.attributes.len(), 2);
        assert_eq!(span.attributes["key"], "val");
    }

    #[test]
    fn json_exporter_valid_output() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("extract", 100, true));
        let s = c.summary();
        let exporter = JsonExporter;
        let json = exporter.export(&s).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["count"], 1);
    }

    #[test]
    fn percentile_empty() {
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn percentile_single() {
        assert_eq!(percentile(&[42], 99.0), 42.0);
    }
}
