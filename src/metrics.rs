//! Prometheus metrics for request tracking and telemetry health.
//!
//! This module provides:
//! - HTTP request counters and latency histograms
//! - Business event counters
//! - Telemetry sink failure counters
//! - Recorder installation for the `/metrics` endpoint

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// HTTP request duration metric name.
pub const METRIC_HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
/// Created to-do items counter metric name.
pub const METRIC_TODOS_CREATED: &str = "todos_created_total";
/// Telemetry sink failures counter metric name.
pub const METRIC_SINK_FAILURES: &str = "telemetry_sink_failures_total";
/// Process start time gauge metric name.
pub const METRIC_PROCESS_START_TIME: &str = "process_start_time_seconds";

/// Request duration buckets, in seconds.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Install the global Prometheus recorder and return its render handle.
/// Call this once at startup.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(METRIC_HTTP_REQUEST_DURATION.to_string()),
            DURATION_BUCKETS,
        )?
        .install_recorder()?;

    init_metrics();
    Ok(handle)
}

/// Initialize all metric descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests");
    describe_histogram!(
        METRIC_HTTP_REQUEST_DURATION,
        "HTTP request latency in seconds"
    );
    describe_counter!(METRIC_TODOS_CREATED, "Total number of to-do items created");
    describe_counter!(
        METRIC_SINK_FAILURES,
        "Total number of failed telemetry sink writes"
    );
    describe_gauge!(
        METRIC_PROCESS_START_TIME,
        "Start time of the process since unix epoch in seconds"
    );

    let started = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();
    gauge!(METRIC_PROCESS_START_TIME).set(started);

    debug!("Metrics initialized");
}

/// Record one finished HTTP request.
pub fn record_http_request(method: &str, handler: &str, status: u16, duration: Duration) {
    counter!(
        METRIC_HTTP_REQUESTS,
        "method" => method.to_string(),
        "handler" => handler.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        METRIC_HTTP_REQUEST_DURATION,
        "method" => method.to_string(),
        "handler" => handler.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Increment created to-do items counter.
pub fn inc_todos_created() {
    counter!(METRIC_TODOS_CREATED).increment(1);
}

/// Increment telemetry sink failures counter.
pub fn inc_sink_failures(sink: &'static str) {
    counter!(METRIC_SINK_FAILURES, "sink" => sink).increment(1);
}
