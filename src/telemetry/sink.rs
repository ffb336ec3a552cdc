//! Sink abstractions decoupling request handling from telemetry backends.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::error::SinkError;
use crate::metrics;

use super::point::Point;

/// A push sink for time-series points.
#[async_trait]
pub trait PointSink: Send + Sync + fmt::Debug {
    /// Write one point. Implementations should not retry.
    async fn write(&self, point: &Point) -> Result<(), SinkError>;
}

/// A sink for structured log lines.
///
/// `ship` must not block; implementations queue and deliver in the background.
pub trait LogSink: Send + Sync + fmt::Debug {
    /// Queue one record for delivery.
    fn ship(&self, record: LogRecord) -> Result<(), SinkError>;
}

/// One log line with its capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Nanoseconds since the epoch.
    pub timestamp_ns: i64,
    /// Rendered line.
    pub line: String,
}

impl LogRecord {
    /// Record stamped with the current wall clock time.
    pub fn now(line: impl Into<String>) -> Self {
        Self {
            timestamp_ns: Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            line: line.into(),
        }
    }
}

/// A sink that discards everything, used when a backend is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopSink;

#[async_trait]
impl PointSink for NopSink {
    async fn write(&self, _point: &Point) -> Result<(), SinkError> {
        Ok(())
    }
}

impl LogSink for NopSink {
    fn ship(&self, _record: LogRecord) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Telemetry clients held by the request handling layer.
///
/// All emission through this type is best-effort: failures are logged and
/// counted locally, never returned.
#[derive(Debug, Clone)]
pub struct Telemetry {
    points: Arc<dyn PointSink>,
    logs: Arc<dyn LogSink>,
    timeout: Duration,
}

impl Telemetry {
    /// Bundle the given sinks.
    pub fn new(points: Arc<dyn PointSink>, logs: Arc<dyn LogSink>, timeout: Duration) -> Self {
        Self {
            points,
            logs,
            timeout,
        }
    }

    /// Telemetry that discards everything.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NopSink), Arc::new(NopSink), Duration::from_secs(1))
    }

    /// Write a point, bounded by the configured timeout. Errors are swallowed.
    pub async fn emit_point(&self, point: Point) {
        let result = match tokio::time::timeout(self.timeout, self.points.write(&point)).await {
            Ok(result) => result,
            Err(_) => Err(SinkError::Timeout(self.timeout)),
        };

        if let Err(e) = result {
            warn!(
                measurement = point.measurement(),
                error = %e,
                "point sink write failed"
            );
            metrics::inc_sink_failures("points");
        }
    }

    /// Queue a log line for shipping. Errors are swallowed.
    pub fn emit_log(&self, line: impl Into<String>) {
        match self.logs.ship(LogRecord::now(line)) {
            Ok(()) => {}
            Err(SinkError::QueueFull) => {
                debug!("log queue full, dropping record");
                metrics::inc_sink_failures("logs");
            }
            Err(e) => {
                warn!(error = %e, "log sink ship failed");
                metrics::inc_sink_failures("logs");
            }
        }
    }
}
