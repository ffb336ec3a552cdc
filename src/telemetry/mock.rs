//! In-memory sinks for unit and integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::SinkError;

use super::point::Point;
use super::sink::{LogRecord, LogSink, PointSink};

/// Records every point written to it.
#[derive(Debug, Clone, Default)]
pub struct RecordingPointSink {
    points: Arc<Mutex<Vec<Point>>>,
}

impl RecordingPointSink {
    /// Snapshot of recorded points.
    pub fn points(&self) -> Vec<Point> {
        self.points.lock().unwrap().clone()
    }

    /// Recorded points with the given measurement.
    pub fn by_measurement(&self, measurement: &str) -> Vec<Point> {
        self.points()
            .into_iter()
            .filter(|p| p.measurement() == measurement)
            .collect()
    }
}

#[async_trait]
impl PointSink for RecordingPointSink {
    async fn write(&self, point: &Point) -> Result<(), SinkError> {
        self.points.lock().unwrap().push(point.clone());
        Ok(())
    }
}

/// A point sink that always fails, optionally after hanging.
#[derive(Debug, Clone, Default)]
pub struct FailingPointSink {
    hang: Option<Duration>,
}

impl FailingPointSink {
    /// A sink that sleeps far longer than any sane timeout before failing.
    pub fn hanging() -> Self {
        Self {
            hang: Some(Duration::from_secs(3600)),
        }
    }
}

#[async_trait]
impl PointSink for FailingPointSink {
    async fn write(&self, _point: &Point) -> Result<(), SinkError> {
        if let Some(hang) = self.hang {
            tokio::time::sleep(hang).await;
        }
        Err(SinkError::Rejected {
            status: 401,
            body: "unauthorized".to_string(),
        })
    }
}

/// Records every log line, or rejects all of them as a full queue.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogSink {
    records: Arc<Mutex<Vec<LogRecord>>>,
    reject: bool,
}

impl RecordingLogSink {
    /// A sink that behaves like a permanently full queue.
    pub fn rejecting() -> Self {
        Self {
            records: Arc::default(),
            reject: true,
        }
    }

    /// Recorded lines in shipping order.
    pub fn lines(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.line.clone())
            .collect()
    }
}

impl LogSink for RecordingLogSink {
    fn ship(&self, record: LogRecord) -> Result<(), SinkError> {
        if self.reject {
            return Err(SinkError::QueueFull);
        }
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}
