//! Telemetry sinks.
//!
//! This module handles:
//! - Time-series points and line protocol encoding
//! - Sink traits and the best-effort [`Telemetry`] facade
//! - InfluxDB point sink and Loki log sink
//! - In-memory sinks for testing

pub mod influx;
pub mod loki;
pub mod mock;
pub mod point;
pub mod sink;

pub use influx::InfluxSink;
pub use loki::LokiSink;
pub use mock::{FailingPointSink, RecordingLogSink, RecordingPointSink};
pub use point::{FieldValue, Point};
pub use sink::{LogRecord, LogSink, NopSink, PointSink, Telemetry};
