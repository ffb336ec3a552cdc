//! JSON-file backed to-do HTTP service with request telemetry.
//!
//! Every request reads the whole collection from one JSON file, and every
//! mutation writes it back. Requests pass through an access-log stage and a
//! metrics stage that push to Loki and InfluxDB on a best-effort basis: a
//! telemetry outage never changes what the client sees.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`store`]: To-do item model and whole-file JSON store
//! - [`telemetry`]: Point and log sinks (InfluxDB, Loki, test doubles)
//! - [`metrics`]: Prometheus metric names and recorder
//! - [`api`]: HTTP handlers, middleware and routes
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod store;
pub mod telemetry;
pub mod utils;

pub use config::Config;
pub use error::{Result, ServiceError};
