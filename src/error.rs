//! Unified error types for the to-do service.

use std::path::PathBuf;
use std::time::Duration;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

/// Startup errors for the service binary.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Telemetry sink could not be constructed.
    #[error("telemetry sink error: {0}")]
    Sink(#[from] SinkError),

    /// Prometheus recorder could not be installed.
    #[error("metrics recorder error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// Server socket error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Item store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing file exists but could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Backing file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The backing file holds something other than a list of to-do items.
    #[error("corrupt store file {path}: {source}")]
    Corrupt {
        /// Backing file path.
        path: PathBuf,
        /// Decode error.
        source: serde_json::Error,
    },

    /// The collection could not be serialized.
    #[error("failed to encode items: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Telemetry sink failures. Never surfaced to HTTP clients.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Transport-level failure talking to the sink.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The sink answered with a non-success status.
    #[error("sink rejected write with status {status}: {body}")]
    Rejected {
        /// HTTP status returned by the sink.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The write did not finish in time.
    #[error("sink write timed out after {0:?}")]
    Timeout(Duration),

    /// The configured sink URL is unusable.
    #[error("invalid sink url: {0}")]
    Url(#[from] url::ParseError),

    /// The log queue is full and the record was dropped.
    #[error("log queue full")]
    QueueFull,

    /// The log shipper has shut down.
    #[error("log shipper closed")]
    Closed,
}

/// Errors returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body or path failed validation.
    #[error("{0}")]
    Validation(String),

    /// Referenced item does not exist.
    #[error("{0}")]
    NotFound(&'static str),

    /// The item store failed.
    #[error("store error: {0}")]
    Storage(#[from] StoreError),

    /// The landing page could not be read.
    #[error("failed to read page: {0}")]
    Page(#[source] std::io::Error),
}

/// JSON error body, `{"detail": "..."}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human readable error message.
    pub detail: String,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Page(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::NotFound(msg) => (*msg).to_string(),
            ApiError::Storage(_) | ApiError::Page(_) => {
                error!(error = %self, "request failed");
                "Internal Server Error".to_string()
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;
