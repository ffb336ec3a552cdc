//! Request middleware: access logging and request metrics.
//!
//! Both stages are pass-through. They observe the response after the inner
//! service returns and never touch its status, headers or body.

use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::info;

use crate::metrics;
use crate::telemetry::Point;

use super::handlers::AppState;

/// One access log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessLog {
    /// Peer host, or `unknown`.
    pub client: String,
    /// Request method.
    pub method: String,
    /// Request path, without query.
    pub path: String,
    /// Protocol literal, e.g. `HTTP/1.1`.
    pub protocol: String,
    /// Response status code.
    pub status: u16,
    /// Elapsed wall time in seconds.
    pub elapsed_secs: f64,
}

impl fmt::Display for AccessLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - \"{} {} {}\" {} {:.3}s",
            self.client, self.method, self.path, self.protocol, self.status, self.elapsed_secs
        )
    }
}

fn client_host(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Logging stage. Emits one access line locally and to the log sink.
pub async fn access_log(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let client = client_host(&req);
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let protocol = format!("{:?}", req.version());

    let response = next.run(req).await;

    let entry = AccessLog {
        client,
        method,
        path,
        protocol,
        status: response.status().as_u16(),
        elapsed_secs: start.elapsed().as_secs_f64(),
    };

    info!(
        target: "access",
        client = %entry.client,
        method = %entry.method,
        path = %entry.path,
        status = entry.status,
        elapsed_secs = entry.elapsed_secs,
        "{entry}"
    );
    state.telemetry.emit_log(entry.to_string());

    response
}

/// Metrics stage. Records Prometheus metrics and pushes one `http_requests` point.
pub async fn request_metrics(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let handler = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "none".to_string());

    let response = next.run(req).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    metrics::record_http_request(&method, &handler, status, elapsed);

    let point = Point::new("http_requests")
        .tag("method", method)
        .tag("endpoint", path)
        .tag("status", status.to_string())
        .field("duration_ms", elapsed.as_secs_f64() * 1000.0)
        .stamped_now();
    state.telemetry.emit_point(point).await;

    response
}
