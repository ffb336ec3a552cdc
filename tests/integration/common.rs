//! Shared test harness.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use todo_service::api::{create_router, AppState};
use todo_service::store::JsonFileStore;
use todo_service::telemetry::{PointSink, RecordingLogSink, RecordingPointSink, Telemetry};

/// Router plus handles on everything it touches.
pub struct TestApp {
    pub router: Router,
    pub store: JsonFileStore,
    pub points: Arc<RecordingPointSink>,
    pub logs: Arc<RecordingLogSink>,
    _dir: TempDir,
}

/// Raw response parts.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }
}

impl TestApp {
    /// App with recording sinks.
    pub fn new() -> Self {
        let points = Arc::new(RecordingPointSink::default());
        Self::build(points.clone(), points, Duration::from_secs(1))
    }

    /// App whose point writes go to `sink` instead of the recorder.
    pub fn with_point_sink(sink: Arc<dyn PointSink>, timeout: Duration) -> Self {
        Self::build(sink, Arc::new(RecordingPointSink::default()), timeout)
    }

    fn build(
        point_sink: Arc<dyn PointSink>,
        points: Arc<RecordingPointSink>,
        timeout: Duration,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("todo.json"));
        let logs = Arc::new(RecordingLogSink::default());
        let telemetry = Telemetry::new(point_sink, logs.clone(), timeout);

        let templates = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");
        let state = AppState::new(store.clone(), telemetry, templates);

        Self {
            router: create_router(state),
            store,
            points,
            logs,
            _dir: dir,
        }
    }

    /// App whose templates directory has no `index.html`.
    pub fn without_templates() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("todo.json"));
        let state = AppState::new(
            store.clone(),
            Telemetry::disabled(),
            dir.path().join("missing"),
        );

        Self {
            router: create_router(state),
            store,
            points: Arc::new(RecordingPointSink::default()),
            logs: Arc::new(RecordingLogSink::default()),
            _dir: dir,
        }
    }

    /// Send a request with an optional JSON body.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    /// Send a prebuilt request.
    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }
}
