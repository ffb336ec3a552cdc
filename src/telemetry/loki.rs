//! Loki log sink with a bounded background queue.
//!
//! `ship` only enqueues. A spawned task drains the queue, batching whatever is
//! already waiting into a single push. Dropping every [`LokiSink`] handle
//! closes the queue; the task flushes the remainder and exits.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::SinkError;

use super::sink::{LogRecord, LogSink};

/// Records queued before `ship` starts dropping.
pub const QUEUE_CAPACITY: usize = 1024;

/// Records sent in one push request at most.
pub const MAX_BATCH: usize = 100;

/// Handle for queueing log lines to Loki.
#[derive(Debug, Clone)]
pub struct LokiSink {
    tx: mpsc::Sender<LogRecord>,
}

impl LokiSink {
    /// Build the sink from config and spawn its shipper task.
    pub fn spawn(config: &Config) -> Result<(Self, JoinHandle<()>), SinkError> {
        let http = reqwest::Client::builder()
            .timeout(config.telemetry_timeout())
            .connect_timeout(Duration::from_millis(500))
            .build()?;

        let mut labels = BTreeMap::new();
        labels.insert("app".to_string(), config.loki_app.clone());
        labels.insert("source".to_string(), "access".to_string());

        let push_url = push_url(&config.loki_url)?;
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);

        let shipper = Shipper {
            rx,
            http,
            push_url,
            labels,
        };
        let handle = tokio::spawn(shipper.run());

        Ok((Self { tx }, handle))
    }
}

impl LogSink for LokiSink {
    fn ship(&self, record: LogRecord) -> Result<(), SinkError> {
        self.tx.try_send(record).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

/// `<base>/loki/api/v1/push`, keeping any path prefix on `base`.
pub fn push_url(base: &str) -> Result<Url, SinkError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|()| SinkError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(["loki", "api", "v1", "push"]);
    Ok(url)
}

/// Push API body for one stream.
pub fn push_body(labels: &BTreeMap<String, String>, batch: &[LogRecord]) -> Value {
    let values: Vec<Value> = batch
        .iter()
        .map(|r| json!([r.timestamp_ns.to_string(), r.line]))
        .collect();

    json!({
        "streams": [
            { "stream": labels, "values": values }
        ]
    })
}

struct Shipper {
    rx: mpsc::Receiver<LogRecord>,
    http: reqwest::Client,
    push_url: Url,
    labels: BTreeMap<String, String>,
}

impl Shipper {
    async fn run(mut self) {
        while let Some(first) = self.rx.recv().await {
            let mut batch = vec![first];
            while batch.len() < MAX_BATCH {
                match self.rx.try_recv() {
                    Ok(record) => batch.push(record),
                    Err(_) => break,
                }
            }

            if let Err(e) = self.push(&batch).await {
                warn!(error = %e, dropped = batch.len(), "loki push failed");
                crate::metrics::inc_sink_failures("logs");
            }
        }

        debug!("loki shipper stopped");
    }

    async fn push(&self, batch: &[LogRecord]) -> Result<(), SinkError> {
        let body = push_body(&self.labels, batch);
        let response = self
            .http
            .post(self.push_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
