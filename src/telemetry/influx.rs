//! InfluxDB v2 point sink.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, instrument};
use url::Url;

use crate::config::Config;
use crate::error::SinkError;

use super::point::Point;
use super::sink::PointSink;

/// Writes points to the InfluxDB v2 `/api/v2/write` endpoint.
#[derive(Debug, Clone)]
pub struct InfluxSink {
    http: reqwest::Client,
    write_url: Url,
    token: String,
}

impl InfluxSink {
    /// Build a sink from config.
    pub fn new(config: &Config) -> Result<Self, SinkError> {
        let http = reqwest::Client::builder()
            .timeout(config.telemetry_timeout())
            .connect_timeout(Duration::from_millis(500))
            .tcp_nodelay(true)
            .build()?;

        Ok(Self {
            http,
            write_url: write_url(
                &config.influxdb_url,
                &config.influxdb_org,
                &config.influxdb_bucket,
            )?,
            token: config.influxdb_token.clone(),
        })
    }

    /// Fully qualified write URL, including org, bucket and precision.
    pub fn write_url(&self) -> &Url {
        &self.write_url
    }
}

/// Build `<base>/api/v2/write?org=..&bucket=..&precision=ns`.
///
/// Any path already on `base` is kept, so a proxy prefix survives.
pub fn write_url(base: &str, org: &str, bucket: &str) -> Result<Url, SinkError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|()| SinkError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(["api", "v2", "write"]);
    url.query_pairs_mut()
        .append_pair("org", org)
        .append_pair("bucket", bucket)
        .append_pair("precision", "ns");
    Ok(url)
}

#[async_trait]
impl PointSink for InfluxSink {
    #[instrument(skip(self, point), fields(measurement = point.measurement()))]
    async fn write(&self, point: &Point) -> Result<(), SinkError> {
        let response = self
            .http
            .post(self.write_url.clone())
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(point.to_line_protocol())
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

        debug!("point written");
        Ok(())
    }
}
