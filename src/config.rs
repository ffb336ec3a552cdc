//! Application configuration loaded from environment variables.
//!
//! Every default is meant for local development against the docker-compose
//! stack. Production deployments must override the sink URLs and credentials.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// Address to bind the HTTP server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    // === Storage ===
    /// Backing file for the to-do collection.
    #[serde(default = "default_todo_file")]
    pub todo_file: PathBuf,

    /// Directory holding `index.html`. Resolved next to the executable when unset.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,

    // === InfluxDB ===
    /// Push request points to InfluxDB.
    #[serde(default = "default_true")]
    pub influxdb_enabled: bool,

    /// InfluxDB base URL.
    #[serde(default = "default_influxdb_url")]
    pub influxdb_url: String,

    /// InfluxDB API token.
    #[serde(default = "default_influxdb_token")]
    pub influxdb_token: String,

    /// InfluxDB organization.
    #[serde(default = "default_influxdb_org")]
    pub influxdb_org: String,

    /// InfluxDB bucket.
    #[serde(default = "default_influxdb_bucket")]
    pub influxdb_bucket: String,

    // === Loki ===
    /// Ship access logs to Loki.
    #[serde(default = "default_true")]
    pub loki_enabled: bool,

    /// Loki base URL.
    #[serde(default = "default_loki_url")]
    pub loki_url: String,

    /// Value of the static `app` label on shipped log streams.
    #[serde(default = "default_loki_app")]
    pub loki_app: String,

    /// Upper bound on a single telemetry write, in milliseconds.
    #[serde(default = "default_telemetry_timeout")]
    pub telemetry_timeout_ms: u64,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_todo_file() -> PathBuf {
    PathBuf::from("todo.json")
}

fn default_true() -> bool {
    true
}

fn default_influxdb_url() -> String {
    "http://influxdb:8086".to_string()
}

fn default_influxdb_token() -> String {
    "my-super-secret-auth-token".to_string()
}

fn default_influxdb_org() -> String {
    "myorg".to_string()
}

fn default_influxdb_bucket() -> String {
    "mybucket".to_string()
}

fn default_loki_url() -> String {
    "http://loki:3100".to_string()
}

fn default_loki_app() -> String {
    "todo-service".to_string()
}

fn default_telemetry_timeout() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.influxdb_enabled {
            Url::parse(&self.influxdb_url)
                .map_err(|e| format!("INFLUXDB_URL is not a valid URL: {e}"))?;

            if self.influxdb_org.is_empty() {
                return Err("INFLUXDB_ORG must not be empty".to_string());
            }

            if self.influxdb_bucket.is_empty() {
                return Err("INFLUXDB_BUCKET must not be empty".to_string());
            }
        }

        if self.loki_enabled {
            Url::parse(&self.loki_url)
                .map_err(|e| format!("LOKI_URL is not a valid URL: {e}"))?;
        }

        if self.telemetry_timeout_ms == 0 {
            return Err("TELEMETRY_TIMEOUT_MS must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Timeout applied to each telemetry write.
    pub fn telemetry_timeout(&self) -> Duration {
        Duration::from_millis(self.telemetry_timeout_ms)
    }

    /// Socket address string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
