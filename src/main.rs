//! To-do service entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use todo_service::api::{create_router, AppState};
use todo_service::config::{Config, LogFormat};
use todo_service::error::ServiceError;
use todo_service::metrics;
use todo_service::store::JsonFileStore;
use todo_service::telemetry::{InfluxSink, LogSink, LokiSink, NopSink, PointSink, Telemetry};
use todo_service::utils::{resolve_templates_dir, shutdown_signal};

/// Upper bound on flushing queued log lines at shutdown.
const LOG_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// How often the Prometheus recorder drains histogram buffers.
const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// JSON-file backed to-do HTTP service.
#[derive(Parser, Debug)]
#[command(name = "todo-service")]
#[command(about = "To-do HTTP API with InfluxDB, Loki and Prometheus telemetry")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Configuration drives the log format, so it is loaded first.
    let config = Config::load().map_err(ServiceError::Config)?;

    // Initialize logging
    init_logging(&config, args.verbose);

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Serve { port }) => cmd_serve(config, port.or(args.port)).await,
        None => cmd_serve(config, args.port).await,
    }
}

fn init_logging(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("todo_service=debug,access=info,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log))
    };

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("TODO SERVICE - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Listen: {}", config.bind_addr());
    println!("  Store File: {}", config.todo_file.display());
    println!(
        "  Templates: {}",
        resolve_templates_dir(config.templates_dir.as_deref()).display()
    );
    if config.influxdb_enabled {
        println!(
            "  InfluxDB: {} (org={}, bucket={})",
            config.influxdb_url, config.influxdb_org, config.influxdb_bucket
        );
    } else {
        println!("  InfluxDB: Disabled");
    }
    if config.loki_enabled {
        println!("  Loki: {} (app={})", config.loki_url, config.loki_app);
    } else {
        println!("  Loki: Disabled");
    }
    println!("  Telemetry Timeout: {}ms", config.telemetry_timeout_ms);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Build sinks from config. Returns the shipper task when Loki is enabled.
fn build_telemetry(config: &Config) -> todo_service::Result<(Telemetry, Option<JoinHandle<()>>)> {
    let points: Arc<dyn PointSink> = if config.influxdb_enabled {
        info!(url = %config.influxdb_url, bucket = %config.influxdb_bucket, "InfluxDB sink enabled");
        Arc::new(InfluxSink::new(config)?)
    } else {
        info!("InfluxDB sink disabled");
        Arc::new(NopSink)
    };

    let (logs, shipper) = if config.loki_enabled {
        info!(url = %config.loki_url, "Loki sink enabled");
        let (sink, handle) = LokiSink::spawn(config)?;
        let sink: Arc<dyn LogSink> = Arc::new(sink);
        (sink, Some(handle))
    } else {
        info!("Loki sink disabled");
        let sink: Arc<dyn LogSink> = Arc::new(NopSink);
        (sink, None)
    };

    Ok((
        Telemetry::new(points, logs, config.telemetry_timeout()),
        shipper,
    ))
}

/// Run the HTTP server until a shutdown signal arrives.
async fn cmd_serve(mut config: Config, port_override: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port_override {
        config.port = port;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(ServiceError::InvalidConfig(e).into());
    }

    let prometheus = metrics::install_recorder()?;
    let upkeep_handle = prometheus.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(METRICS_UPKEEP_INTERVAL);
        loop {
            interval.tick().await;
            upkeep_handle.run_upkeep();
        }
    });

    let (telemetry, shipper) = build_telemetry(&config)?;

    let templates_dir = resolve_templates_dir(config.templates_dir.as_deref());
    info!(store = %config.todo_file.display(), templates = %templates_dir.display(), "Paths resolved");

    let state = AppState::new(
        JsonFileStore::new(config.todo_file.clone()),
        telemetry,
        templates_dir,
    )
    .with_prometheus(prometheus);

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .map_err(ServiceError::Io)?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    let router = create_router(state);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router and every sink handle are dropped by now, which closes the
    // log queue and lets the shipper drain.
    if let Some(shipper) = shipper {
        match tokio::time::timeout(LOG_FLUSH_TIMEOUT, shipper).await {
            Ok(Ok(())) => info!("Log shipper flushed"),
            Ok(Err(e)) => warn!(error = %e, "Log shipper task failed"),
            Err(_) => warn!("Timed out flushing log shipper"),
        }
    }

    info!("Server stopped");
    Ok(())
}
