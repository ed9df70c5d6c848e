//! vitals: process and host diagnostics over HTTP.
//!
//! This is the application entry point. It parses the command line, resolves
//! configuration (flags and environment over the optional TOML file over
//! defaults), initializes tracing, and serves the diagnostic router until a
//! shutdown signal arrives.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vitals::config::{
    AppConfig, ConfigOverrides, LogFormat, DEFAULT_LOG_FILTER, ENVIRONMENT_VAR,
    LEGACY_ENVIRONMENT_VAR,
};
use vitals::http::start_server;
use vitals::probe::{CountingAllocator, SysinfoProbe};
use vitals::{create_router, AppState};

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

/// vitals: process and host diagnostics over HTTP
#[derive(Parser, Debug)]
#[command(name = "vitals", version, about)]
struct Args {
    /// Path to configuration file (config/vitals.toml is read if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Deployment environment label (falls back to NODE_ENV)
    #[arg(short, long, env = ENVIRONMENT_VAR)]
    environment: Option<String>,

    /// Log level filter (e.g., "vitals=debug")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log format: text or json
    #[arg(long)]
    log_format: Option<LogFormat>,
}

fn init_tracing(filter: &str, format: LogFormat) {
    // stdout carries the startup announcement; logs go to stderr
    let registry = tracing_subscriber::registry().with(EnvFilter::new(filter));
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let started_at = Instant::now();

    let args = Args::parse();

    let environment = ConfigOverrides::environment_from(
        args.environment,
        std::env::var(LEGACY_ENVIRONMENT_VAR).ok(),
    );

    let config = AppConfig::load_or_default(args.config.as_deref())?.with_overrides(
        ConfigOverrides {
            host: args.host,
            port: args.port,
            environment,
            log_format: args.log_format,
        },
    )?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    init_tracing(&log_filter, config.logging.format);

    tracing::info!(
        host = %config.http.host,
        port = config.http.port,
        environment = %config.environment,
        log_format = %config.logging.format,
        "Loaded configuration"
    );

    let probe = SysinfoProbe::new()?;
    let state = AppState::with_start(config.clone(), Arc::new(probe), started_at);
    let app = create_router(state);

    start_server(app, &config).await?;

    Ok(())
}
