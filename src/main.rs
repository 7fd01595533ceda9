//! Gemini API Relay
//!
//! A stateless reverse proxy built with Tokio, Axum, and reqwest.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                     RELAY                        │
//!   Client Request     │  ┌──────────┐   ┌───────────┐   ┌────────────┐   │
//!   ───────────────────┼─▶│  server  │──▶│  method   │──▶│  routing   │   │
//!                      │  │ (axum)   │   │ dispatch  │   │ key pool / │   │
//!                      │  └──────────┘   └─────┬─────┘   │ keyed      │   │
//!                      │       OPTIONS/GET/405 │         └─────┬──────┘   │
//!                      │                       ▼               ▼          │
//!   Client Response    │  ┌──────────┐   ┌───────────┐   ┌────────────┐   │
//!   ◀──────────────────┼──│   CORS   │◀──│ response  │◀──│  reqwest   │◀──┼── Upstream
//!                      │  │ overlay  │   │ (stream)  │   │  client    │   │
//!                      │  └──────────┘   └───────────┘   └────────────┘   │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use gemini_relay::config::loader::{apply_env_overrides, read_config_file};
use gemini_relay::config::validation::validate_config;
use gemini_relay::config::{ConfigError, ProxyConfig};
use gemini_relay::lifecycle::Shutdown;
use gemini_relay::observability::{logging, metrics};
use gemini_relay::HttpServer;

#[derive(Parser)]
#[command(name = "gemini-relay")]
#[command(about = "Reverse proxy for the Gemini API with key rotation and CORS", long_about = None)]
struct Cli {
    /// TOML configuration file. Environment variables override it.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding config and environment.
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => read_config_file(path)?,
        None => ProxyConfig::default(),
    };
    logging::init_logging(&file_config.observability);

    tracing::info!("gemini-relay v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = apply_env_overrides(file_config, |name| std::env::var(name).ok())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        mode = ?config.upstream.mode,
        default_upstream = %config.upstream.default_base_url,
        "Configuration loaded"
    );

    if cli.check {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics endpoint");
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.listen_for_signals();

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
