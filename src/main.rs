//! Sentiment relay
//!
//! Forwards JSON requests to a hosted sentiment-classification model and
//! returns its answer verbatim, writing one audit record per request.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ http server ──▶ request view + JSON body   │
//!                           │                          │                   │
//!                           │                          ▼                   │
//!                           │                   upstream client ───────────┼──▶ Inference API
//!                           │                          │                   │
//!                           │                          ▼                   │
//!     Client Response       │                    audit logger ──▶ audit file
//!     ◀─────────────────────┼──── response ◀───────────┘                   │
//!                           │                                              │
//!                           │   config · logging · metrics · lifecycle     │
//!                           └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use sentiment_relay::config::validation::validate_config;
use sentiment_relay::config::{load_config, ConfigError};
use sentiment_relay::lifecycle::{signals, Shutdown};
use sentiment_relay::observability::{logging, metrics, AuditLogger};
use sentiment_relay::HttpServer;

#[derive(Parser)]
#[command(name = "sentiment-relay")]
#[command(about = "Audited relay for a hosted sentiment-analysis model", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 0.0.0.0:8080).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("sentiment-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.endpoint(),
        audit_directory = %config.audit.directory,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            metrics::init_metrics(addr);
        }
    }

    let audit = AuditLogger::from_config(&config.audit)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::forward_signals(&shutdown).await;
    });

    let server = HttpServer::new(config, audit)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
