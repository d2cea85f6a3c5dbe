//! Trip gateway.
//!
//! An edge gateway in front of a location/trip-tracking backend.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────────┐
//!                         │                     TRIP GATEWAY                      │
//!   Client Request        │  ┌─────────┐   ┌────────────┐   ┌────────────────┐   │
//!   ──────────────────────┼─▶│  http   │──▶│  routing   │──▶│ caching lookup │   │
//!                         │  │ server  │   │ allowlist  │   └───────┬────────┘   │
//!                         │  └─────────┘   └────────────┘           │ miss       │
//!                         │                                         ▼            │
//!                         │                                 ┌────────────────┐   │
//!                         │                                 │    upstream    │◀──┼──── Backend
//!                         │                                 │    fetcher     │   │
//!                         │                                 └───────┬────────┘   │
//!                         │                                         ▼            │
//!                         │  ┌─────────┐   ┌────────────┐   ┌────────────────┐   │
//!   Client Response       │  │response │◀──│  caching   │◀──│ trip verify +  │   │
//!   ◀─────────────────────┼──│ headers │   │  policy    │   │ privacy redact │   │
//!                         │  └─────────┘   └────────────┘   └────────────────┘   │
//!                         └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use trip_gateway::config::{load_with, watcher::ConfigWatcher, Overrides};
use trip_gateway::lifecycle::{signals, Shutdown};
use trip_gateway::observability::{logging, metrics};
use trip_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "trip-gateway")]
#[command(about = "Privacy-preserving edge gateway for a trip-tracking backend", long_about = None)]
struct Cli {
    /// TOML configuration file. Watched for changes when given.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base address, e.g. http://10.0.0.5:3000 (overrides SERVICE_HOST)
    #[arg(short, long)]
    backend: Option<String>,

    /// Listener bind address
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = Overrides {
        backend: cli.backend,
        bind: cli.bind,
    };
    let config = load_with(cli.config.as_deref(), |config| overrides.apply(config))?;

    logging::init(&config.observability);

    tracing::info!("trip-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.upstream.base_url,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        cache_enabled = config.cache.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    // Hot reload only when a file was given; keep the watcher alive until exit.
    let (_watcher, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, overrides, config.clone());
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config);

    tokio::spawn(async move {
        signals::forward_to(&shutdown).await;
    });

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
