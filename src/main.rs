//! Gateway config service.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                 GATEWAY CONF SERVICE                 │
//!                     │                                                      │
//!   Client ───────────┼─▶ http (axum) ──▶ api handlers ──▶ service           │
//!                     │                                      │               │
//!                     │          ┌───────────────────────────┼────────────┐  │
//!                     │          ▼                           ▼            ▼  │
//!                     │   query::facade          update::coordinator  apply │
//!                     │          │                           │       controller
//!                     │          └──────────┬────────────────┘            │  │
//!                     │                     ▼                             ▼  │
//!                     │            store::repository              reload cmd │
//!                     │              (conf.d on disk)          (docker ...)  │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use gateway_conf::config::load_config;
use gateway_conf::http::HttpServer;
use gateway_conf::lifecycle::startup::build_service;
use gateway_conf::lifecycle::Shutdown;
use gateway_conf::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "gateway-conf")]
#[command(about = "Serve and apply gateway config files", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults plus environment are used without it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("gateway-conf v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        root = %config.store.root.display(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let service = build_service(&config).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, service);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
