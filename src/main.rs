//! CORS forwarding gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser                       ┌──────────────────────────────────────┐
//!   ─── OPTIONS ─────────────────▶│ preflight ──▶ 204 + CORS headers      │
//!                                 │                                      │
//!   ─── GET /proxy/<enc-url> ────▶│ routing ──▶ allowlist ──▶ headers    │
//!                                 │                             │        │
//!                                 │                             ▼        │        Allowed
//!   ◀── status + body + CORS ─────│ response ◀──────────── upstream ─────┼──────▶ API host
//!                                 └──────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_gateway::config::{load_config, ProxyConfig};
use cors_gateway::lifecycle::{signals, Shutdown};
use cors_gateway::observability::logging;
use cors_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "cors-gateway")]
#[command(about = "Forward browser requests to allowlisted APIs with CORS headers", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_file = ?cli.config,
        "cors-gateway starting"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
