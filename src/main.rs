//! Token Gateway
//!
//! HTTP front end for an ERC-20 token on an Ethereum-compatible node.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ http (axum router + middleware)            │
//!                           │        │                                     │
//!                           │        ▼                                     │
//!                           │   handlers ──▶ blockchain::contract (reads)  │
//!                           │        │                                     │
//!                           │        ▼                                     │
//!                           │   blockchain::transaction ──▶ wallet (sign)  │
//!                           │        │                                     │
//!                           │        ▼                                     │
//!                           │   blockchain::client (timeouts, failover) ───┼──▶ JSON-RPC node
//!                           │                                              │
//!                           │   config · observability · lifecycle         │
//!                           └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use token_gateway::config::resolve_config;
use token_gateway::http::HttpServer;
use token_gateway::lifecycle::{wait_for_signal, Shutdown};
use token_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "token-gateway")]
#[command(about = "HTTP gateway to an ERC-20 token", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration before logging so the configured level applies
    let config = resolve_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);

    tracing::info!("token-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rpc_url = %config.blockchain.rpc_url,
        contract = %config.contract.address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let server = HttpServer::new(config).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
