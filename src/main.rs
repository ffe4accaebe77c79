//! Raffle gateway (v1)
//!
//! API server for a raffle platform on Sui, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ request id ─▶ trace ─▶ timeout ─▶ turnstile gate ─▶ handlers
//!                                                                    │
//!              ┌──────────────────┬───────────────────┬──────────────┴───┐
//!              ▼                  ▼                   ▼                  ▼
//!        ImageCache (LRU)   PinataClient (IPFS)  SuiClient + Wallet   verifiers
//!                                                (JSON-RPC, ed25519)  (Turnstile,
//!                                                                      reCAPTCHA)
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use raffle_gateway::config::load_config;
use raffle_gateway::lifecycle::{signals, startup, Shutdown};
use raffle_gateway::observability::{logging, metrics};
use raffle_gateway::{AppState, GatewayServer};

#[derive(Parser, Debug)]
#[command(name = "raffle-gateway", version, about = "API gateway for the Sui raffle platform")]
struct Args {
    /// Path to a TOML config file. Environment variables override it.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long, env = "BIND_ADDRESS")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "raffle-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = ?config.environment,
        network = ?config.sui.network,
        rpc = %config.sui.endpoint(),
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

    let wallet = startup::load_release_wallet()?;
    startup::probe_chain(&config).await;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let state = AppState::from_config(config, wallet)?;
    let shutdown = Shutdown::new();
    tokio::spawn(signals::wait_for_signal(shutdown.clone()));

    GatewayServer::new(state).run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
