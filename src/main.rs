//! Voice gateway
//!
//! HTTP front door for a voice assistant: speech synthesis, readiness
//! reporting and metrics, with bounded retries toward every external API.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                VOICE GATEWAY                  │
//!                     │                                               │
//!   Client Request    │  ┌─────────┐    ┌──────────┐    ┌──────────┐  │
//!   ──────────────────┼─▶│  http   │───▶│ handlers │───▶│ clients  │──┼──▶ OpenAI
//!                     │  │ server  │    │          │    │ + retry  │──┼──▶ Qdrant
//!                     │  └─────────┘    └────┬─────┘    └──────────┘  │
//!                     │                      │ /ready                 │
//!                     │                      ▼                        │
//!                     │               ┌────────────┐                  │
//!                     │               │   health   │──────────────────┼──▶ Postgres / Qdrant / OpenAI
//!                     │               │ aggregator │                  │
//!                     │               └────────────┘                  │
//!                     │                                               │
//!                     │  config · observability · lifecycle           │
//!                     └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use voice_gateway::config::load_config;
use voice_gateway::lifecycle::{build_context, signals, Shutdown};
use voice_gateway::observability::{logging, metrics};
use voice_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "voice-gateway")]
#[command(about = "HTTP gateway for the voice assistant", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "VOICE_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init(&config.observability);

    tracing::info!("voice-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let metrics_handle = if config.observability.metrics_enabled {
        metrics::init_metrics()
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let context = build_context(config, metrics_handle)?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::listen(shutdown.clone()));

    let server = HttpServer::new(context);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
