mod connection;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tetris_arena::{ArenaConfig, Directory};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// tetris-server - two-player competitive tetris over WebSocket
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    listen: String,

    /// Gravity tick period in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    tick_ms: u64,

    /// Seed for piece generation (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ArenaConfig::new()
        .with_tick_interval_ms(args.tick_ms)
        .with_rng_seed(args.seed);
    let directory = Arc::new(Directory::new(config));

    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;
    tracing::info!(
        "Listening on ws://{} (tick {} ms)",
        listener.local_addr()?,
        directory.config().tick_interval_ms
    );

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!("Accept failed: {}", e);
                        continue;
                    }
                };
                tracing::info!("Connection from {}", peer);
                let directory = directory.clone();
                tokio::spawn(async move {
                    if let Err(e) = connection::handle_connection(stream, peer, directory).await {
                        tracing::warn!("Connection {} ended with error: {:#}", peer, e);
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}
