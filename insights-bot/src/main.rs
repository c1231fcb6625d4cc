//! Chainflip Insights Bot
//!
//! Polls the Chainflip explorer, node and Dune for new activity and
//! announces it on Discord, Telegram, Twitter and Mastodon.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

mod config;
mod shutdown;
mod wiring;

use clap::Parser;
use config::ConfigLoader;
use shutdown::shutdown_signal;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wiring::build_topology;

/// Chainflip Insights - announces on-chain activity on social channels
#[derive(Parser, Debug)]
#[command(name = "insights-bot")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        env = "INSIGHTS_CONFIG",
        default_value = "./insights-config.toml"
    )]
    config: PathBuf,

    /// Override the directory holding the cursor files
    #[arg(short, long)]
    state_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting insights-bot v{}", env!("CARGO_PKG_VERSION"));

    let config = ConfigLoader::new(&args.config, args.state_dir)
        .load()
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let topology = build_topology(&config).map_err(|e| {
        tracing::error!("Failed to build topology: {}", e);
        e
    })?;
    let shutdown = topology.shutdown_handle();
    let completion = topology.completion();
    tokio::pin!(completion);

    tokio::select! {
        result = &mut completion => {
            result?;
            tracing::info!("All sources completed");
        }
        signal = shutdown_signal() => {
            signal.map_err(|e| {
                tracing::error!("Failed to install signal handlers: {}", e);
                e
            })?;
            shutdown.shutdown();
            completion.await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
