//! Torpedo Host
//!
//! Connects to the device, forwards keystrokes, and turns the telemetry
//! stream into per-session statistics on stdout.

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use torpedo::{host, VERSION};

/// Statistics host for the torpedo game.
#[derive(Debug, Parser)]
#[command(name = "torpedo-host", version)]
struct Args {
    /// Address the device is listening on.
    #[arg(long, default_value = "127.0.0.1:4570")]
    device: SocketAddr,

    /// Print session reports as JSON lines instead of the text block.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Log to stderr so raw-mode key echo and reports keep stdout clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    info!("Torpedo host v{}", VERSION);

    host::run(args.device, args.json)
        .await
        .context("host runtime failed")?;

    Ok(())
}
