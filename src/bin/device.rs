//! Torpedo Device
//!
//! Runs the gameplay state machine and streams telemetry to whichever
//! host connects. One link is served at a time; every new link starts a
//! fresh session.

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use torpedo::{device, TICK_PERIOD_MS, VERSION};

/// Gameplay device for the torpedo game.
#[derive(Debug, Parser)]
#[command(name = "torpedo-device", version)]
struct Args {
    /// Address to accept the host link on.
    #[arg(long, default_value = "127.0.0.1:4570")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Torpedo device v{}", VERSION);
    info!("Tick period: {} ms", TICK_PERIOD_MS);

    let listener = TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("cannot listen on {}", args.listen))?;
    info!(listen = %args.listen, "waiting for a host link");

    tokio::select! {
        served = device::serve(listener) => served.context("device runtime failed")?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }

    Ok(())
}
