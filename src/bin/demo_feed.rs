//! Demo order-update feed
//!
//! Serves the scripted orders to any client on `FEED_BIND_ADDR`.

use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_reconciler::{Config, FeedSimulator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let config = Config::load()?;

    let simulator = match &config.feed_script_path {
        Some(path) => FeedSimulator::from_path(path)?,
        None => FeedSimulator::sample()?,
    };
    info!(updates = simulator.script_len(), "Order script loaded");

    let listener = TcpListener::bind(&config.feed_bind_addr).await?;
    info!(addr = %config.feed_bind_addr, "WebSocket feed is running");

    simulator.serve(listener).await?;
    Ok(())
}
