//! Binary crate for the `weather-server` HTTP gateway.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and environment
//! - Interactive configuration
//! - Serving `/weather/` over HTTP

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
