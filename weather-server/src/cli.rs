use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::info;
use weather_core::{
    Config, OpenWeatherClient,
    config::DEFAULT_ADDR,
};

use crate::routes;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather summary gateway")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve `GET /weather/?lat=..&lon=..` over HTTP.
    Serve(ServeArgs),

    /// Store the API key and bind address in the config file.
    Configure,

    /// Print where the config file lives.
    ConfigPath,
}

/// Flags win over environment, which wins over the config file.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// OpenWeatherMap API key.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Address to listen on, e.g. ":8080" or "127.0.0.1:8080".
    #[arg(long, env = "ADDR")]
    pub addr: Option<String>,

    /// Upstream base URL [default: https://api.openweathermap.org].
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Upstream request timeout in seconds [default: 10].
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

impl From<ServeArgs> for Config {
    fn from(args: ServeArgs) -> Self {
        Config {
            api_key: args.api_key,
            addr: args.addr,
            base_url: args.base_url,
            timeout_secs: args.timeout_secs,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve(args) => serve(args).await,
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = Config::load()?.overlay(args.into()).resolve()?;
    let source = OpenWeatherClient::new(&config)?;

    info!(
        upstream = %config.base_url,
        timeout_secs = config.timeout.as_secs(),
        "Starting weather gateway"
    );

    routes::serve(&config.addr, Arc::new(source)).await
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let addr = Text::new("Listen address:")
        .with_default(config.addr.as_deref().unwrap_or(DEFAULT_ADDR))
        .prompt()
        .context("Failed to read listen address")?;

    config.api_key = Some(api_key.trim().to_string());
    config.addr = Some(addr);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
