use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use inconvo_relay::web::{run_server, RelayState, ServerConfig};
use inconvo_relay::{Config, InconvoClient};

/// Relay server for the Inconvo conversational-analytics API.
#[derive(Debug, Parser)]
#[command(name = "inconvo-relay", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host address to bind to (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    config.validate()?;

    let client = InconvoClient::from_config(&config);
    let state = RelayState::new(Arc::new(client));

    run_server(
        state,
        ServerConfig {
            host: config.host,
            port: config.port,
            cors_permissive: true,
        },
    )
    .await
}
