//! Tic-tac-toe arena server.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use arena_server::{Arena, ServerConfig, http};
use clap::Parser;
use cli::{Cli, Command};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ServerConfig::load_or_default(&cli.config)?;

    match cli.command {
        Command::Serve {
            host,
            port,
            rematch_delay_secs,
        } => {
            initialize_tracing();
            let mut config = config;
            if let Some(host) = host {
                config = config.with_host(host);
            }
            if let Some(port) = port {
                config = config.with_port(port);
            }
            if let Some(secs) = rematch_delay_secs {
                config = config.with_rematch_delay_secs(secs);
            }
            run_server(config).await
        }
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Run the HTTP / WebSocket server until it fails.
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
async fn run_server(config: ServerConfig) -> Result<()> {
    let arena = Arena::spawn(&config);
    let app = http::router(arena);

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(
        "Server ready at http://{}:{}/ (WebSocket at {})",
        config.host(),
        config.port(),
        http::GAME_PATH
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,arena_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Tracing initialized");
}
