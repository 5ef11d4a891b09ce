//! Command-line interface for the arena server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tic-tac-toe arena - pairs anonymous players over WebSockets
#[derive(Parser, Debug)]
#[command(name = "arena")]
#[command(about = "Matchmaking server for two-player tic-tac-toe", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "arena.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP / WebSocket server
    Serve {
        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Seconds before a finished game is replaced (overrides the config file)
        #[arg(long)]
        rematch_delay_secs: Option<u64>,
    },

    /// Print the effective configuration as TOML
    Config,
}
