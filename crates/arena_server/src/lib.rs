//! Matchmaking server for two-player tic-tac-toe.
//!
//! Anonymous clients connect over WebSockets, wait in a FIFO queue, and are
//! paired two at a time into a [`Session`]. When one player leaves, the other
//! is told and goes back into the queue.
//!
//! # Architecture
//!
//! - **Connection**: narrow handle over one client's message channel
//! - **Matchmaker**: the waiting queue and the loop that pairs it
//! - **Session**: one match, its board, its listeners, and its rematches
//! - **Registry**: which session each seated connection belongs to
//! - **Arena**: owns all of the above; the transport talks only to it
//!
//! # Example
//!
//! ```no_run
//! use arena_server::{Arena, ServerConfig, http};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let arena = Arena::spawn(&config);
//! let listener = tokio::net::TcpListener::bind(("127.0.0.1", 8080)).await?;
//! axum::serve(listener, http::router(arena)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod arena;
mod config;
mod connection;
mod error;
pub mod http;
mod matchmaker;
mod registry;
mod session;

pub use arena::Arena;
pub use config::{ConfigError, ServerConfig};
pub use connection::{Connection, ConnectionId, TransportEnd};
pub use error::TransportError;
pub use matchmaker::{Matchmaker, PairingLoop};
pub use registry::Registry;
pub use session::{Phase, Session, SessionContext, SessionId};
