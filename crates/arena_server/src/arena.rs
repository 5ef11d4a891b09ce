//! The matchmaking service handed to the transport layer.

use crate::config::ServerConfig;
use crate::connection::{Connection, ConnectionId};
use crate::matchmaker::{Matchmaker, PairingLoop};
use crate::registry::Registry;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Owns the registry and the waiting queue.
///
/// Built once at startup and shared by handle: cloning is cheap and every
/// clone talks to the same queue and registry.
#[derive(Debug, Clone)]
pub struct Arena {
    registry: Registry,
    matchmaker: Matchmaker,
}

impl Arena {
    /// Builds the arena and the pairing loop that must be driven for players
    /// to ever be matched.
    #[instrument]
    pub fn new(rematch_delay: Duration) -> (Arena, PairingLoop) {
        let registry = Registry::new();
        let (matchmaker, pairing) = Matchmaker::new(registry.clone(), rematch_delay);
        (
            Arena {
                registry,
                matchmaker,
            },
            pairing,
        )
    }

    /// Builds the arena and runs its pairing loop on the current runtime.
    #[instrument(skip(config))]
    pub fn spawn(config: &ServerConfig) -> Arena {
        let (arena, pairing) = Self::new(config.rematch_delay());
        tokio::spawn(pairing.run());
        info!(rematch_delay = ?config.rematch_delay(), "Arena running");
        arena
    }

    /// Puts a newly accepted connection in the waiting queue.
    pub fn connect(&self, connection: Connection) {
        self.matchmaker.enqueue(connection);
    }

    /// Handles a closed connection: stops the session it was seated in.
    ///
    /// A connection that was still queued needs nothing; the pairing loop
    /// skips it once it sees it is closed.
    #[instrument(skip(self))]
    pub async fn disconnect(&self, id: ConnectionId) {
        match self.registry.lookup(id) {
            Some(session) => session.stop(id).await,
            None => debug!(connection_id = %id, "Disconnected while not seated"),
        }
    }

    /// Registry of seated connections.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
