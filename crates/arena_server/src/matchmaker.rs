//! FIFO queue of waiting players and the loop that pairs them.

use crate::connection::Connection;
use crate::registry::Registry;
use crate::session::{Session, SessionContext};
use arena_tictactoe::ServerMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Handle for putting connections into the waiting queue.
///
/// Cloning shares the same queue. Enqueueing never blocks.
#[derive(Debug, Clone)]
pub struct Matchmaker {
    queue: mpsc::UnboundedSender<Connection>,
}

/// Single consumer of the waiting queue.
///
/// Runs for the life of the process: takes connections two at a time, tells
/// the first one to wait, and seats each pair in a new [`Session`].
#[derive(Debug)]
pub struct PairingLoop {
    queue: mpsc::UnboundedReceiver<Connection>,
    context: SessionContext,
}

impl Matchmaker {
    /// Creates the queue and the loop that drains it.
    #[instrument(skip(registry))]
    pub fn new(registry: Registry, rematch_delay: Duration) -> (Matchmaker, PairingLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        let matchmaker = Matchmaker { queue: tx };
        let context = SessionContext::new(registry, matchmaker.clone(), rematch_delay);
        (matchmaker, PairingLoop { queue: rx, context })
    }

    /// Appends `connection` to the tail of the waiting queue.
    #[instrument(skip(self, connection), fields(connection_id = %connection.id()))]
    pub fn enqueue(&self, connection: Connection) {
        if self.queue.send(connection).is_err() {
            warn!("Pairing loop has stopped; connection dropped");
        } else {
            debug!("Connection queued");
        }
    }
}

impl PairingLoop {
    /// Pairs connections for as long as the queue is open.
    ///
    /// A closed connection is skipped wherever it turns up, and a fault while
    /// seating one pair never ends the loop.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!("Pairing loop started");
        let mut waiting: Option<Connection> = None;

        while let Some(connection) = self.queue.recv().await {
            if connection.is_closed() {
                debug!(connection_id = %connection.id(), "Skipping closed connection");
                continue;
            }

            match waiting.take() {
                Some(first) if !first.is_closed() => self.pair(first, connection).await,
                stale => {
                    if let Some(stale) = stale {
                        debug!(connection_id = %stale.id(), "Waiting connection closed");
                    }
                    waiting = self.hold(connection);
                }
            }
        }

        info!("Pairing loop finished");
    }

    /// Tells `connection` to wait for an opponent.
    ///
    /// Returns it back if the notice went through.
    fn hold(&self, connection: Connection) -> Option<Connection> {
        match connection.send(&ServerMessage::Wait) {
            Ok(()) => {
                info!(connection_id = %connection.id(), "Waiting for opponent");
                Some(connection)
            }
            Err(e) => {
                warn!(error = %e, "Could not send wait notice");
                None
            }
        }
    }

    #[instrument(skip_all, fields(first = %first.id(), second = %second.id()))]
    async fn pair(&self, first: Connection, second: Connection) {
        let session = Arc::new(Session::new(first, second, self.context.clone()));
        for connection in session.connections() {
            self.context.registry.put(connection.id(), Arc::clone(&session));
        }
        info!(session_id = %session.id(), "Paired players");

        if let Err(e) = session.start().await {
            warn!(session_id = %session.id(), error = %e, "Session failed to start");
            session.stop(e.connection).await;
        }
    }
}
