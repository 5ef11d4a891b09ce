//! Narrow handle over one client's duplex message channel.
//!
//! A [`Connection`] is what the arena sees: an identity, a way to push
//! [`ServerMessage`]s, the inbound stream of raw text frames, and a close
//! signal. The matching [`TransportEnd`] is what the transport (a WebSocket
//! task, or a test) drives: it drains outbound frames, feeds inbound ones, and
//! signals close.

use crate::error::TransportError;
use arena_tictactoe::ServerMessage;
use derive_more::Display;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, instrument, trace};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique, opaque identity of a connection.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("conn-{}", _0)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Arena-side handle to one client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<String>,
    inbound: Mutex<mpsc::UnboundedReceiver<String>>,
    closed: watch::Receiver<bool>,
}

/// Transport-side half of a [`Connection`].
///
/// Dropping it closes the connection.
#[derive(Debug)]
pub struct TransportEnd {
    pub(crate) outbound: mpsc::UnboundedReceiver<String>,
    pub(crate) inbound: mpsc::UnboundedSender<String>,
    close: watch::Sender<bool>,
}

impl Connection {
    /// Creates a connected pair of handles with a fresh identity.
    #[instrument]
    pub fn channel() -> (Connection, TransportEnd) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = watch::channel(false);

        let id = ConnectionId::next();
        debug!(connection_id = %id, "Created connection");

        let connection = Connection {
            inner: Arc::new(Inner {
                id,
                outbound: outbound_tx,
                inbound: Mutex::new(inbound_rx),
                closed: close_rx,
            }),
        };
        let transport = TransportEnd {
            outbound: outbound_rx,
            inbound: inbound_tx,
            close: close_tx,
        };
        (connection, transport)
    }

    /// Identity of this connection.
    pub fn id(&self) -> ConnectionId {
        self.inner.id
    }

    /// Queues `message` for delivery. Messages arrive in send order.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the message cannot be encoded or the
    /// transport side is gone.
    #[instrument(level = "debug", skip(self, message), fields(connection_id = %self.inner.id))]
    pub fn send(&self, message: &ServerMessage) -> Result<(), TransportError> {
        let text = message
            .to_json()
            .map_err(|e| TransportError::new(self.inner.id, e.to_string()))?;
        trace!(frame = %text, "Sending frame");
        self.inner
            .outbound
            .send(text)
            .map_err(|_| TransportError::new(self.inner.id, "Outbound channel closed"))
    }

    /// Waits for the next inbound text frame.
    ///
    /// Returns `None` once the transport has closed. Only one caller reads at
    /// a time; others wait their turn. Cancel-safe: dropping the future loses
    /// no frame.
    pub async fn next_frame(&self) -> Option<String> {
        let mut inbound = self.inner.inbound.lock().await;
        inbound.recv().await
    }

    /// Resolves once the transport side has closed.
    pub async fn closed(&self) {
        let mut closed = self.inner.closed.clone();
        // A dropped sender means the transport is gone, which counts as closed.
        let _ = closed.wait_for(|closed| *closed).await;
    }

    /// Returns true if the transport side has closed.
    pub fn is_closed(&self) -> bool {
        *self.inner.closed.borrow()
            || self.inner.closed.has_changed().is_err()
            || self.inner.outbound.is_closed()
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Connection {}

impl TransportEnd {
    /// Feeds one inbound text frame from the client.
    ///
    /// # Errors
    ///
    /// Returns the frame back if the arena side has been dropped.
    pub fn push_frame(&self, text: impl Into<String>) -> Result<(), String> {
        self.inbound.send(text.into()).map_err(|e| e.0)
    }

    /// Waits for the next frame the arena wants delivered to the client.
    pub async fn next_outbound(&mut self) -> Option<String> {
        self.outbound.recv().await
    }

    /// Signals close: the inbound stream ends and [`Connection::closed`]
    /// resolves.
    pub fn close(self) {
        drop(self);
    }

    pub(crate) fn signal_closed(&self) {
        self.close.send_replace(true);
    }
}

impl Drop for TransportEnd {
    fn drop(&mut self) {
        self.signal_closed();
    }
}
