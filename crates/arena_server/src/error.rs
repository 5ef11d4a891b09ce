//! Transport error types.

use crate::connection::ConnectionId;
use derive_more::{Display, Error};
use tracing::instrument;

/// A peer could not be reached.
///
/// Carries the id of the connection that failed so callers can treat the
/// fault as that peer disconnecting.
#[derive(Debug, Clone, Display, Error)]
#[display("Transport error on {}: {} at {}:{}", connection, message, file, line)]
pub struct TransportError {
    /// Connection that failed.
    pub connection: ConnectionId,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl TransportError {
    /// Creates a new transport error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(connection: ConnectionId, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            connection,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
