//! JSON wire protocol between the arena and its browser clients.
//!
//! Every frame is a single JSON object whose `type` field names the variant.

use crate::board::Board;
use crate::types::{Mark, Turn};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Events the server pushes to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// No opponent yet.
    Wait,
    /// A match (re)started; `mark` is the receiving player's symbol.
    NewGame {
        /// Fresh board snapshot.
        desk: Board,
        /// Mark assigned to the receiving player.
        mark: Mark,
    },
    /// The opponent's move was accepted.
    DeskChange {
        /// Board snapshot after the move.
        desk: Board,
    },
    /// The opponent left; the receiver goes back into the queue.
    Disconnect,
}

/// Requests a client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Attempt to claim a cell.
    Turn(Turn),
}

impl ServerMessage {
    /// Encodes the message as a JSON text frame.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::from)
    }

    /// Decodes a JSON text frame.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::from)
    }
}

impl ClientMessage {
    /// Encodes the message as a JSON text frame.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::from)
    }

    /// Decodes a JSON text frame.
    ///
    /// Accepts the tagged form as well as a bare `{"x", "y", "mark"}` object,
    /// which is what older clients send.
    #[instrument(level = "trace")]
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        if text.trim().is_empty() {
            return Err(ProtocolError::new("Empty frame"));
        }
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => Ok(message),
            Err(tagged) => serde_json::from_str::<Turn>(text)
                .map(ClientMessage::Turn)
                .map_err(|_| ProtocolError::from(tagged)),
        }
    }
}

impl From<Turn> for ClientMessage {
    fn from(turn: Turn) -> Self {
        ClientMessage::Turn(turn)
    }
}

/// Frame could not be encoded or decoded.
#[derive(Debug, Clone, Display, Error)]
#[display("Protocol error: {} at {}:{}", message, file, line)]
pub struct ProtocolError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ProtocolError {
    /// Creates a new protocol error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<serde_json::Error> for ProtocolError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Crossing;

    #[test]
    fn test_wait_is_tag_only() {
        assert_eq!(ServerMessage::Wait.to_json().unwrap(), r#"{"type":"Wait"}"#);
        assert_eq!(
            ServerMessage::Disconnect.to_json().unwrap(),
            r#"{"type":"Disconnect"}"#
        );
    }

    #[test]
    fn test_new_game_snapshot_fields() {
        let message = ServerMessage::NewGame {
            desk: Board::new(Mark::Crosses),
            mark: Mark::Noughts,
        };
        let value: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();

        assert_eq!(value["type"], "NewGame");
        assert_eq!(value["mark"], "NOUGHTS");
        assert_eq!(value["desk"]["activePlayer"], "CROSSES");
        assert_eq!(value["desk"]["winner"], "EMPTY");
        assert_eq!(value["desk"]["turnCounter"], 0);
        assert_eq!(value["desk"]["grid"][2][2], "EMPTY");
        assert_eq!(value["desk"]["crossing"][0][0], "NONE");
    }

    #[test]
    fn test_desk_change_decodes_annotations() {
        let mut desk = Board::new(Mark::Crosses);
        for turn in [
            Turn::new(0, 0, Mark::Crosses),
            Turn::new(1, 0, Mark::Noughts),
            Turn::new(1, 1, Mark::Crosses),
            Turn::new(2, 0, Mark::Noughts),
            Turn::new(2, 2, Mark::Crosses),
        ] {
            assert!(desk.apply_turn(turn));
        }
        let text = ServerMessage::DeskChange { desk: desk.clone() }.to_json().unwrap();

        match ServerMessage::from_json(&text).unwrap() {
            ServerMessage::DeskChange { desk: decoded } => {
                assert_eq!(decoded, desk);
                assert_eq!(decoded.crossing_at(1, 1), Crossing::DiagonalUpDown);
            }
            other => panic!("Unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_tagged_turn_decodes() {
        let message = ClientMessage::from_json(r#"{"type":"Turn","x":1,"y":2,"mark":"CROSSES"}"#)
            .unwrap();
        assert_eq!(message, ClientMessage::Turn(Turn::new(1, 2, Mark::Crosses)));
    }

    #[test]
    fn test_bare_turn_decodes() {
        let message = ClientMessage::from_json(r#"{"x":0,"y":0,"mark":"NOUGHTS"}"#).unwrap();
        assert_eq!(message, ClientMessage::Turn(Turn::new(0, 0, Mark::Noughts)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(ClientMessage::from_json("").is_err());
        assert!(ClientMessage::from_json("not json").is_err());
        assert!(ClientMessage::from_json(r#"{"type":"Resign"}"#).is_err());
        assert!(ClientMessage::from_json(r#"{"x":0,"y":0,"mark":"TRIANGLES"}"#).is_err());
    }
}
