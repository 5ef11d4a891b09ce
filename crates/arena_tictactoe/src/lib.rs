//! Tic-tac-toe rules and wire protocol for the matchmaking arena.
//!
//! This crate has no I/O and no async: it is the rules engine ([`Board`]) and
//! the JSON envelope ([`ServerMessage`], [`ClientMessage`]) that the server
//! and its clients exchange.
//!
//! # Example
//!
//! ```
//! use arena_tictactoe::{Board, Mark, Turn};
//!
//! let mut board = Board::new(Mark::Crosses);
//! assert!(board.apply_turn(Turn::new(1, 1, Mark::Crosses)));
//! assert!(!board.apply_turn(Turn::new(1, 1, Mark::Noughts)));
//! assert_eq!(board.active_player(), Mark::Noughts);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
pub mod protocol;
pub mod rules;
mod types;

pub use board::Board;
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};
pub use rules::WinningLine;
pub use types::{CELL_COUNT, Crossing, GRID_SIZE, Mark, Turn};
