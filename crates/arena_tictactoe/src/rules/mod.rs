//! Game rules for tic-tac-toe.
//!
//! Pure functions over the raw grid, kept apart from [`Board`](crate::Board)
//! so the mutation path and the evaluation path can be tested on their own.

pub mod draw;
pub mod win;

pub use draw::is_draw;
pub use win::{WinningLine, find_winning_line};
