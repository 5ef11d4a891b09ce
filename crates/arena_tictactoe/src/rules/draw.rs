//! Draw detection logic for tic-tac-toe.

use crate::types::{CELL_COUNT, Mark};

/// A game is drawn when every cell is filled and nobody has won.
///
/// This is derived from the winner and the turn counter rather than stored.
pub fn is_draw(winner: Mark, turn_counter: usize) -> bool {
    winner.is_empty() && turn_counter == CELL_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_board_without_winner_is_draw() {
        assert!(is_draw(Mark::Empty, 9));
    }

    #[test]
    fn test_not_draw_if_winner() {
        assert!(!is_draw(Mark::Crosses, 9));
        assert!(!is_draw(Mark::Noughts, 7));
    }

    #[test]
    fn test_partial_board_not_draw() {
        assert!(!is_draw(Mark::Empty, 0));
        assert!(!is_draw(Mark::Empty, 8));
    }
}
