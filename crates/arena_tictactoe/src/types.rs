//! Core domain types for tic-tac-toe.

use derive_new::new;
use serde::{Deserialize, Serialize};

/// Side length of the square grid.
pub const GRID_SIZE: usize = 3;

/// Number of cells on the grid.
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Content of a cell, or the symbol a player plays with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mark {
    /// Player O.
    Noughts,
    /// Player X.
    Crosses,
    /// No mark.
    #[default]
    Empty,
}

impl Mark {
    /// Picks one of the two player marks with equal probability.
    pub fn random() -> Self {
        if rand::random::<bool>() {
            Mark::Noughts
        } else {
            Mark::Crosses
        }
    }

    /// Returns the opposing player's mark.
    ///
    /// # Panics
    ///
    /// Panics when called on [`Mark::Empty`]: an empty cell has no opponent,
    /// so reaching this is a bug in the caller.
    pub fn change(self) -> Self {
        match self {
            Mark::Noughts => Mark::Crosses,
            Mark::Crosses => Mark::Noughts,
            Mark::Empty => panic!("an empty mark has no opponent"),
        }
    }

    /// Returns true for [`Mark::Empty`].
    pub fn is_empty(self) -> bool {
        self == Mark::Empty
    }

    /// Character used when rendering the mark.
    pub fn code(self) -> char {
        match self {
            Mark::Noughts => 'O',
            Mark::Crosses => 'X',
            Mark::Empty => ' ',
        }
    }
}

/// Annotation on a cell that belongs to the winning line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Crossing {
    /// Not part of a winning line.
    #[default]
    None,
    /// Part of a winning row.
    Horizontal,
    /// Part of a winning column.
    Vertical,
    /// Part of the (0,0)-(2,2) diagonal.
    DiagonalUpDown,
    /// Part of the (2,0)-(0,2) diagonal.
    DiagonalDownUp,
}

/// A request to place `mark` at `(x, y)`.
///
/// Coordinates are signed so that anything a client sends is representable;
/// out-of-range values are simply illegal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Turn {
    /// Row index.
    pub x: i32,
    /// Column index.
    pub y: i32,
    /// Mark of the player claiming the cell.
    pub mark: Mark,
}

impl Turn {
    /// Placeholder for "no move". Never legal.
    pub const INVALID: Turn = Turn {
        x: -1,
        y: -1,
        mark: Mark::Empty,
    };

    /// Returns the grid cell addressed by this turn, if it is on the board.
    pub fn cell(&self) -> Option<(usize, usize)> {
        let x = usize::try_from(self.x).ok()?;
        let y = usize::try_from(self.y).ok()?;
        (x < GRID_SIZE && y < GRID_SIZE).then_some((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_flips_players() {
        assert_eq!(Mark::Noughts.change(), Mark::Crosses);
        assert_eq!(Mark::Crosses.change(), Mark::Noughts);
    }

    #[test]
    #[should_panic(expected = "no opponent")]
    fn test_change_on_empty_panics() {
        let _ = Mark::Empty.change();
    }

    #[test]
    fn test_random_is_never_empty() {
        for _ in 0..64 {
            assert!(!Mark::random().is_empty());
        }
    }

    #[test]
    fn test_mark_wire_names() {
        use strum::IntoEnumIterator;

        let names: Vec<String> = Mark::iter()
            .map(|mark| serde_json::to_string(&mark).unwrap())
            .collect();
        assert_eq!(names, [r#""NOUGHTS""#, r#""CROSSES""#, r#""EMPTY""#]);
    }

    #[test]
    fn test_turn_cell_bounds() {
        assert_eq!(Turn::new(0, 2, Mark::Crosses).cell(), Some((0, 2)));
        assert_eq!(Turn::new(3, 0, Mark::Crosses).cell(), None);
        assert_eq!(Turn::new(0, -1, Mark::Crosses).cell(), None);
        assert_eq!(Turn::INVALID.cell(), None);
    }
}
