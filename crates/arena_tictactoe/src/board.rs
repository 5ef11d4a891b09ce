//! The mutable game state shared by two players.

use crate::rules::{self, win::Grid};
use crate::types::{Crossing, GRID_SIZE, Mark, Turn};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// 3x3 tic-tac-toe board with winning-line annotations.
///
/// All mutation goes through [`Board::apply_turn`], which keeps the turn
/// counter equal to the number of occupied cells and freezes the board once a
/// winner is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    grid: Grid,
    crossing: [[Crossing; GRID_SIZE]; GRID_SIZE],
    active_player: Mark,
    winner: Mark,
    turn_counter: usize,
}

impl Board {
    /// Creates an empty board where `active_player` moves first.
    pub fn new(active_player: Mark) -> Self {
        debug_assert!(!active_player.is_empty(), "active player must be a real mark");
        Self {
            grid: [[Mark::Empty; GRID_SIZE]; GRID_SIZE],
            crossing: [[Crossing::None; GRID_SIZE]; GRID_SIZE],
            active_player,
            winner: Mark::Empty,
            turn_counter: 0,
        }
    }

    /// Creates an empty board with a randomly chosen first player.
    pub fn random() -> Self {
        Self::new(Mark::random())
    }

    /// Returns true if `turn` may be applied right now.
    pub fn legal(&self, turn: &Turn) -> bool {
        self.winner.is_empty()
            && !turn.mark.is_empty()
            && turn.mark == self.active_player
            && turn
                .cell()
                .is_some_and(|(x, y)| self.grid[x][y].is_empty())
    }

    /// Applies `turn` if it is legal.
    ///
    /// Returns false and leaves the board untouched otherwise. On success the
    /// cell is claimed, the counter advances, win detection runs, and the
    /// active player flips.
    #[instrument(level = "debug", skip(self), fields(active = ?self.active_player))]
    pub fn apply_turn(&mut self, turn: Turn) -> bool {
        if !self.legal(&turn) {
            debug!("Rejected illegal turn");
            return false;
        }
        let Some((x, y)) = turn.cell() else {
            return false;
        };

        self.grid[x][y] = self.active_player;
        self.turn_counter += 1;
        self.check_winner();
        self.active_player = self.active_player.change();
        true
    }

    fn check_winner(&mut self) {
        if let Some(line) = rules::find_winning_line(&self.grid) {
            for (x, y) in line.cells {
                self.crossing[x][y] = line.crossing;
            }
            self.winner = line.mark;
            debug!(winner = ?line.mark, crossing = ?line.crossing, "Winning line found");
        }
    }

    /// Mark whose turn it is.
    pub fn active_player(&self) -> Mark {
        self.active_player
    }

    /// Winning mark, or [`Mark::Empty`] while undecided.
    pub fn winner(&self) -> Mark {
        self.winner
    }

    /// Number of accepted turns.
    pub fn turn_counter(&self) -> usize {
        self.turn_counter
    }

    /// True when the board is full and nobody won.
    pub fn is_draw(&self) -> bool {
        rules::is_draw(self.winner, self.turn_counter)
    }

    /// True once the game has a winner or is drawn.
    pub fn is_finished(&self) -> bool {
        !self.winner.is_empty() || self.is_draw()
    }

    /// Mark at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if either coordinate is not below [`GRID_SIZE`].
    pub fn cell(&self, x: usize, y: usize) -> Mark {
        self.grid[x][y]
    }

    /// Winning-line annotation at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if either coordinate is not below [`GRID_SIZE`].
    pub fn crossing_at(&self, x: usize, y: usize) -> Crossing {
        self.crossing[x][y]
    }

    /// Marks indexed `[x][y]`.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Annotations indexed `[x][y]`.
    pub fn crossings(&self) -> &[[Crossing; GRID_SIZE]; GRID_SIZE] {
        &self.crossing
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        self.grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|mark| mark.code().to_string())
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect::<Vec<_>>()
            .join("\n-+-+-\n")
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::random()
    }
}
