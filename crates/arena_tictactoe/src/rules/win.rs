//! Win detection logic for tic-tac-toe.

use crate::types::{Crossing, GRID_SIZE, Mark};
use tracing::instrument;

/// Grid of marks indexed `[x][y]`.
pub type Grid = [[Mark; GRID_SIZE]; GRID_SIZE];

type Line = (Crossing, [(usize, usize); GRID_SIZE]);

/// A completed line: who owns it, how it is drawn, and which cells it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinningLine {
    /// The uniform mark along the line.
    pub mark: Mark,
    /// Annotation applied to every cell of the line.
    pub crossing: Crossing,
    /// Cells of the line as `(x, y)`.
    pub cells: [(usize, usize); GRID_SIZE],
}

/// Finds the first completed line in fixed priority order.
///
/// Rows are checked first, then columns, then the (0,0)-(2,2) diagonal, then
/// the (2,0)-(0,2) diagonal. Only the first match is reported even if several
/// lines are complete at once.
#[instrument(level = "trace", skip(grid))]
pub fn find_winning_line(grid: &Grid) -> Option<WinningLine> {
    let rows = (0..GRID_SIZE).map(|x| -> Line {
        (Crossing::Horizontal, std::array::from_fn(|y| (x, y)))
    });
    let columns = (0..GRID_SIZE).map(|y| -> Line {
        (Crossing::Vertical, std::array::from_fn(|x| (x, y)))
    });
    let diagonals: [Line; 2] = [
        (Crossing::DiagonalUpDown, std::array::from_fn(|i| (i, i))),
        (
            Crossing::DiagonalDownUp,
            std::array::from_fn(|i| (GRID_SIZE - 1 - i, i)),
        ),
    ];

    rows.chain(columns)
        .chain(diagonals)
        .find_map(|(crossing, cells)| {
            uniform_mark(grid, &cells).map(|mark| WinningLine {
                mark,
                crossing,
                cells,
            })
        })
}

/// Returns the line's mark when every cell holds the same non-empty mark.
fn uniform_mark(grid: &Grid, cells: &[(usize, usize); GRID_SIZE]) -> Option<Mark> {
    let (x0, y0) = cells[0];
    let first = grid[x0][y0];
    if first.is_empty() {
        return None;
    }
    cells
        .iter()
        .all(|&(x, y)| grid[x][y] == first)
        .then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(cells: &[(usize, usize)], mark: Mark) -> Grid {
        let mut grid = [[Mark::Empty; GRID_SIZE]; GRID_SIZE];
        for &(x, y) in cells {
            grid[x][y] = mark;
        }
        grid
    }

    #[test]
    fn test_no_winner_empty_board() {
        let grid = [[Mark::Empty; GRID_SIZE]; GRID_SIZE];
        assert_eq!(find_winning_line(&grid), None);
    }

    #[test]
    fn test_winner_top_row() {
        let grid = grid_with(&[(0, 0), (0, 1), (0, 2)], Mark::Crosses);
        let line = find_winning_line(&grid).unwrap();
        assert_eq!(line.mark, Mark::Crosses);
        assert_eq!(line.crossing, Crossing::Horizontal);
        assert_eq!(line.cells, [(0, 0), (0, 1), (0, 2)]);
    }

    #[test]
    fn test_winner_column() {
        let grid = grid_with(&[(0, 1), (1, 1), (2, 1)], Mark::Noughts);
        let line = find_winning_line(&grid).unwrap();
        assert_eq!(line.crossing, Crossing::Vertical);
        assert_eq!(line.cells, [(0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_anti_diagonal_takes_uniform_mark() {
        let grid = grid_with(&[(2, 0), (1, 1), (0, 2)], Mark::Noughts);
        let line = find_winning_line(&grid).unwrap();
        assert_eq!(line.mark, Mark::Noughts);
        assert_eq!(line.crossing, Crossing::DiagonalDownUp);
        assert_eq!(line.cells, [(2, 0), (1, 1), (0, 2)]);
    }

    #[test]
    fn test_row_beats_column_when_both_complete() {
        let grid = grid_with(&[(0, 0), (0, 1), (0, 2), (1, 0), (2, 0)], Mark::Crosses);
        let line = find_winning_line(&grid).unwrap();
        assert_eq!(line.crossing, Crossing::Horizontal);
    }

    #[test]
    fn test_mixed_line_is_not_a_win() {
        let mut grid = grid_with(&[(0, 0), (0, 1)], Mark::Crosses);
        grid[0][2] = Mark::Noughts;
        assert_eq!(find_winning_line(&grid), None);
    }
}
