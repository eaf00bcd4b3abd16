//! The colored grid and the flood-fill mutation.
//!
//! Cells are stored in a flat vector indexed by `y * columns + x`. Every cell
//! holds a color in `[1, num_colors]` from construction onwards, and the only
//! way to change a cell is [`Board::flood_fill`].

use crate::error::BoardError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a color on the board, valid values are `1..=num_colors`
pub type Color = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    columns: usize,
    rows: usize,
    num_colors: Color,
    cells: Vec<Color>,
}

/// Immutable copy of the board for renderers and reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub columns: usize,
    pub rows: usize,
    pub num_colors: Color,
    /// Row-major cell colors
    pub cells: Vec<Color>,
}

impl BoardSnapshot {
    pub fn color_at(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.columns || y >= self.rows {
            return None;
        }
        self.cells.get(y * self.columns + x).copied()
    }
}

impl Board {
    /// Creates a board with uniformly random colors using the thread-local RNG
    pub fn new(columns: usize, rows: usize, num_colors: Color) -> Result<Self, BoardError> {
        Self::with_rng(columns, rows, num_colors, &mut rand::thread_rng())
    }

    /// Creates a board with every cell drawn independently from `[1, num_colors]`
    pub fn with_rng<R: Rng + ?Sized>(
        columns: usize,
        rows: usize,
        num_colors: Color,
        rng: &mut R,
    ) -> Result<Self, BoardError> {
        if columns == 0 || rows == 0 || num_colors == 0 {
            return Err(BoardError::InvalidDimensions {
                columns,
                rows,
                num_colors,
            });
        }

        let cells = (0..columns * rows)
            .map(|_| rng.gen_range(1..=num_colors))
            .collect();

        Ok(Self {
            columns,
            rows,
            num_colors,
            cells,
        })
    }

    /// Builds a board from explicit row contents.
    ///
    /// `rows[y][x]` is the color of cell `(x, y)`. All rows must have the same
    /// non-zero length and every color must be within `[1, num_colors]`.
    pub fn from_rows(num_colors: Color, rows: &[Vec<Color>]) -> Result<Self, BoardError> {
        let columns = rows.first().map(|row| row.len()).unwrap_or(0);
        if columns == 0 || num_colors == 0 {
            return Err(BoardError::InvalidDimensions {
                columns,
                rows: rows.len(),
                num_colors,
            });
        }

        let mut cells = Vec::with_capacity(columns * rows.len());
        for (y, row) in rows.iter().enumerate() {
            if row.len() != columns {
                return Err(BoardError::RaggedRow {
                    row: y,
                    expected: columns,
                    found: row.len(),
                });
            }
            for &color in row {
                if color < 1 || color > num_colors {
                    return Err(BoardError::InvalidColor { color, num_colors });
                }
                cells.push(color);
            }
        }

        Ok(Self {
            columns,
            rows: rows.len(),
            num_colors,
            cells,
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn num_colors(&self) -> Color {
        self.num_colors
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if `color` is a legal cell value for this board
    pub fn is_valid_color(&self, color: Color) -> bool {
        (1..=self.num_colors).contains(&color)
    }

    pub fn color_at(&self, x: usize, y: usize) -> Result<Color, BoardError> {
        self.index(x, y)
            .map(|i| self.cells[i])
            .ok_or(BoardError::OutOfRange {
                x,
                y,
                columns: self.columns,
                rows: self.rows,
            })
    }

    /// Recolors the 4-connected region of equal color containing `(x, y)`.
    ///
    /// Returns the number of recolored cells. Choosing the region's current
    /// color changes nothing and returns 0. The traversal uses an explicit
    /// stack, so region size is bounded only by memory.
    pub fn flood_fill(&mut self, x: usize, y: usize, target: Color) -> Result<usize, BoardError> {
        if !self.is_valid_color(target) {
            return Err(BoardError::InvalidColor {
                color: target,
                num_colors: self.num_colors,
            });
        }

        let old = self.color_at(x, y)?;
        if old == target {
            return Ok(0);
        }

        let mut recolored = 0;
        let mut stack = vec![(x, y)];

        // A cell is recolored when pushed, so it no longer matches `old`
        // and cannot be pushed twice.
        self.cells[y * self.columns + x] = target;
        recolored += 1;

        while let Some((cx, cy)) = stack.pop() {
            for (nx, ny) in self.neighbors(cx, cy) {
                let i = ny * self.columns + nx;
                if self.cells[i] == old {
                    self.cells[i] = target;
                    recolored += 1;
                    stack.push((nx, ny));
                }
            }
        }

        Ok(recolored)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            columns: self.columns,
            rows: self.rows,
            num_colors: self.num_colors,
            cells: self.cells.clone(),
        }
    }

    /// Iterates the cells of row `y` from left to right
    pub fn row(&self, y: usize) -> impl Iterator<Item = Color> + '_ {
        self.cells[y * self.columns..(y + 1) * self.columns]
            .iter()
            .copied()
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.columns && y < self.rows).then(|| y * self.columns + x)
    }

    fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
        let (columns, rows) = (self.columns, self.rows);
        [
            x.checked_sub(1).map(|nx| (nx, y)),
            y.checked_sub(1).map(|ny| (x, ny)),
            (x + 1 < columns).then(|| (x + 1, y)),
            (y + 1 < rows).then(|| (x, y + 1)),
        ]
        .into_iter()
        .flatten()
    }
}

/// Grid dump: one line per row, cells separated by a single space
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.rows {
            if y > 0 {
                writeln!(f)?;
            }
            for (x, color) in self.row(y).enumerate() {
                if x > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", color)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    /// Builds a board from column-major contents, `columns[x][y]`
    fn from_columns(num_colors: Color, columns: &[Vec<Color>]) -> Board {
        let rows = columns[0].len();
        let rows: Vec<Vec<Color>> = (0..rows)
            .map(|y| columns.iter().map(|column| column[y]).collect())
            .collect();
        Board::from_rows(num_colors, &rows).unwrap()
    }

    /// Reference component search used to check flood results
    fn component(board: &Board, x: usize, y: usize) -> HashSet<(usize, usize)> {
        let color = board.color_at(x, y).unwrap();
        let mut seen = HashSet::new();
        let mut queue = vec![(x, y)];
        while let Some((cx, cy)) = queue.pop() {
            if !seen.insert((cx, cy)) {
                continue;
            }
            for (nx, ny) in board.neighbors(cx, cy) {
                if board.color_at(nx, ny).unwrap() == color {
                    queue.push((nx, ny));
                }
            }
        }
        seen
    }

    #[test]
    fn test_board_creation() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = Board::with_rng(12, 8, 5, &mut rng).unwrap();

        assert_eq!(board.columns(), 12);
        assert_eq!(board.rows(), 8);
        assert_eq!(board.num_colors(), 5);
        assert_eq!(board.cell_count(), 96);
        for y in 0..8 {
            for x in 0..12 {
                let color = board.color_at(x, y).unwrap();
                assert!((1..=5).contains(&color));
            }
        }
    }

    #[test]
    fn test_board_rejects_zero_dimensions() {
        assert!(matches!(
            Board::new(0, 4, 3),
            Err(BoardError::InvalidDimensions { columns: 0, .. })
        ));
        assert!(Board::new(4, 0, 3).is_err());
        assert!(Board::new(4, 4, 0).is_err());
    }

    #[test]
    fn test_from_rows_validation() {
        assert!(matches!(
            Board::from_rows(3, &[vec![1, 2], vec![3]]),
            Err(BoardError::RaggedRow { row: 1, .. })
        ));
        assert!(matches!(
            Board::from_rows(3, &[vec![1, 4]]),
            Err(BoardError::InvalidColor { color: 4, .. })
        ));
        assert!(Board::from_rows(3, &[]).is_err());
    }

    #[test]
    fn test_color_at_out_of_range() {
        let board = Board::from_rows(2, &[vec![1, 2], vec![2, 1]]).unwrap();
        assert_eq!(board.color_at(1, 0).unwrap(), 2);
        assert!(matches!(
            board.color_at(2, 0),
            Err(BoardError::OutOfRange { x: 2, y: 0, .. })
        ));
        assert!(board.color_at(0, 2).is_err());
    }

    #[test]
    fn test_flood_fill_scenario() {
        // columns-outer: cell (x, y) = grid[x][y]
        let mut board = from_columns(5, &[vec![1, 2, 1], vec![2, 2, 1], vec![1, 1, 2]]);

        let recolored = board.flood_fill(1, 1, 5).unwrap();

        assert_eq!(recolored, 3);
        assert_eq!(board.color_at(1, 1).unwrap(), 5);
        assert_eq!(board.color_at(0, 1).unwrap(), 5);
        assert_eq!(board.color_at(1, 0).unwrap(), 5);
        // Not 4-connected to (1, 1)
        assert_eq!(board.color_at(2, 2).unwrap(), 2);
        for (x, y) in [(0, 0), (0, 2), (2, 0), (1, 2), (2, 1)] {
            assert_eq!(board.color_at(x, y).unwrap(), 1);
        }
    }

    #[test]
    fn test_flood_fill_same_color_is_noop() {
        let mut rng = StdRng::seed_from_u64(42);
        let board = Board::with_rng(9, 7, 4, &mut rng).unwrap();

        for y in 0..board.rows() {
            for x in 0..board.columns() {
                let mut copy = board.clone();
                let color = copy.color_at(x, y).unwrap();
                assert_eq!(copy.flood_fill(x, y, color).unwrap(), 0);
                assert_eq!(copy, board);
            }
        }
    }

    #[test]
    fn test_flood_fill_changes_exactly_the_component() {
        let mut rng = StdRng::seed_from_u64(1234);

        for _ in 0..50 {
            let board = Board::with_rng(10, 6, 3, &mut rng).unwrap();
            let x = rng.gen_range(0..10);
            let y = rng.gen_range(0..6);
            let old = board.color_at(x, y).unwrap();
            let target = old % 3 + 1;
            let region = component(&board, x, y);

            let mut filled = board.clone();
            let recolored = filled.flood_fill(x, y, target).unwrap();

            assert_eq!(recolored, region.len());
            for cy in 0..6 {
                for cx in 0..10 {
                    let after = filled.color_at(cx, cy).unwrap();
                    if region.contains(&(cx, cy)) {
                        assert_eq!(after, target);
                    } else {
                        assert_eq!(after, board.color_at(cx, cy).unwrap());
                    }
                }
            }
        }
    }

    #[test]
    fn test_flood_fill_rejects_invalid_target() {
        let mut board = Board::from_rows(3, &[vec![1, 1], vec![2, 3]]).unwrap();
        let before = board.clone();

        assert!(matches!(
            board.flood_fill(0, 0, 0),
            Err(BoardError::InvalidColor { color: 0, .. })
        ));
        assert!(board.flood_fill(0, 0, 4).is_err());
        assert!(board.flood_fill(5, 0, 2).is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn test_flood_fill_whole_board() {
        let rows = vec![vec![2; 300]; 300];
        let mut board = Board::from_rows(2, &rows).unwrap();

        assert_eq!(board.flood_fill(150, 150, 1).unwrap(), 90_000);
        assert!(board.snapshot().cells.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_display_grid_dump() {
        let board = Board::from_rows(3, &[vec![1, 2, 3], vec![3, 2, 1]]).unwrap();
        assert_eq!(board.to_string(), "1 2 3\n3 2 1");
    }

    #[test]
    fn test_snapshot_serialization() {
        let board = Board::from_rows(4, &[vec![1, 4], vec![2, 3]]).unwrap();
        let snapshot = board.snapshot();

        assert_eq!(snapshot.color_at(1, 0), Some(4));
        assert_eq!(snapshot.color_at(0, 1), Some(2));
        assert_eq!(snapshot.color_at(2, 0), None);

        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: BoardSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snapshot);
    }
}
