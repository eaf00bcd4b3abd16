use crate::board::Color;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board needs positive dimensions, got {columns}x{rows} with {num_colors} colors")]
    InvalidDimensions {
        columns: usize,
        rows: usize,
        num_colors: Color,
    },
    #[error("cell ({x}, {y}) is outside the {columns}x{rows} board")]
    OutOfRange {
        x: usize,
        y: usize,
        columns: usize,
        rows: usize,
    },
    #[error("color {color} is outside [1, {num_colors}]")]
    InvalidColor { color: Color, num_colors: Color },
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("missing line: {0}")]
    MissingLine(&'static str),
    #[error("empty response")]
    Empty,
    #[error("'{0}' is not a base-10 integer")]
    NotANumber(String),
    #[error("{line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("origin coordinates are 1-based")]
    ZeroOrigin,
    #[error("{0} trailing line(s) after the grid")]
    TrailingLines(usize),
    #[error("invalid frame contents: {0}")]
    Board(#[from] BoardError),
}
