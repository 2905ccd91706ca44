use thiserror::Error;

/// A board injected from outside does not fit the 4x4 packed layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("expected 4 rows, got {0}")]
    RowCount(usize),

    #[error("row {row} has {len} cells, expected 4")]
    RowLength { row: usize, len: usize },

    #[error("tile {value} at row {row}, col {col} is not 0 or a power of two in 2..=32768")]
    UnrepresentableTile { row: usize, col: usize, value: u32 },
}

/// Input that does not name one of the four directions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown move {0:?}; expected up, down, left, right or an Arrow key")]
pub struct ParseMoveError(pub String);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("four_probability must be within [0, 1], got {0}")]
    FourProbability(f64),

    #[error("start_tiles must be at most 16, got {0}")]
    StartTiles(usize),
}
