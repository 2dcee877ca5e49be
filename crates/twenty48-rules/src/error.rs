use thiserror::Error;

/// Errors raised by the board and engine API.
///
/// All of these indicate caller bugs (bad coordinates, a direction code outside
/// the closed set, malformed fixtures); a correctly driven game never sees them.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    #[error("cell ({row}, {col}) is outside the {rows}x{columns} board")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        columns: usize,
    },
    #[error("invalid direction code {0} (expected 0..=3)")]
    InvalidDirection(u8),
    #[error("board dimensions must be at least 1x1, got {rows}x{columns}")]
    EmptyDimensions { rows: usize, columns: usize },
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}
