//! Error types for the solver crate

use thiserror::Error;

/// Main error type for the solver crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("unexpected end of input while reading {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("invalid {field} '{token}' (expected a non-negative integer)")]
    InvalidInteger { field: &'static str, token: String },

    #[error("invalid player number {0} (expected 1 or 2)")]
    InvalidPlayer(u32),

    #[error("invalid board dimensions {width}x{height} (both must be positive)")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid minimum line length {0} (must be at least 1)")]
    InvalidMinToWin(usize),

    #[error("invalid cell '{token}' at index {index} (expected 0, 1 or 2)")]
    InvalidCell { token: String, index: usize },

    #[error("cell count mismatch: expected {expected} cells, got {got}")]
    CellCountMismatch { expected: usize, got: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the request loop can skip the offending request and continue
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Io(_) | Error::UnexpectedEof { .. })
    }
}

/// Convenience result type for the solver crate
pub type Result<T> = std::result::Result<T, Error>;
