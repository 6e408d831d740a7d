//! Error types for drawmap

use thiserror::Error;

/// Main error type for drawmap operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or mismatched input tables
    #[error("Validation error: {0}")]
    Validation(String),

    /// Non-positive image dimensions or coordinates outside the template
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// A drawn border collapsed to fewer than three distinct UV points
    #[error("Degenerate boundary: only {distinct} distinct UV point(s), need at least 3")]
    DegenerateBoundary { distinct: usize },

    /// Unsupported sex/side mesh selector
    #[error("Unknown mesh: {0:?} (expected male/female x left/right)")]
    UnknownMesh(String),

    /// Operation invoked out of the required session-state order
    #[error("Cannot {operation} while session is {state}")]
    State {
        operation: &'static str,
        state: String,
    },

    /// A batch input produced zero usable rows
    #[error("Empty input: no usable rows ({dropped} dropped)")]
    EmptyInput { dropped: usize },

    /// The external geodesic solver failed
    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for drawmap operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a state error for `operation` attempted in `state`
    pub fn state<S: std::fmt::Display>(operation: &'static str, state: S) -> Self {
        Error::State {
            operation,
            state: state.to_string(),
        }
    }
}
