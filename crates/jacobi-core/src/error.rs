//! Error types for matrix construction.

use thiserror::Error;

/// Errors raised while building a linear system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A system with zero equations was requested.
    #[error("Linear system has no equations")]
    EmptySystem,

    /// Dimensions do not match.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
