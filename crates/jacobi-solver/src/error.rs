//! Error types for the Jacobi solver.

use thiserror::Error;

/// Errors that can occur while solving.
///
/// Numeric trouble (a degenerate diagonal, a non-dominant matrix) is not an
/// error: it surfaces as inf/NaN in the solution. Everything here is fatal
/// to the solve that raised it.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid system passed in.
    #[error("Invalid system: {0}")]
    Core(#[from] jacobi_core::Error),

    /// Buffer or initial-guess length does not match the system size.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The requested dispatch backend could not be initialized.
    #[error("Dispatch backend unavailable: {0}")]
    DispatchUnavailable(String),

    /// A parallel wave failed to launch or complete.
    #[error("Parallel dispatch failed: {0}")]
    Dispatch(String),

    /// The optional sweep cap was reached before convergence.
    #[error("Did not converge after {sweeps} sweeps (epsilon: {epsilon:.3e})")]
    NotConverged { sweeps: usize, epsilon: f64 },
}

/// Result type for solver operations.
pub type Result<T> = std::result::Result<T, Error>;
