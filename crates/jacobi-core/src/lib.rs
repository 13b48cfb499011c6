//! Core data structures for the Jacobi solver.
//!
//! This crate provides:
//! - [`Real`]: the floating-point abstraction the kernel is generic over
//! - [`AugmentedMatrix`]: an N x (N+1) coefficient matrix with the RHS in the last column
//! - [`DominantGenerator`]: seeded synthesis of strictly diagonally dominant systems

pub mod error;
pub mod generate;
pub mod matrix;
pub mod real;

pub use error::{Error, Result};
pub use generate::{DominantGenerator, MatrixSource};
pub use matrix::AugmentedMatrix;
pub use real::Real;
