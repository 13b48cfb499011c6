//! Parallel Jacobi iteration for dense linear systems.
//!
//! This crate provides:
//! - One synchronous sweep of N concurrent lanes over a shared snapshot
//!   ([`parallel_update_step`], [`JacobiIteration`])
//! - A lock-free convergence accumulator combined by every lane
//!   ([`ConvergenceAccumulator`])
//! - Pluggable lane dispatch: sequential, rayon, or scoped threads
//!   ([`LaneDispatcher`], [`DispatchConfig`])
//! - A convergence loop driving sweeps until epsilon drops below tolerance
//!   ([`JacobiSolver`])
//! - Independent host-side residual checking ([`Verifier`])
//!
//! # Example
//!
//! ```
//! use jacobi_core::AugmentedMatrix;
//! use jacobi_solver::{DispatchConfig, JacobiConfig, JacobiSolver, Verifier};
//!
//! let system = AugmentedMatrix::from_rows(&[vec![4.0, 1.0, 1.0], vec![1.0, 3.0, 9.0]])?;
//! let solver = JacobiSolver::with_dispatch(JacobiConfig::default(), &DispatchConfig::rayon())?;
//! let result = solver.solve(&system)?;
//!
//! assert!(result.converged());
//! assert!(Verifier::default().passes(&system, &result.solution)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod accumulator;
pub mod dispatch;
pub mod error;
pub mod solver;
pub mod sweep;
pub mod verify;

pub use accumulator::{ConvergenceAccumulator, Reduction};
pub use dispatch::{
    BackendType, DispatchConfig, LaneDispatcher, RayonDispatcher, SequentialDispatcher,
    ThreadDispatcher,
};
pub use error::{Error, Result};
pub use solver::{JacobiConfig, JacobiResult, JacobiSolver, LoopState};
pub use sweep::{JacobiIteration, lane_update, parallel_update_step};
pub use verify::{VerificationReport, Verifier, VerifyMode};
