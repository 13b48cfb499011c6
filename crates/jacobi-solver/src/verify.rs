//! Host-side residual verification.
//!
//! Recomputes `A x` row by row on the calling thread, independent of the
//! parallel sweep path, and checks each row against its right-hand side.

use nalgebra::DVector;

use jacobi_core::{AugmentedMatrix, Real};

use crate::error::{Error, Result};

/// How the per-row residual bound is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyMode {
    /// `|r_i| <= tol * (N + 1) * (sum_j |A[i][j] x[j]| + |b[i]|)`.
    ///
    /// This is the rounding bound for an N-term dot product against `b`;
    /// it accepts any solution that is exact up to floating-point error.
    #[default]
    Scaled,
    /// `|r_i| <= tol`, the literal residual contract. Rejects correct
    /// answers whose rows round to a few ulps above `tol`.
    Absolute,
}

/// Per-row outcome of a verification pass.
#[derive(Debug, Clone)]
pub struct VerificationReport<T: Real> {
    /// Whether every row is within its bound.
    pub passed: bool,
    /// `|sum_j A[i][j] x[j] - b[i]|` per row.
    pub residuals: Vec<T>,
    /// Acceptance bound per row.
    pub bounds: Vec<T>,
    /// Row with the largest residual.
    pub worst_row: usize,
}

impl<T: Real> VerificationReport<T> {
    /// Largest residual over all rows.
    pub fn max_residual(&self) -> T {
        self.residuals[self.worst_row]
    }

    /// Rows that failed their bound.
    pub fn failed_rows(&self) -> Vec<usize> {
        self.residuals
            .iter()
            .zip(self.bounds.iter())
            .enumerate()
            .filter(|(_, (r, b))| !within_bound(**r, **b))
            .map(|(i, _)| i)
            .collect()
    }
}

/// A residual passes only when finite: an infinite solution entry makes the
/// scaled bound infinite too.
fn within_bound<T: Real>(residual: T, bound: T) -> bool {
    residual.is_finite() && residual <= bound
}

/// Residual verifier.
#[derive(Debug, Clone, Copy)]
pub struct Verifier<T: Real> {
    tolerance: T,
    mode: VerifyMode,
}

impl<T: Real> Default for Verifier<T> {
    fn default() -> Self {
        Self::new(T::tolerance())
    }
}

impl<T: Real> Verifier<T> {
    /// Create a verifier using `tolerance` in [`VerifyMode::Scaled`] mode.
    pub fn new(tolerance: T) -> Self {
        Self {
            tolerance,
            mode: VerifyMode::Scaled,
        }
    }

    /// Set the mode.
    pub fn with_mode(mut self, mode: VerifyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Tolerance in use.
    pub fn tolerance(&self) -> T {
        self.tolerance
    }

    /// Mode in use.
    pub fn mode(&self) -> VerifyMode {
        self.mode
    }

    /// Check `solution` against every equation of `matrix`.
    ///
    /// A non-finite residual never passes.
    pub fn verify(
        &self,
        matrix: &AugmentedMatrix<T>,
        solution: &DVector<T>,
    ) -> Result<VerificationReport<T>> {
        let n = matrix.size();
        if solution.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                actual: solution.len(),
            });
        }

        let mut residuals = Vec::with_capacity(n);
        let mut bounds = Vec::with_capacity(n);
        for i in 0..n {
            let mut sum = T::zero();
            let mut magnitude = T::zero();
            for j in 0..n {
                let term = matrix.coefficient(i, j) * solution[j];
                sum = sum + term;
                magnitude = magnitude + term.abs();
            }
            let b = matrix.rhs(i);
            residuals.push((sum - b).abs());
            bounds.push(match self.mode {
                VerifyMode::Absolute => self.tolerance,
                VerifyMode::Scaled => {
                    let terms = T::lossy_from_f64((n + 1) as f64);
                    self.tolerance * terms * (magnitude + b.abs())
                }
            });
        }

        let mut worst_row = 0;
        for (i, &r) in residuals.iter().enumerate() {
            if r > residuals[worst_row] || r.is_nan() {
                worst_row = i;
            }
        }

        let passed = residuals
            .iter()
            .zip(bounds.iter())
            .all(|(&r, &b)| within_bound(r, b));
        if !passed {
            log::debug!(
                "verification failed: worst row {} residual {:e} > bound {:e}",
                worst_row,
                residuals[worst_row],
                bounds[worst_row]
            );
        }

        Ok(VerificationReport {
            passed,
            residuals,
            bounds,
            worst_row,
        })
    }

    /// Pass/fail shorthand for [`Verifier::verify`].
    pub fn passes(&self, matrix: &AugmentedMatrix<T>, solution: &DVector<T>) -> Result<bool> {
        Ok(self.verify(matrix, solution)?.passed)
    }
}
