//! Augmented coefficient matrix `[A | b]`.

use nalgebra::{DMatrix, DVector};
use std::fmt;

use crate::error::{Error, Result};
use crate::real::Real;

/// An N x (N+1) linear system: columns `0..N` hold the coefficients and
/// column `N` holds the right-hand side.
///
/// The matrix is immutable once built. Construction validates shape only;
/// diagonal dominance is the producer's responsibility and can be queried
/// with [`AugmentedMatrix::is_diagonally_dominant`].
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedMatrix<T: Real> {
    data: DMatrix<T>,
}

impl<T: Real> AugmentedMatrix<T> {
    /// Build from row vectors, each of length N+1.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(Error::EmptySystem);
        }
        if let Some(row) = rows.iter().find(|row| row.len() != n + 1) {
            return Err(Error::DimensionMismatch {
                expected: n + 1,
                actual: row.len(),
            });
        }

        Ok(Self {
            data: DMatrix::from_fn(n, n + 1, |i, j| rows[i][j]),
        })
    }

    /// Build from a square coefficient matrix and a right-hand side.
    pub fn from_parts(a: &DMatrix<T>, b: &DVector<T>) -> Result<Self> {
        let n = a.nrows();
        if n == 0 {
            return Err(Error::EmptySystem);
        }
        if a.ncols() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                actual: a.ncols(),
            });
        }
        if b.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                actual: b.len(),
            });
        }

        Ok(Self {
            data: DMatrix::from_fn(n, n + 1, |i, j| if j < n { a[(i, j)] } else { b[i] }),
        })
    }

    /// Build an N-equation system from a function of `(row, col)`, where
    /// `col == n` addresses the right-hand side.
    pub fn from_fn(n: usize, f: impl FnMut(usize, usize) -> T) -> Result<Self> {
        if n == 0 {
            return Err(Error::EmptySystem);
        }
        Ok(Self {
            data: DMatrix::from_fn(n, n + 1, f),
        })
    }

    /// Wrap storage already known to be N x (N+1) with N >= 1.
    pub(crate) fn from_storage(data: DMatrix<T>) -> Self {
        debug_assert!(data.nrows() >= 1 && data.ncols() == data.nrows() + 1);
        Self { data }
    }

    /// Number of equations (and unknowns).
    #[inline]
    pub fn size(&self) -> usize {
        self.data.nrows()
    }

    /// Coefficient `A[i][j]`.
    #[inline]
    pub fn coefficient(&self, i: usize, j: usize) -> T {
        self.data[(i, j)]
    }

    /// Right-hand side `b[i]`.
    #[inline]
    pub fn rhs(&self, i: usize) -> T {
        self.data[(i, self.size())]
    }

    /// Diagonal coefficient `A[i][i]`.
    #[inline]
    pub fn diagonal(&self, i: usize) -> T {
        self.data[(i, i)]
    }

    /// Copy of the N x N coefficient block.
    pub fn coefficients(&self) -> DMatrix<T> {
        self.data.columns(0, self.size()).into_owned()
    }

    /// Copy of the right-hand side column.
    pub fn rhs_vector(&self) -> DVector<T> {
        self.data.column(self.size()).into_owned()
    }

    /// The full augmented storage.
    pub fn as_matrix(&self) -> &DMatrix<T> {
        &self.data
    }

    /// Sum of `|A[i][j]|` over `j != i`.
    pub fn off_diagonal_magnitude(&self, i: usize) -> T {
        (0..self.size())
            .filter(|&j| j != i)
            .fold(T::zero(), |acc, j| acc + self.coefficient(i, j).abs())
    }

    /// Rows whose diagonal does not strictly dominate the off-diagonal sum.
    pub fn dominance_violations(&self) -> Vec<usize> {
        (0..self.size())
            .filter(|&i| self.diagonal(i).abs() <= self.off_diagonal_magnitude(i))
            .collect()
    }

    /// Whether every row is strictly diagonally dominant, which guarantees
    /// Jacobi convergence.
    pub fn is_diagonally_dominant(&self) -> bool {
        self.dominance_violations().is_empty()
    }
}

impl<T: Real> fmt::Display for AugmentedMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.data.nrows() {
            for j in 0..self.data.ncols() {
                write!(f, "{}\t", self.data[(i, j)])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
