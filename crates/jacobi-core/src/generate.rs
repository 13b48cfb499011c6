//! Seeded synthesis of diagonally dominant linear systems.
//!
//! The solver never draws random numbers itself; callers inject a
//! [`MatrixSource`] so tests can substitute fixed, literal systems.

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::matrix::AugmentedMatrix;
use crate::real::Real;

/// A pure function from a seed to a linear system.
pub trait MatrixSource<T: Real> {
    /// Produce the system for `seed`. The same seed yields the same system.
    fn generate(&self, seed: u64) -> AugmentedMatrix<T>;
}

impl<T: Real, F> MatrixSource<T> for F
where
    F: Fn(u64) -> AugmentedMatrix<T>,
{
    fn generate(&self, seed: u64) -> AugmentedMatrix<T> {
        self(seed)
    }
}

/// Generator of strictly diagonally dominant N-equation systems.
///
/// Off-diagonal coefficients are `1 + i*j`, each diagonal is twice its row's
/// off-diagonal sum plus N, and right-hand sides are integers drawn
/// uniformly from `[-10N, 10N]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DominantGenerator {
    size: usize,
}

impl DominantGenerator {
    /// Create a generator for systems of `size` equations. A size of zero is
    /// clamped to one.
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    /// Number of equations produced.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl<T: Real> MatrixSource<T> for DominantGenerator {
    fn generate(&self, seed: u64) -> AugmentedMatrix<T> {
        let n = self.size;
        let bound = 10 * n as i64;
        let mut rng = StdRng::seed_from_u64(seed);
        let rhs: Vec<i64> = (0..n).map(|_| rng.random_range(-bound..=bound)).collect();

        let off_sums: Vec<f64> = (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| j != i)
                    .map(|j| (1 + i * j) as f64)
                    .sum()
            })
            .collect();

        let entry = |i: usize, j: usize| -> T {
            let value = if j == n {
                rhs[i] as f64
            } else if j == i {
                2.0 * off_sums[i] + n as f64
            } else {
                (1 + i * j) as f64
            };
            T::lossy_from_f64(value)
        };

        AugmentedMatrix::from_storage(DMatrix::from_fn(n, n + 1, entry))
    }
}
