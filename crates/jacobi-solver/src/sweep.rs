//! One synchronous Jacobi sweep.
//!
//! Every lane reads the same pre-sweep snapshot and writes only its own slot
//! of a second buffer, so lanes never observe each other's new values within
//! a sweep. The buffers are swapped once the whole wave has finished.

use nalgebra::DVector;

use jacobi_core::{AugmentedMatrix, Real};

use crate::accumulator::{ConvergenceAccumulator, Reduction};
use crate::dispatch::LaneDispatcher;
use crate::error::{Error, Result};

/// Jacobi update for unknown `i`:
/// `(b[i] - sum_{j != i} A[i][j] * x[j]) / A[i][i]`.
///
/// The off-diagonal sum is accumulated from zero in increasing `j`. A zero
/// diagonal is not guarded and yields inf or NaN.
#[inline]
pub fn lane_update<T: Real>(matrix: &AugmentedMatrix<T>, snapshot: &[T], i: usize) -> T {
    let mut sum = T::zero();
    for (j, &xj) in snapshot.iter().enumerate() {
        if j != i {
            sum = sum + matrix.coefficient(i, j) * xj;
        }
    }
    (matrix.rhs(i) - sum) / matrix.diagonal(i)
}

/// Run one parallel wave: `next[i] = lane_update(current, i)` for every lane,
/// folding each lane's `|next[i] - current[i]|` into `accumulator`.
///
/// Returns after every lane has completed. The accumulator is not reset
/// here; callers reset it before the wave.
pub fn parallel_update_step<T: Real>(
    matrix: &AugmentedMatrix<T>,
    current: &[T],
    next: &mut [T],
    accumulator: &ConvergenceAccumulator<T>,
    dispatcher: &dyn LaneDispatcher<T>,
) -> Result<()> {
    let n = matrix.size();
    if current.len() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            actual: current.len(),
        });
    }
    if next.len() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            actual: next.len(),
        });
    }

    let lane = |i: usize| {
        let updated = lane_update(matrix, current, i);
        accumulator.combine((updated - current[i]).abs());
        updated
    };
    dispatcher.dispatch(next, &lane)
}

/// Stepping driver over a fixed system.
///
/// Owns the double-buffered solution estimate and the accumulator. Each call
/// to [`JacobiIteration::sweep`] resets the accumulator, runs one wave,
/// swaps buffers, and returns the post-sweep epsilon.
pub struct JacobiIteration<'a, T: Real> {
    matrix: &'a AugmentedMatrix<T>,
    dispatcher: &'a dyn LaneDispatcher<T>,
    current: DVector<T>,
    next: DVector<T>,
    accumulator: ConvergenceAccumulator<T>,
    reset_value: T,
    sweeps: usize,
}

impl<'a, T: Real> JacobiIteration<'a, T> {
    /// Start from the zero vector with a `Min` accumulator and machine-epsilon
    /// sentinel.
    pub fn new(matrix: &'a AugmentedMatrix<T>, dispatcher: &'a dyn LaneDispatcher<T>) -> Self {
        let n = matrix.size();
        Self::build(
            matrix,
            dispatcher,
            DVector::zeros(n),
            Reduction::Min,
            T::tolerance(),
        )
    }

    /// Start from `initial` with the given reduction and tolerance.
    pub fn with_initial(
        matrix: &'a AugmentedMatrix<T>,
        dispatcher: &'a dyn LaneDispatcher<T>,
        initial: DVector<T>,
        reduction: Reduction,
        tolerance: T,
    ) -> Result<Self> {
        if initial.len() != matrix.size() {
            return Err(Error::DimensionMismatch {
                expected: matrix.size(),
                actual: initial.len(),
            });
        }
        Ok(Self::build(matrix, dispatcher, initial, reduction, tolerance))
    }

    fn build(
        matrix: &'a AugmentedMatrix<T>,
        dispatcher: &'a dyn LaneDispatcher<T>,
        initial: DVector<T>,
        reduction: Reduction,
        tolerance: T,
    ) -> Self {
        let reset_value = reduction.reset_value(tolerance);
        Self {
            matrix,
            dispatcher,
            next: DVector::zeros(initial.len()),
            current: initial,
            accumulator: ConvergenceAccumulator::new(reduction, reset_value),
            reset_value,
            sweeps: 0,
        }
    }

    /// Run one sweep and return the post-sweep epsilon.
    pub fn sweep(&mut self) -> Result<T> {
        self.accumulator.reset(self.reset_value);
        parallel_update_step(
            self.matrix,
            self.current.as_slice(),
            self.next.as_mut_slice(),
            &self.accumulator,
            self.dispatcher,
        )?;
        std::mem::swap(&mut self.current, &mut self.next);
        self.sweeps += 1;
        Ok(self.accumulator.value())
    }

    /// Current estimate (the output of the last completed sweep).
    pub fn solution(&self) -> &DVector<T> {
        &self.current
    }

    /// Number of completed sweeps.
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// Epsilon from the last completed sweep.
    pub fn epsilon(&self) -> T {
        self.accumulator.value()
    }

    /// Consume the driver, returning the estimate.
    pub fn into_solution(self) -> DVector<T> {
        self.current
    }
}
