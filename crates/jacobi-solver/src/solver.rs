//! Convergence loop driving repeated Jacobi sweeps.

use nalgebra::DVector;

use jacobi_core::{AugmentedMatrix, Real};

use crate::accumulator::Reduction;
use crate::dispatch::{DispatchConfig, LaneDispatcher};
use crate::error::{Error, Result};
use crate::sweep::JacobiIteration;

/// Jacobi solver configuration.
#[derive(Debug, Clone)]
pub struct JacobiConfig<T: Real> {
    /// Stopping threshold on the post-sweep epsilon.
    pub tolerance: T,
    /// Optional cap on the number of sweeps. `None` iterates until converged.
    pub max_sweeps: Option<usize>,
    /// How lane deltas are folded into epsilon.
    pub reduction: Reduction,
    /// Keep every post-sweep epsilon in [`JacobiResult::history`].
    pub record_history: bool,
}

impl<T: Real> Default for JacobiConfig<T> {
    fn default() -> Self {
        Self {
            tolerance: T::tolerance(),
            max_sweeps: None,
            reduction: Reduction::Min,
            record_history: false,
        }
    }
}

impl<T: Real> JacobiConfig<T> {
    /// Set the tolerance.
    pub fn with_tolerance(mut self, tolerance: T) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Cap the number of sweeps.
    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = Some(max_sweeps);
        self
    }

    /// Set the reduction rule.
    pub fn with_reduction(mut self, reduction: Reduction) -> Self {
        self.reduction = reduction;
        self
    }

    /// Record per-sweep epsilon values.
    pub fn with_history(mut self, record_history: bool) -> Self {
        self.record_history = record_history;
        self
    }
}

/// Loop controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Epsilon undetermined or above tolerance.
    Iterating,
    /// Epsilon at or below tolerance. Terminal.
    Converged,
}

/// Result of a Jacobi solve.
#[derive(Debug, Clone)]
pub struct JacobiResult<T: Real> {
    /// Converged estimate.
    pub solution: DVector<T>,
    /// Number of sweeps performed.
    pub sweeps: usize,
    /// Epsilon measured after the final sweep.
    pub epsilon: T,
    /// Final loop state.
    pub state: LoopState,
    /// Post-sweep epsilon per sweep, if recorded.
    pub history: Vec<T>,
}

impl<T: Real> JacobiResult<T> {
    /// Whether the loop reached [`LoopState::Converged`].
    pub fn converged(&self) -> bool {
        self.state == LoopState::Converged
    }
}

/// Jacobi solver: a configuration plus a lane dispatcher.
pub struct JacobiSolver<T: Real> {
    config: JacobiConfig<T>,
    dispatcher: Box<dyn LaneDispatcher<T>>,
}

impl<T: Real> JacobiSolver<T> {
    /// Create a solver over an existing dispatcher.
    pub fn new(config: JacobiConfig<T>, dispatcher: Box<dyn LaneDispatcher<T>>) -> Self {
        Self { config, dispatcher }
    }

    /// Create a solver, building the dispatcher from `dispatch`.
    pub fn with_dispatch(config: JacobiConfig<T>, dispatch: &DispatchConfig) -> Result<Self> {
        Ok(Self::new(config, dispatch.create_dispatcher()?))
    }

    /// Solver configuration.
    pub fn config(&self) -> &JacobiConfig<T> {
        &self.config
    }

    /// Dispatcher running the sweeps.
    pub fn dispatcher(&self) -> &dyn LaneDispatcher<T> {
        &*self.dispatcher
    }

    /// Solve starting from the zero vector.
    pub fn solve(&self, matrix: &AugmentedMatrix<T>) -> Result<JacobiResult<T>> {
        self.solve_from(matrix, DVector::zeros(matrix.size()))
    }

    /// Solve starting from `initial`.
    ///
    /// Sweeps until the post-sweep epsilon is at or below the tolerance. At
    /// least one sweep always runs. Without a sweep cap this does not return
    /// for systems on which Jacobi iteration does not converge.
    pub fn solve_from(
        &self,
        matrix: &AugmentedMatrix<T>,
        initial: DVector<T>,
    ) -> Result<JacobiResult<T>> {
        let tolerance = self.config.tolerance;
        let mut iteration = JacobiIteration::with_initial(
            matrix,
            &*self.dispatcher,
            initial,
            self.config.reduction,
            tolerance,
        )?;

        log::debug!(
            "Jacobi solve: n={}, type={}, tolerance={:e}, reduction={}, backend={}",
            matrix.size(),
            T::NAME,
            tolerance,
            self.config.reduction,
            self.dispatcher.name()
        );

        let mut state = LoopState::Iterating;
        let mut epsilon = self.config.reduction.reset_value(tolerance);
        let mut history = Vec::new();

        while state == LoopState::Iterating {
            if let Some(cap) = self.config.max_sweeps {
                if iteration.sweeps() >= cap {
                    log::warn!(
                        "Jacobi did not converge after {} sweeps (epsilon: {:.3e})",
                        cap,
                        epsilon
                    );
                    return Err(Error::NotConverged {
                        sweeps: cap,
                        epsilon: epsilon.as_f64(),
                    });
                }
            }

            epsilon = iteration.sweep()?;
            log::trace!("sweep {}: epsilon = {:e}", iteration.sweeps(), epsilon);
            if self.config.record_history {
                history.push(epsilon);
            }

            if epsilon <= tolerance {
                state = LoopState::Converged;
            }
        }

        log::debug!(
            "Jacobi converged in {} sweeps (epsilon: {:e})",
            iteration.sweeps(),
            epsilon
        );

        let sweeps = iteration.sweeps();
        Ok(JacobiResult {
            solution: iteration.into_solution(),
            sweeps,
            epsilon,
            state,
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::SequentialDispatcher;

    fn two_by_two() -> AugmentedMatrix<f64> {
        // 4x + y = 1
        // x + 3y = 9
        AugmentedMatrix::from_rows(&[vec![4.0, 1.0, 1.0], vec![1.0, 3.0, 9.0]]).unwrap()
    }

    #[test]
    fn jacobi_config_default() {
        let config = JacobiConfig::<f64>::default();
        assert_eq!(config.tolerance, f64::EPSILON);
        assert_eq!(config.max_sweeps, None);
        assert_eq!(config.reduction, Reduction::Min);
        assert!(!config.record_history);
    }

    #[test]
    fn test_converges_on_two_by_two() {
        let solver = JacobiSolver::new(JacobiConfig::default(), Box::new(SequentialDispatcher));
        let result = solver.solve(&two_by_two()).unwrap();

        assert!(result.converged());
        assert!(result.epsilon <= f64::EPSILON);
        assert_eq!(result.sweeps, 29);
        assert!((result.solution[0] + 6.0 / 11.0).abs() < 1e-14);
        assert!((result.solution[1] - 35.0 / 11.0).abs() < 1e-14);
    }

    #[test]
    fn test_max_reduction_needs_more_sweeps() {
        let config = JacobiConfig::default().with_reduction(Reduction::Max);
        let solver = JacobiSolver::new(config, Box::new(SequentialDispatcher));
        let result = solver.solve(&two_by_two()).unwrap();

        assert_eq!(result.sweeps, 31);
        assert_eq!(result.epsilon, 0.0);
    }

    #[test]
    fn test_history_recorded() {
        let config = JacobiConfig::default().with_history(true);
        let solver = JacobiSolver::new(config, Box::new(SequentialDispatcher));
        let result = solver.solve(&two_by_two()).unwrap();

        assert_eq!(result.history.len(), result.sweeps);
        assert_eq!(result.history.last().copied(), Some(result.epsilon));
        // First sweep from zero moves x by b / diag = [0.25, 3.0]
        assert_eq!(result.history[0], 0.25);
        assert!(result.history[..result.sweeps - 1]
            .iter()
            .all(|&e| e > f64::EPSILON));
    }

    #[test]
    fn test_always_runs_one_sweep() {
        // Start at the exact fixed point: the first sweep already reports zero
        let m = AugmentedMatrix::from_rows(&[vec![2.0, 0.0, 4.0], vec![0.0, 4.0, 2.0]]).unwrap();
        let solver = JacobiSolver::new(JacobiConfig::default(), Box::new(SequentialDispatcher));
        let result = solver
            .solve_from(&m, DVector::from_vec(vec![2.0, 0.5]))
            .unwrap();

        assert_eq!(result.sweeps, 1);
        assert_eq!(result.epsilon, 0.0);
    }

    #[test]
    fn test_sweep_cap_reports_not_converged() {
        let config = JacobiConfig::default().with_max_sweeps(5);
        let solver = JacobiSolver::new(config, Box::new(SequentialDispatcher));
        let result = solver.solve(&two_by_two());

        match result {
            Err(Error::NotConverged { sweeps, epsilon }) => {
                assert_eq!(sweeps, 5);
                assert!(epsilon > f64::EPSILON);
            }
            other => panic!("expected NotConverged, got {:?}", other.map(|r| r.sweeps)),
        }
    }

    #[test]
    fn test_cap_not_hit_when_converging_in_time() {
        let config = JacobiConfig::default().with_max_sweeps(29);
        let solver = JacobiSolver::new(config, Box::new(SequentialDispatcher));
        assert!(solver.solve(&two_by_two()).is_ok());
    }

    #[test]
    fn test_loose_tolerance_stops_early() {
        let config = JacobiConfig::default().with_tolerance(1e-3);
        let solver = JacobiSolver::new(config, Box::new(SequentialDispatcher));
        let result = solver.solve(&two_by_two()).unwrap();
        assert!(result.sweeps < 29);
        assert!(result.epsilon <= 1e-3);
    }

    #[test]
    fn test_initial_guess_dimension() {
        let solver = JacobiSolver::new(JacobiConfig::default(), Box::new(SequentialDispatcher));
        let result = solver.solve_from(&two_by_two(), DVector::zeros(3));
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }
}
