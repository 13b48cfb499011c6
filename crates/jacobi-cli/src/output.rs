//! Output formatting for solve reports.

use nalgebra::DVector;
use serde::Serialize;

use jacobi_core::{AugmentedMatrix, Real};
use jacobi_solver::{JacobiResult, VerificationReport};

/// Print the system, one equation per line.
pub fn print_system<T: Real>(matrix: &AugmentedMatrix<T>) {
    println!("The linear equations:");
    print!("{}", matrix);
}

/// Print the solution on a single tab-separated line.
pub fn print_solution<T: Real>(solution: &DVector<T>) {
    println!("The solution of the equations:");
    let line: String = solution.iter().map(|x| format!("{}\t", x)).collect();
    println!("{}", line);
}

/// Print the final verdict.
pub fn print_verdict(passed: bool) {
    if passed {
        println!("Success!");
    } else {
        println!("Failure");
    }
}

/// Print rows that missed their residual bound.
pub fn print_failed_rows<T: Real>(report: &VerificationReport<T>) {
    for row in report.failed_rows() {
        eprintln!(
            "  row {}: residual {:e} exceeds {:e}",
            row, report.residuals[row], report.bounds[row]
        );
    }
}

/// Machine-readable solve report.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub device: String,
    pub size: usize,
    pub seed: u64,
    pub precision: &'static str,
    pub stopping: String,
    pub sweeps: usize,
    pub epsilon: f64,
    pub solution: Vec<f64>,
    pub residuals: Vec<f64>,
    pub worst_row: usize,
    pub max_residual: f64,
    pub passed: bool,
}

impl JsonReport {
    /// Build a report from a solve and its verification, widening to `f64`.
    pub fn new<T: Real>(
        device: String,
        seed: u64,
        stopping: String,
        result: &JacobiResult<T>,
        report: &VerificationReport<T>,
    ) -> Self {
        Self {
            device,
            size: result.solution.len(),
            seed,
            precision: T::NAME,
            stopping,
            sweeps: result.sweeps,
            epsilon: result.epsilon.as_f64(),
            solution: result.solution.iter().map(|x| x.as_f64()).collect(),
            residuals: report.residuals.iter().map(|r| r.as_f64()).collect(),
            worst_row: report.worst_row,
            max_residual: report.max_residual().as_f64(),
            passed: report.passed,
        }
    }
}
