//! Jacobi solver CLI.
//!
//! Generates a random diagonally dominant system, solves it with parallel
//! Jacobi iteration, and verifies the result on the host.

mod backend;
mod output;

use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};

use jacobi_core::{AugmentedMatrix, DominantGenerator, MatrixSource, Real};
use jacobi_solver::{JacobiConfig, JacobiSolver, Reduction, Verifier, VerifyMode};

use backend::detect_dispatch;
use output::{JsonReport, print_failed_rows, print_solution, print_system, print_verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Precision {
    F32,
    F64,
}

#[derive(Parser, Debug)]
#[command(name = "jacobi")]
#[command(about = "Solve a random diagonally dominant linear system with parallel Jacobi iteration")]
#[command(version)]
struct Cli {
    /// Number of equations
    #[arg(short = 'n', long, default_value_t = 10)]
    size: usize,

    /// Generator seed (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Dispatch backend (auto, sequential, rayon, threads)
    #[arg(short, long, default_value = "auto")]
    backend: String,

    /// Worker threads for the rayon or threads backend
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Floating-point precision
    #[arg(short, long, value_enum, default_value_t = Precision::F32)]
    precision: Precision,

    /// Give up after this many sweeps
    #[arg(long)]
    max_sweeps: Option<usize>,

    /// How per-lane changes combine into the stopping value (min, max)
    #[arg(long, default_value = "min")]
    stopping: String,

    /// Require every residual to be within the raw tolerance
    #[arg(long)]
    strict: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Do not print the generated system
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match cli.precision {
        Precision::F32 => run::<f32>(&cli),
        Precision::F64 => run::<f64>(&cli),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if !cli.json {
                print_verdict(false);
            }
            ExitCode::FAILURE
        }
    }
}

/// Generate, solve and verify one system. Returns whether verification passed.
fn run<T: Real>(cli: &Cli) -> Result<bool> {
    let reduction = Reduction::from_name(&cli.stopping)
        .ok_or_else(|| anyhow!("unknown stopping rule '{}' (expected min or max)", cli.stopping))?;
    let seed = cli.seed.unwrap_or_else(rand::random);

    let mut config = JacobiConfig::<T>::default().with_reduction(reduction);
    if let Some(cap) = cli.max_sweeps {
        config = config.with_max_sweeps(cap);
    }
    let tolerance = config.tolerance;

    let dispatch = detect_dispatch(&cli.backend, cli.threads);
    let solver = JacobiSolver::with_dispatch(config, &dispatch)
        .context("failed to create lane dispatcher")?;
    let device = solver.dispatcher().name();

    let system: AugmentedMatrix<T> = DominantGenerator::new(cli.size).generate(seed);
    let violations = system.dominance_violations();
    if !violations.is_empty() {
        log::warn!(
            "rows {:?} are not strictly diagonally dominant; iteration may not converge",
            violations
        );
    }
    log::info!("seed {}, {} equations, {} precision", seed, system.size(), T::NAME);

    if !cli.json {
        println!("Device: {}", device);
        println!("The number of equations: N {}", system.size());
        if !cli.quiet {
            print_system(&system);
        }
    }

    let result = solver
        .solve(&system)
        .with_context(|| format!("solve failed for seed {}", seed))?;
    log::info!(
        "converged in {} sweeps (epsilon: {:e})",
        result.sweeps,
        result.epsilon
    );

    let mode = if cli.strict {
        VerifyMode::Absolute
    } else {
        VerifyMode::Scaled
    };
    let report = Verifier::new(tolerance)
        .with_mode(mode)
        .verify(&system, &result.solution)
        .context("verification failed")?;

    if cli.json {
        let json = JsonReport::new(device, seed, reduction.to_string(), &result, &report);
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print_solution(&result.solution);
        if !report.passed {
            print_failed_rows(&report);
        }
        print_verdict(report.passed);
    }

    Ok(report.passed)
}
