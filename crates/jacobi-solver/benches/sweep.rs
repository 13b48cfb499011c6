//! Benchmarks for Jacobi sweeps and full solves.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jacobi_core::{AugmentedMatrix, DominantGenerator, MatrixSource};
use jacobi_solver::{DispatchConfig, JacobiConfig, JacobiIteration, JacobiSolver, LaneDispatcher};

fn backends() -> Vec<(&'static str, DispatchConfig)> {
    vec![
        ("sequential", DispatchConfig::sequential()),
        ("rayon", DispatchConfig::rayon()),
        ("threads", DispatchConfig::threads(4)),
    ]
}

fn bench_single_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");

    for size in [16, 64, 256, 1024] {
        let matrix: AugmentedMatrix<f64> = DominantGenerator::new(size).generate(1);

        for (label, config) in backends() {
            let dispatcher: Box<dyn LaneDispatcher<f64>> = config.create_dispatcher().unwrap();
            group.bench_with_input(BenchmarkId::new(label, size), &size, |bencher, _| {
                let mut iteration = JacobiIteration::new(&matrix, &*dispatcher);
                bencher.iter(|| black_box(iteration.sweep().unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_full_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");

    for size in [16, 64, 256] {
        let matrix: AugmentedMatrix<f32> = DominantGenerator::new(size).generate(1);

        for (label, config) in backends() {
            let solver_config = JacobiConfig::default().with_max_sweeps(10_000);
            let solver = JacobiSolver::with_dispatch(solver_config, &config).unwrap();
            group.bench_with_input(BenchmarkId::new(label, size), &size, |bencher, _| {
                bencher.iter(|| solver.solve(black_box(&matrix)).ok());
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_single_sweep, bench_full_solve);
criterion_main!(benches);
