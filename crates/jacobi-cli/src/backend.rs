//! Dispatch backend selection.

use jacobi_solver::{BackendType, DispatchConfig};

/// Select the dispatch configuration from the CLI arguments.
///
/// Unknown backend names fall back to the default with a warning.
pub fn detect_dispatch(name: &str, threads: Option<usize>) -> DispatchConfig {
    let backend = match BackendType::from_name(name) {
        Some(backend) => backend,
        None => {
            eprintln!(
                "Warning: unknown backend '{}', falling back to {}",
                name,
                BackendType::default()
            );
            BackendType::default()
        }
    };

    let config = DispatchConfig::default().with_backend(backend);
    match threads {
        Some(n) if backend == BackendType::Sequential => {
            eprintln!("Warning: --threads {} ignored by the sequential backend", n);
            config
        }
        Some(n) => config.with_num_threads(n),
        None => config,
    }
}
