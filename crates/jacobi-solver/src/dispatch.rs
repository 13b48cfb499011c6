//! Lane dispatch: launching N-wide parallel work and waiting for it.
//!
//! A [`LaneDispatcher`] runs one closure per output slot and returns only
//! once every slot has been written, which is the end-of-sweep barrier the
//! convergence loop relies on. Provides:
//! - [`SequentialDispatcher`]: lanes in index order on the calling thread
//! - [`RayonDispatcher`]: rayon's global pool or a dedicated pool
//! - [`ThreadDispatcher`]: scoped OS threads over contiguous chunks

use rayon::prelude::*;
use std::thread;

use jacobi_core::Real;

use crate::error::{Error, Result};

/// Type of dispatch backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendType {
    /// One lane after another on the caller's thread.
    Sequential,
    /// Work-stealing rayon pool.
    #[default]
    Rayon,
    /// Scoped `std::thread` workers, one contiguous chunk each.
    Threads,
}

impl BackendType {
    /// Parse from a string. `auto` selects rayon.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "sequential" | "seq" | "serial" => Some(Self::Sequential),
            "rayon" | "parallel" | "auto" => Some(Self::Rayon),
            "threads" | "thread" | "std" => Some(Self::Threads),
            _ => None,
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Sequential => write!(f, "Sequential"),
            BackendType::Rayon => write!(f, "Rayon"),
            BackendType::Threads => write!(f, "Threads"),
        }
    }
}

/// Launches one unit of work per output slot and blocks until all finish.
pub trait LaneDispatcher<T: Real>: Send + Sync {
    /// Run `lane(i)` for every `i` in `0..out.len()` and store the result in
    /// `out[i]`.
    ///
    /// Lanes may run in any order and concurrently. Each lane owns exactly
    /// one slot. Returns only after every lane has completed.
    fn dispatch(&self, out: &mut [T], lane: &(dyn Fn(usize) -> T + Sync)) -> Result<()>;

    /// Get the backend type.
    fn backend_type(&self) -> BackendType;

    /// Human-readable description of where lanes run.
    fn name(&self) -> String;
}

/// Dispatch configuration.
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    /// Backend to use.
    pub backend: BackendType,
    /// Worker count. `None` uses the backend's default.
    pub num_threads: Option<usize>,
}

impl DispatchConfig {
    /// Create a sequential configuration.
    pub fn sequential() -> Self {
        Self {
            backend: BackendType::Sequential,
            num_threads: None,
        }
    }

    /// Create a rayon configuration using the global pool.
    pub fn rayon() -> Self {
        Self {
            backend: BackendType::Rayon,
            num_threads: None,
        }
    }

    /// Create a scoped-thread configuration.
    pub fn threads(num_threads: usize) -> Self {
        Self {
            backend: BackendType::Threads,
            num_threads: Some(num_threads),
        }
    }

    /// Set the backend.
    pub fn with_backend(mut self, backend: BackendType) -> Self {
        self.backend = backend;
        self
    }

    /// Set the worker count.
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Build the configured dispatcher.
    pub fn create_dispatcher<T: Real>(&self) -> Result<Box<dyn LaneDispatcher<T>>> {
        match self.backend {
            BackendType::Sequential => Ok(Box::new(SequentialDispatcher)),
            BackendType::Rayon => match self.num_threads {
                Some(n) => Ok(Box::new(RayonDispatcher::with_threads(n)?)),
                None => Ok(Box::new(RayonDispatcher::global())),
            },
            BackendType::Threads => {
                let n = self
                    .num_threads
                    .unwrap_or_else(|| thread::available_parallelism().map_or(1, |n| n.get()));
                Ok(Box::new(ThreadDispatcher::new(n)?))
            }
        }
    }
}

/// Runs lanes in index order on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialDispatcher;

impl<T: Real> LaneDispatcher<T> for SequentialDispatcher {
    fn dispatch(&self, out: &mut [T], lane: &(dyn Fn(usize) -> T + Sync)) -> Result<()> {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = lane(i);
        }
        Ok(())
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Sequential
    }

    fn name(&self) -> String {
        "CPU (sequential)".to_string()
    }
}

/// Runs lanes on a rayon pool.
#[derive(Debug)]
pub struct RayonDispatcher {
    pool: Option<rayon::ThreadPool>,
}

impl RayonDispatcher {
    /// Use rayon's global pool.
    pub fn global() -> Self {
        Self { pool: None }
    }

    /// Build a dedicated pool with `num_threads` workers.
    pub fn with_threads(num_threads: usize) -> Result<Self> {
        if num_threads == 0 {
            return Err(Error::DispatchUnavailable(
                "rayon pool needs at least one thread".to_string(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("jacobi-rayon-{}", i))
            .build()
            .map_err(|e| Error::DispatchUnavailable(e.to_string()))?;
        Ok(Self { pool: Some(pool) })
    }

    /// Number of workers lanes are spread across.
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl<T: Real> LaneDispatcher<T> for RayonDispatcher {
    fn dispatch(&self, out: &mut [T], lane: &(dyn Fn(usize) -> T + Sync)) -> Result<()> {
        match &self.pool {
            Some(pool) => pool.install(|| fill_parallel(out, lane)),
            None => fill_parallel(out, lane),
        }
        Ok(())
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Rayon
    }

    fn name(&self) -> String {
        format!("CPU (rayon, {} threads)", self.num_threads())
    }
}

fn fill_parallel<T: Real>(out: &mut [T], lane: &(dyn Fn(usize) -> T + Sync)) {
    out.par_iter_mut()
        .enumerate()
        .for_each(|(i, slot)| *slot = lane(i));
}

/// Splits the output into contiguous chunks, one scoped thread per chunk.
#[derive(Debug, Clone, Copy)]
pub struct ThreadDispatcher {
    num_threads: usize,
}

impl ThreadDispatcher {
    /// Create a dispatcher with `num_threads` workers.
    pub fn new(num_threads: usize) -> Result<Self> {
        if num_threads == 0 {
            return Err(Error::DispatchUnavailable(
                "thread dispatcher needs at least one thread".to_string(),
            ));
        }
        Ok(Self { num_threads })
    }

    /// Number of workers.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }
}

impl<T: Real> LaneDispatcher<T> for ThreadDispatcher {
    fn dispatch(&self, out: &mut [T], lane: &(dyn Fn(usize) -> T + Sync)) -> Result<()> {
        if out.is_empty() {
            return Ok(());
        }
        let chunk_len = out.len().div_ceil(self.num_threads);

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.num_threads);
            for (k, chunk) in out.chunks_mut(chunk_len).enumerate() {
                let base = k * chunk_len;
                let handle = thread::Builder::new()
                    .name(format!("jacobi-lane-{}", k))
                    .spawn_scoped(scope, move || {
                        for (offset, slot) in chunk.iter_mut().enumerate() {
                            *slot = lane(base + offset);
                        }
                    })
                    .map_err(|e| Error::Dispatch(format!("failed to spawn worker {}: {}", k, e)))?;
                handles.push(handle);
            }

            // Joining every handle is the barrier
            let mut failed = Vec::new();
            for (k, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    failed.push(k);
                }
            }
            if failed.is_empty() {
                Ok(())
            } else {
                Err(Error::Dispatch(format!("worker(s) {:?} panicked", failed)))
            }
        })
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Threads
    }

    fn name(&self) -> String {
        format!("CPU (std::thread, {} threads)", self.num_threads)
    }
}
