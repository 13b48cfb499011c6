//! Shared convergence accumulator.
//!
//! Every lane of a sweep folds its `|new - old|` into one shared scalar. The
//! scalar lives in an `AtomicU64` holding the float's bits, and lanes combine
//! through a compare-and-swap loop, so no update is lost under any
//! interleaving. The dispatcher's end-of-wave barrier orders all combines
//! before the controller reads the value.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use jacobi_core::Real;

/// How lane deltas are folded into the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reduction {
    /// Keep the smallest change: the sweep counts as settled once any single
    /// coordinate has stopped moving.
    #[default]
    Min,
    /// Keep the largest change: every coordinate must have stopped moving.
    Max,
}

impl Reduction {
    /// Parse from a string.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "min" | "minimum" => Some(Self::Min),
            "max" | "maximum" => Some(Self::Max),
            _ => None,
        }
    }

    /// Value the accumulator is reset to before a sweep.
    ///
    /// For `Min` this is `1 + tolerance`, strictly above the stopping
    /// threshold. For `Max` it is zero, the identity for non-negative deltas.
    pub fn reset_value<T: Real>(self, tolerance: T) -> T {
        match self {
            Reduction::Min => T::one() + tolerance,
            Reduction::Max => T::zero(),
        }
    }

    /// Whether `candidate` should replace `current`.
    #[inline]
    fn improves<T: Real>(self, candidate: T, current: T) -> bool {
        match self {
            Reduction::Min => candidate < current,
            Reduction::Max => candidate > current,
        }
    }
}

impl std::fmt::Display for Reduction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reduction::Min => write!(f, "min"),
            Reduction::Max => write!(f, "max"),
        }
    }
}

/// Lock-free shared scalar combined by concurrent lanes.
#[derive(Debug)]
pub struct ConvergenceAccumulator<T: Real> {
    bits: AtomicU64,
    reduction: Reduction,
    _marker: PhantomData<T>,
}

impl<T: Real> ConvergenceAccumulator<T> {
    /// Create an accumulator holding `initial`.
    pub fn new(reduction: Reduction, initial: T) -> Self {
        Self {
            bits: AtomicU64::new(initial.to_bits_u64()),
            reduction,
            _marker: PhantomData,
        }
    }

    /// Reduction rule applied by [`ConvergenceAccumulator::combine`].
    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    /// Overwrite the stored value. Only called between sweeps.
    pub fn reset(&self, value: T) {
        self.bits.store(value.to_bits_u64(), Ordering::Release);
    }

    /// Fold `delta` into the stored value.
    ///
    /// A NaN delta never compares as an improvement and is dropped.
    pub fn combine(&self, delta: T) {
        let mut current = self.bits.load(Ordering::Acquire);
        while self.reduction.improves(delta, T::from_bits_u64(current)) {
            match self.bits.compare_exchange_weak(
                current,
                delta.to_bits_u64(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    /// Current stored value.
    pub fn value(&self) -> T {
        T::from_bits_u64(self.bits.load(Ordering::Acquire))
    }
}
