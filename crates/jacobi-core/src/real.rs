//! Floating-point abstraction shared by the solver kernel.

use nalgebra::Scalar;
use num_traits::Float;
use std::fmt::{Display, LowerExp};

/// A real number type the Jacobi kernel can run on.
///
/// Implemented for `f32` and `f64`. The bit conversions let a single
/// `AtomicU64` hold either width for lock-free reductions.
pub trait Real: Float + Scalar + Display + LowerExp + Send + Sync + 'static {
    /// Short type name used in reports.
    const NAME: &'static str;

    /// Convergence and verification tolerance: the machine epsilon of the type.
    #[inline]
    fn tolerance() -> Self {
        Self::epsilon()
    }

    /// Raw bits, zero-extended to 64 bits.
    fn to_bits_u64(self) -> u64;

    /// Inverse of [`Real::to_bits_u64`].
    fn from_bits_u64(bits: u64) -> Self;

    /// Conversion from `f64`, rounding to the nearest representable value.
    fn lossy_from_f64(value: f64) -> Self;

    /// Widening conversion to `f64`.
    fn as_f64(self) -> f64;
}

impl Real for f32 {
    const NAME: &'static str = "f32";

    #[inline]
    fn to_bits_u64(self) -> u64 {
        u64::from(self.to_bits())
    }

    #[inline]
    fn from_bits_u64(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }

    #[inline]
    fn lossy_from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Real for f64 {
    const NAME: &'static str = "f64";

    #[inline]
    fn to_bits_u64(self) -> u64 {
        self.to_bits()
    }

    #[inline]
    fn from_bits_u64(bits: u64) -> Self {
        f64::from_bits(bits)
    }

    #[inline]
    fn lossy_from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}
