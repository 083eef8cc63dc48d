//! Generic [Float] type which acts as a stand-in for `f32` or `f64`.
use num_traits::Float as NumFloat;
use std::fmt::{Debug, Display};

/// Samples are processed as [Float]s. A [Float] is normally `f32` or `f64`.
pub trait Float: Display + Debug + Default + NumFloat + Send + Sync + 'static {
    /// Convert a constant or a configuration value into the sample type.
    fn cast(value: f64) -> Self;

    /// Widen to `f64`, mostly for index arithmetic and reporting.
    fn as_f64(self) -> f64;
}

impl Float for f64 {
    #[inline]
    fn cast(value: f64) -> Self {
        value
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}

impl Float for f32 {
    #[inline]
    fn cast(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }
}
