use std::{
    fmt::Debug,
    ops::{Add, Div, Mul, Neg, Sub},
};

use num_traits::{One, Zero};

/// Scalar type a differentiable lens kernel is generic over.
///
/// Implemented by `f64` for plain evaluation and by [`super::Jet`] for
/// evaluation with first derivatives. Mixed arithmetic is only available
/// with the scalar on the left (`s * 2.0`, never `2.0 * s`).
pub trait Real:
    Copy
    + Debug
    + Zero
    + One
    + Neg<Output = Self>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Add<f64, Output = Self>
    + Sub<f64, Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
{
    /// Lifts a value that does not depend on the coordinates.
    fn constant(value: f64) -> Self;

    /// The value, with any derivative information dropped.
    fn value(self) -> f64;

    fn sqrt(self) -> Self;
    fn exp(self) -> Self;
    fn ln(self) -> Self;
    fn powi(self, n: i32) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;

    /// Four-quadrant arctangent of `self / other`.
    fn atan2(self, other: Self) -> Self;
}

impl Real for f64 {
    fn constant(value: f64) -> Self {
        value
    }

    fn value(self) -> f64 {
        self
    }

    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    fn exp(self) -> Self {
        f64::exp(self)
    }

    fn ln(self) -> Self {
        f64::ln(self)
    }

    fn powi(self, n: i32) -> Self {
        f64::powi(self, n)
    }

    fn sin(self) -> Self {
        f64::sin(self)
    }

    fn cos(self) -> Self {
        f64::cos(self)
    }

    fn atan2(self, other: Self) -> Self {
        f64::atan2(self, other)
    }
}
