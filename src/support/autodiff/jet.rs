use std::ops::{Add, Div, Mul, Neg, Sub};

use num_traits::{One, Zero};

use super::Real;

/// A value together with its partial derivatives `∂/∂x` and `∂/∂y`.
///
/// Arithmetic propagates derivatives by the chain rule.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Jet {
    /// The function value.
    pub val: f64,
    /// Partial derivative with respect to `x`.
    pub dx: f64,
    /// Partial derivative with respect to `y`.
    pub dy: f64,
}

impl Jet {
    #[must_use]
    pub fn new(val: f64, dx: f64, dy: f64) -> Self {
        Self { val, dx, dy }
    }

    /// Seeds the `x` coordinate (`∂x/∂x = 1`).
    #[must_use]
    pub fn x(val: f64) -> Self {
        Self::new(val, 1.0, 0.0)
    }

    /// Seeds the `y` coordinate (`∂y/∂y = 1`).
    #[must_use]
    pub fn y(val: f64) -> Self {
        Self::new(val, 0.0, 1.0)
    }

    #[must_use]
    pub fn constant(val: f64) -> Self {
        Self::new(val, 0.0, 0.0)
    }

    /// The gradient `[∂/∂x, ∂/∂y]`.
    #[must_use]
    pub fn gradient(self) -> [f64; 2] {
        [self.dx, self.dy]
    }

    /// Applies a scalar function `f` with derivative `df` at `self.val`.
    fn chain(self, f: f64, df: f64) -> Self {
        Self::new(f, df * self.dx, df * self.dy)
    }
}

impl Add for Jet {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.val + rhs.val, self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl Sub for Jet {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.val - rhs.val, self.dx - rhs.dx, self.dy - rhs.dy)
    }
}

impl Mul for Jet {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.val * rhs.val,
            self.dx * rhs.val + self.val * rhs.dx,
            self.dy * rhs.val + self.val * rhs.dy,
        )
    }
}

impl Div for Jet {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let inv = 1.0 / rhs.val;
        let val = self.val * inv;
        Self::new(
            val,
            (self.dx - val * rhs.dx) * inv,
            (self.dy - val * rhs.dy) * inv,
        )
    }
}

impl Neg for Jet {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.val, -self.dx, -self.dy)
    }
}

impl Add<f64> for Jet {
    type Output = Self;

    fn add(self, rhs: f64) -> Self {
        Self::new(self.val + rhs, self.dx, self.dy)
    }
}

impl Sub<f64> for Jet {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self {
        Self::new(self.val - rhs, self.dx, self.dy)
    }
}

impl Mul<f64> for Jet {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.val * rhs, self.dx * rhs, self.dy * rhs)
    }
}

impl Div<f64> for Jet {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.val / rhs, self.dx / rhs, self.dy / rhs)
    }
}

impl Zero for Jet {
    fn zero() -> Self {
        Self::constant(0.0)
    }

    fn is_zero(&self) -> bool {
        self.val == 0.0 && self.dx == 0.0 && self.dy == 0.0
    }
}

impl One for Jet {
    fn one() -> Self {
        Self::constant(1.0)
    }
}

impl Real for Jet {
    fn constant(value: f64) -> Self {
        Jet::constant(value)
    }

    fn value(self) -> f64 {
        self.val
    }

    fn sqrt(self) -> Self {
        let root = self.val.sqrt();
        self.chain(root, 0.5 / root)
    }

    fn exp(self) -> Self {
        let e = self.val.exp();
        self.chain(e, e)
    }

    fn ln(self) -> Self {
        self.chain(self.val.ln(), 1.0 / self.val)
    }

    fn powi(self, n: i32) -> Self {
        match n {
            0 => Self::one(),
            1 => self,
            _ => self.chain(self.val.powi(n), f64::from(n) * self.val.powi(n - 1)),
        }
    }

    fn sin(self) -> Self {
        self.chain(self.val.sin(), self.val.cos())
    }

    fn cos(self) -> Self {
        self.chain(self.val.cos(), -self.val.sin())
    }

    fn atan2(self, other: Self) -> Self {
        let r2 = self.val * self.val + other.val * other.val;
        Self::new(
            self.val.atan2(other.val),
            (other.val * self.dx - self.val * other.dx) / r2,
            (other.val * self.dy - self.val * other.dy) / r2,
        )
    }
}
