//! Problem formulation for a critical radius search.

use std::convert::Infallible;

use twine_core::{EquationProblem, Model};
use uom::si::{
    angle::{radian, second},
    f64::Angle,
};

use crate::support::autodiff::Jet;

use super::SampleError;

/// Lens map determinant sampled along the search ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct RaySample {
    pub(super) radius: Angle,
    pub(super) det: f64,
}

/// Model adapter for a radial critical curve search.
///
/// Takes the radius along a fixed ray as its sole input and evaluates
/// `det(∂β/∂θ)` at the corresponding image-plane point.
pub(super) struct DeterminantModel<F> {
    raytrace: F,
    center: [f64; 2],
    unit: [f64; 2],
}

impl<F> DeterminantModel<F>
where
    F: Fn(Jet, Jet) -> (Jet, Jet),
{
    pub(super) fn new(raytrace: F, center: [Angle; 2], direction: Angle) -> Self {
        let phi = direction.get::<radian>();
        Self {
            raytrace,
            center: [center[0].get::<second>(), center[1].get::<second>()],
            unit: [phi.cos(), phi.sin()],
        }
    }
}

impl<F> Model for DeterminantModel<F>
where
    F: Fn(Jet, Jet) -> (Jet, Jet),
{
    type Input = Angle;
    type Output = RaySample;
    type Error = SampleError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let r = input.get::<second>();
        let x = Jet::x(self.center[0] + r * self.unit[0]);
        let y = Jet::y(self.center[1] + r * self.unit[1]);

        let (bx, by) = (self.raytrace)(x, y);
        let det = bx.dx * by.dy - bx.dy * by.dx;

        if det.is_finite() {
            Ok(RaySample { radius: *input, det })
        } else {
            Err(SampleError { radius: *input })
        }
    }
}

/// Equation problem whose root is a sign change of the determinant.
pub(super) struct CrossingProblem;

impl EquationProblem<1> for CrossingProblem {
    type Input = Angle;
    type Output = RaySample;
    type Error = Infallible;

    fn input(&self, x: &[f64; 1]) -> Result<Self::Input, Self::Error> {
        Ok(Angle::new::<second>(x[0]))
    }

    fn residuals(
        &self,
        _input: &Self::Input,
        output: &Self::Output,
    ) -> Result<[f64; 1], Self::Error> {
        Ok([output.det])
    }
}
