use thiserror::Error;
use twine_solvers::equation::bisection;
use uom::si::f64::Angle;

use crate::support::lens::LensError;

/// Errors that can occur while searching for a critical radius.
#[derive(Debug, Error)]
pub enum CriticalRadiusError {
    /// Lens parameters could not be resolved.
    #[error("lens evaluation failed")]
    Lens(#[from] LensError),

    /// A resolved parameter holds more than one value.
    #[error("parameter `{key}` must be a single value for a critical radius search")]
    NonScalarParam {
        /// Qualified key of the offending parameter.
        key: String,
    },

    /// The bisection solver encountered an error.
    #[error("bisection solver error")]
    Bisection(#[from] bisection::Error),

    /// The solver reached the iteration limit without converging.
    #[error("solver hit iteration limit: residual={residual:?}")]
    MaxIters {
        /// Smallest absolute determinant encountered during iteration.
        residual: f64,

        /// Iteration count performed by the solver.
        iters: usize,
    },
}

/// The lens map could not be differentiated at a sampled radius.
#[derive(Debug, Clone, Copy, Error)]
#[error("non-finite Jacobian determinant at radius {radius:?}")]
pub struct SampleError {
    /// Radius along the search ray.
    pub radius: Angle,
}
