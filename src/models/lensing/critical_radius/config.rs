use twine_solvers::equation::bisection;
use uom::si::{angle::second, f64::Angle};

/// Solver configuration for a critical radius search.
#[derive(Debug, Clone, Copy)]
pub struct CriticalRadiusConfig {
    /// Maximum iteration count for the bisection solve.
    pub max_iters: usize,

    /// Absolute tolerance on the search radius.
    pub radius_tol: Angle,

    /// Absolute tolerance on the Jacobian determinant.
    pub det_tol: f64,
}

impl Default for CriticalRadiusConfig {
    fn default() -> Self {
        Self {
            max_iters: 100,
            radius_tol: Angle::new::<second>(1e-10),
            det_tol: 1e-12,
        }
    }
}

impl CriticalRadiusConfig {
    /// Converts this configuration into a bisection solver configuration.
    pub(super) fn bisection(&self) -> bisection::Config {
        bisection::Config {
            max_iters: self.max_iters,
            x_abs_tol: self.radius_tol.get::<second>(),
            x_rel_tol: 0.0,
            residual_tol: self.det_tol,
        }
    }
}
