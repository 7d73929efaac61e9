//! Radial search for tangential critical curves.
//!
//! Along a ray leaving `center` in a fixed direction, the determinant of the
//! lens map Jacobian `det(∂β/∂θ)` changes sign where the ray crosses a
//! critical curve. This module brackets that crossing and solves for it by
//! bisection, driving a [`twine_core::Model`] that samples the determinant
//! at a given radius.

mod config;
mod error;
mod problem;

pub use config::CriticalRadiusConfig;
pub use error::{CriticalRadiusError, SampleError};

use twine_solvers::equation::bisection;
use uom::si::{angle::second, f64::Angle};

use crate::support::{
    autodiff::Jet,
    lens::{LensError, ThickLens, ThinLens},
    param::{Packed, ParamSchema},
    tensor::Tensor,
};

use problem::{CrossingProblem, DeterminantModel};

/// Where to look for a critical curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialSearch {
    /// Origin of the search ray, `[x, y]`.
    pub center: [Angle; 2],

    /// Direction of the ray, measured from the `+x` axis toward `+y`.
    pub direction: Angle,

    /// Radii between which the determinant changes sign.
    pub bracket: [Angle; 2],
}

/// Finds the radius at which a thin lens's map becomes singular.
///
/// Every resolved lens parameter must hold a single value.
///
/// # Errors
///
/// Returns [`CriticalRadiusError`] if parameters cannot be resolved or are
/// batched, the bracket does not enclose a sign change, or the solver hits
/// its iteration limit.
pub fn critical_radius<L: ThinLens>(
    lens: &L,
    z_s: f64,
    params: Option<&Packed>,
    search: RadialSearch,
    config: CriticalRadiusConfig,
) -> Result<Angle, CriticalRadiusError> {
    let resolved = lens.unpack(params).map_err(LensError::from)?;
    let values = single_values(lens.schema(), resolved)?;
    solve(|x, y| lens.raytrace_at(x, y, z_s, &values), search, config)
}

/// Finds the radius at which a thick lens's map becomes singular.
///
/// # Errors
///
/// Same as [`critical_radius`].
pub fn thick_critical_radius<L: ThickLens>(
    lens: &L,
    z_s: f64,
    params: Option<&Packed>,
    search: RadialSearch,
    config: CriticalRadiusConfig,
) -> Result<Angle, CriticalRadiusError> {
    let resolved = lens.unpack(params).map_err(LensError::from)?;
    let values = single_values(lens.schema(), resolved)?;
    solve(|x, y| lens.raytrace_at(x, y, z_s, &values), search, config)
}

/// Flattens resolved parameters to one value each.
fn single_values(
    schema: &ParamSchema,
    values: Vec<Tensor>,
) -> Result<Vec<f64>, CriticalRadiusError> {
    schema
        .keys()
        .zip(values)
        .map(|(key, value)| match value.iter().next() {
            Some(&v) if value.len() == 1 => Ok(v),
            _ => Err(CriticalRadiusError::NonScalarParam { key }),
        })
        .collect()
}

fn solve<F>(
    raytrace: F,
    search: RadialSearch,
    config: CriticalRadiusConfig,
) -> Result<Angle, CriticalRadiusError>
where
    F: Fn(Jet, Jet) -> (Jet, Jet),
{
    let model = DeterminantModel::new(raytrace, search.center, search.direction);
    let problem = CrossingProblem;

    let solution = bisection::solve(
        &model,
        &problem,
        [
            search.bracket[0].get::<second>(),
            search.bracket[1].get::<second>(),
        ],
        &config.bisection(),
        |event: &bisection::Event<'_, _, _>| {
            // A non-finite determinant marks a singular point of the profile.
            if event.result().is_err() {
                return Some(bisection::Action::assume_positive());
            }
            None
        },
    )?;

    if solution.status != bisection::Status::Converged {
        return Err(CriticalRadiusError::MaxIters {
            residual: solution.residual,
            iters: solution.iters,
        });
    }

    tracing::debug!(
        iters = solution.iters,
        residual = solution.residual,
        "critical radius converged"
    );
    Ok(solution.snapshot.output.radius)
}
