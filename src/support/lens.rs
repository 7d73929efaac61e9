//! Gravitational lens capabilities.
//!
//! A lens is described by the capability trait it implements:
//!
//! - [`ThinLens`]: all mass sits in one plane at redshift `z_l`. Implementors
//!   supply the reduced deflection angle, convergence and potential as
//!   pointwise kernels; ray tracing, physical deflection, surface density,
//!   time delay, Jacobians and magnification are derived.
//! - [`ThickLens`]: mass spread along the line of sight with no single lens
//!   redshift. Implementors supply a ray-tracing kernel, surface density and
//!   time delay; effective deflection and magnification are derived.
//!
//! Kernels are generic over [`Real`](crate::support::autodiff::Real) so the
//! same code yields values on `f64` inputs and exact local Jacobians on
//! [`Jet`](crate::support::autodiff::Jet) inputs.
//!
//! Every tensor-level operation takes `x`, `y` (arcsec) and `z_s` as
//! [`Tensor`]s that broadcast together with the lens's resolved parameters,
//! plus an optional [`Packed`] override shared with the lens's cosmology.

mod capability;
mod error;
mod jacobian;
mod magnification;
pub mod profile;

#[cfg(test)]
pub(crate) mod test_support;

pub use capability::{ThickLens, ThinLens};
pub use error::LensError;
pub use jacobian::JacobianMethod;
pub use magnification::{raytrace_jacobian, raytrace_magnification};
pub use profile::{ExternalShear, Multiplane, PointMass};

use crate::support::{
    param::{ParamError, ParamSchema},
    tensor::Tensor,
};

/// Number of parameters every thin lens declares before its own.
///
/// Profile parameter indices start here.
pub const THIN_LENS_PARAMS: usize = 1;

/// Index of the lens redshift in a thin lens's resolved parameters.
pub const Z_L: usize = 0;

/// Starts a thin lens schema owned by `name`, declaring `z_l` first.
///
/// # Errors
///
/// Never fails for a fresh schema; the `Result` comes from
/// [`ParamSchema::declare`].
pub fn thin_lens_schema(name: &str, z_l: Option<Tensor>) -> Result<ParamSchema, ParamError> {
    let mut schema = ParamSchema::new();
    schema.declare(name, "z_l", z_l, "unitless")?;
    Ok(schema)
}
