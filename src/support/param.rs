//! Dynamic parameters of lens and cosmology models.
//!
//! Every model declares its parameters once, in order, in a [`ParamSchema`].
//! A parameter either carries a stored value or is *dynamic*, in which case
//! a value must be supplied per evaluation through a [`Packed`] override.
//! Resolution always yields one tensor per declared parameter, in
//! declaration order, so pointwise kernels can index their parameters by
//! position.
//!
//! Keys are hierarchical: the parameter `th_ein` of a model named `lens` is
//! addressed as `"lens.th_ein"`.
//!
//! ```
//! use twine_lensing::support::param::{Packed, ParamSchema};
//! use twine_lensing::support::tensor::scalar;
//!
//! let mut schema = ParamSchema::new();
//! schema.declare("lens", "z_l", Some(scalar(0.5)), "unitless").unwrap();
//! schema.declare("lens", "th_ein", None, "arcsec").unwrap();
//!
//! let packed = Packed::new().with("lens.th_ein", 1.2);
//! let values = schema.resolve(Some(&packed)).unwrap();
//! assert_eq!(values[0].sum(), 0.5);
//! assert_eq!(values[1].sum(), 1.2);
//!
//! assert!(schema.resolve(None).is_err());
//! ```

mod error;
mod packed;
mod schema;

pub use error::ParamError;
pub use packed::Packed;
pub use schema::{Param, ParamSchema};

use crate::support::tensor::Tensor;

/// A model that owns an ordered parameter schema.
pub trait Parametrized {
    /// The owner name used to build this model's parameter keys.
    fn name(&self) -> &str;

    fn schema(&self) -> &ParamSchema;

    fn schema_mut(&mut self) -> &mut ParamSchema;

    /// Resolves every declared parameter against an optional override.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] if a dynamic parameter has no override or an
    /// override has the wrong shape.
    fn unpack(&self, params: Option<&Packed>) -> Result<Vec<Tensor>, ParamError> {
        self.schema().resolve(params)
    }

    /// Replaces the stored value of the parameter at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Unknown`] if no parameter has that key.
    fn set(&mut self, key: &str, value: Tensor) -> Result<(), ParamError> {
        self.schema_mut().set(key, value)
    }

    /// Replaces the stored value of this model's own parameter `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Unknown`] if the model declares no such parameter.
    fn set_own(&mut self, name: &str, value: Tensor) -> Result<(), ParamError> {
        let key = format!("{}.{name}", self.name());
        self.set(&key, value)
    }
}
