//! Concrete lens profiles.
//!
//! Each thin profile declares `z_l` first (through
//! [`thin_lens_schema`](super::thin_lens_schema)) and exposes the positions
//! of its own parameters as associated constants, so kernels index resolved
//! values by name rather than by literal offset.

mod external_shear;
mod multiplane;
mod point_mass;

pub use external_shear::ExternalShear;
pub use multiplane::Multiplane;
pub use point_mass::PointMass;
