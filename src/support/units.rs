//! Physical constants and unit conversions used by lens and cosmology models.
//!
//! Sky-plane angles are carried as plain `f64` arcseconds inside tensors,
//! distances as megaparsecs, and masses as solar masses. The conversions
//! between those working units and SI are derived through [`uom`] so there
//! is a single place where a unit factor is written down.
//!
//! ```
//! use twine_lensing::support::units::{arcsec_to_rad, rad_to_arcsec};
//!
//! let rad = 3600.0 * arcsec_to_rad();
//! assert!((rad - std::f64::consts::PI / 180.0).abs() < 1e-15);
//! assert!((rad_to_arcsec() * arcsec_to_rad() - 1.0).abs() < 1e-15);
//! ```

use std::f64::consts::PI;

use uom::si::{
    angle::{radian, second},
    f64::{Angle, Velocity},
    velocity::{kilometer_per_second, meter_per_second},
};

/// Astronomical unit in meters (IAU 2012 Resolution B2).
const AU_M: f64 = 149_597_870_700.0;

/// Newton's gravitational constant in `Mpc · (km/s)² / M☉`.
pub const G_MPC_KM2_PER_S2_MSUN: f64 = 4.300_917_270_036_279e-9;

/// Exact speed of light in vacuum.
#[must_use]
pub fn speed_of_light() -> Velocity {
    Velocity::new::<meter_per_second>(299_792_458.0)
}

/// Speed of light in km/s.
#[must_use]
pub fn c_km_s() -> f64 {
    speed_of_light().get::<kilometer_per_second>()
}

/// One megaparsec in meters.
///
/// A parsec is `648000/π` astronomical units.
#[must_use]
pub fn mpc_to_m() -> f64 {
    1.0e6 * 648_000.0 / PI * AU_M
}

/// Speed of light in Mpc/s.
#[must_use]
pub fn c_mpc_s() -> f64 {
    speed_of_light().get::<meter_per_second>() / mpc_to_m()
}

/// Radians per arcsecond.
#[must_use]
pub fn arcsec_to_rad() -> f64 {
    Angle::new::<second>(1.0).get::<radian>()
}

/// Arcseconds per radian.
#[must_use]
pub fn rad_to_arcsec() -> f64 {
    Angle::new::<radian>(1.0).get::<second>()
}

/// `c² / (4πG)` in M☉/Mpc, the prefactor of the critical surface density.
#[must_use]
pub fn critical_surface_density_prefactor() -> f64 {
    c_km_s().powi(2) / (4.0 * PI * G_MPC_KM2_PER_S2_MSUN)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn megaparsec_in_meters() {
        assert_relative_eq!(mpc_to_m(), 3.085_677_581_491_367e22, max_relative = 1e-14);
    }

    #[test]
    fn light_crosses_a_megaparsec_in_about_three_million_years() {
        let seconds = 1.0 / c_mpc_s();
        let years = seconds / (365.25 * 86_400.0);
        assert_relative_eq!(years, 3.2616e6, max_relative = 1e-4);
    }

    #[test]
    fn sigma_crit_prefactor() {
        assert_relative_eq!(
            critical_surface_density_prefactor(),
            1.662_916_5e18,
            max_relative = 1e-6
        );
    }
}
