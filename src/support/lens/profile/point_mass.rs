use std::sync::Arc;

use crate::support::{
    autodiff::Real,
    constraint::{Constrained, NonNegative},
    cosmology::Cosmology,
    param::{ParamError, ParamSchema, Parametrized},
    tensor::IntoTensor,
};

use super::super::{THIN_LENS_PARAMS, ThinLens, thin_lens_schema};

/// A point mass with Einstein radius `th_ein`, optionally softened.
///
/// Parameters, in order:
///
/// | index | name     | units    |
/// |-------|----------|----------|
/// | 0     | `z_l`    | unitless |
/// | 1     | `x0`     | arcsec   |
/// | 2     | `y0`     | arcsec   |
/// | 3     | `th_ein` | arcsec   |
///
/// With `Δ = θ − θ₀` and `r² = |Δ|² + s²`:
/// `α = θ_E² Δ / r²`, `ψ = ½ θ_E² ln r²` and `κ = θ_E² s² / r⁴`.
/// The softening length `s` is fixed at construction and removes the
/// singularity at the center; with `s = 0` the convergence vanishes
/// everywhere off-center.
#[derive(Debug, Clone)]
pub struct PointMass<C> {
    name: String,
    cosmology: Arc<C>,
    schema: ParamSchema,
    softening: f64,
}

impl<C: Cosmology> PointMass<C> {
    pub const X0: usize = THIN_LENS_PARAMS;
    pub const Y0: usize = THIN_LENS_PARAMS + 1;
    pub const TH_EIN: usize = THIN_LENS_PARAMS + 2;

    /// An unsoftened point mass with every parameter dynamic.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] only if the parameter names collide.
    pub fn new(name: &str, cosmology: Arc<C>) -> Result<Self, ParamError> {
        let mut schema = thin_lens_schema(name, None)?;
        schema.declare(name, "x0", None, "arcsec")?;
        schema.declare(name, "y0", None, "arcsec")?;
        schema.declare(name, "th_ein", None, "arcsec")?;
        Ok(Self {
            name: name.to_owned(),
            cosmology,
            schema,
            softening: 0.0,
        })
    }

    /// Sets the softening length in arcsec.
    #[must_use]
    pub fn with_softening(mut self, softening: Constrained<f64, NonNegative>) -> Self {
        self.softening = softening.into_inner();
        self
    }

    /// Stores a lens redshift.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] if the key is unknown.
    pub fn with_z_l(mut self, z_l: impl IntoTensor) -> Result<Self, ParamError> {
        self.set_own("z_l", z_l.into_tensor())?;
        Ok(self)
    }

    /// Stores the position of the mass.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] if a key is unknown.
    pub fn with_center(
        mut self,
        x0: impl IntoTensor,
        y0: impl IntoTensor,
    ) -> Result<Self, ParamError> {
        self.set_own("x0", x0.into_tensor())?;
        self.set_own("y0", y0.into_tensor())?;
        Ok(self)
    }

    /// Stores the Einstein radius.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] if the key is unknown.
    pub fn with_einstein_radius(mut self, th_ein: impl IntoTensor) -> Result<Self, ParamError> {
        self.set_own("th_ein", th_ein.into_tensor())?;
        Ok(self)
    }

    /// Offset from the center and the softened squared radius.
    fn offset<S: Real>(&self, x: S, y: S, params: &[f64]) -> (S, S, S) {
        let dx = x - params[Self::X0];
        let dy = y - params[Self::Y0];
        let r2 = dx * dx + dy * dy + self.softening * self.softening;
        (dx, dy, r2)
    }
}

impl<C> Parametrized for PointMass<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    fn schema_mut(&mut self) -> &mut ParamSchema {
        &mut self.schema
    }
}

impl<C: Cosmology> ThinLens for PointMass<C> {
    type Cosmology = C;

    fn cosmology(&self) -> &C {
        &self.cosmology
    }

    fn reduced_deflection_angle_at<S: Real>(
        &self,
        x: S,
        y: S,
        _z_s: f64,
        params: &[f64],
    ) -> (S, S) {
        let (dx, dy, r2) = self.offset(x, y, params);
        let th2 = params[Self::TH_EIN].powi(2);
        (dx / r2 * th2, dy / r2 * th2)
    }

    fn convergence_at<S: Real>(&self, x: S, y: S, _z_s: f64, params: &[f64]) -> S {
        let (_, _, r2) = self.offset(x, y, params);
        let th2 = params[Self::TH_EIN].powi(2);
        S::constant(th2 * self.softening * self.softening) / (r2 * r2)
    }

    fn potential_at<S: Real>(&self, x: S, y: S, _z_s: f64, params: &[f64]) -> S {
        let (_, _, r2) = self.offset(x, y, params);
        let th2 = params[Self::TH_EIN].powi(2);
        r2.ln() * (0.5 * th2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    use crate::support::{
        lens::{JacobianMethod, test_support::point_mass},
        param::Packed,
        tensor::{IntoTensor, scalar},
        units::{arcsec_to_rad, c_mpc_s},
    };

    #[test]
    fn einstein_ring_maps_to_the_center() {
        let lens = point_mass(1.5);
        let (bx, by) = lens
            .raytrace(&scalar(1.5), &scalar(0.0), &scalar(1.0), None)
            .unwrap();
        assert_relative_eq!(bx.sum(), 0.0, epsilon = 1e-15);
        assert_relative_eq!(by.sum(), 0.0);
    }

    #[test]
    fn magnification_diverges_at_the_einstein_radius() {
        let lens = point_mass(1.0);
        let x = array![1.0 + 1e-6, 2.0].into_tensor();
        let mu = lens.magnification(&x, &scalar(0.0), &scalar(1.0), None).unwrap();

        assert!(mu[[0]].abs() > 1e4, "mu = {}", mu[[0]]);
        // 1 / (1 − θ_E⁴/r⁴) at r = 2θ_E.
        assert_relative_eq!(mu[[1]], 16.0 / 15.0, max_relative = 1e-12);
    }

    #[test]
    fn magnification_at_einstein_radius_is_not_an_error() {
        let lens = point_mass(1.0);
        let mu = lens
            .magnification(&scalar(1.0), &scalar(0.0), &scalar(1.0), None)
            .unwrap();
        assert!(!mu.sum().is_finite() || mu.sum().abs() > 1e12);
    }

    #[test]
    fn raytrace_jacobian_determinant_matches_magnification() {
        let lens = point_mass(1.2);
        let (x, y) = (scalar(0.7), scalar(-1.1));
        let z_s = scalar(2.0);

        let jac = lens.raytrace_jacobian(&x, &y, &z_s, None).unwrap();
        let det = jac[[0, 0]] * jac[[1, 1]] - jac[[0, 1]] * jac[[1, 0]];
        let mu = lens.magnification(&x, &y, &z_s, None).unwrap();
        assert_relative_eq!(mu.sum(), 1.0 / det, max_relative = 1e-12);
    }

    #[test]
    fn deflection_jacobian_is_symmetric_and_traceless() {
        let lens = point_mass(1.0);
        let jac = lens
            .jacobian_reduced_deflection_angle(
                &scalar(0.4),
                &scalar(0.9),
                &scalar(1.0),
                None,
                JacobianMethod::Autograd,
                None,
            )
            .unwrap();
        assert_relative_eq!(jac[[0, 1]], jac[[1, 0]], epsilon = 1e-14);
        assert_relative_eq!(jac[[0, 0]] + jac[[1, 1]], 0.0, epsilon = 1e-14);
    }

    #[test]
    fn softening_adds_central_convergence() {
        let cosmology = Arc::new(crate::support::lens::test_support::TestCosmology::default());
        let lens = PointMass::new("pm", cosmology)
            .unwrap()
            .with_softening(NonNegative::new(0.1).unwrap())
            .with_z_l(0.5)
            .unwrap()
            .with_center(0.0, 0.0)
            .unwrap()
            .with_einstein_radius(1.0)
            .unwrap();

        let kappa = lens
            .convergence(&scalar(0.0), &scalar(0.0), &scalar(1.0), None)
            .unwrap();
        assert_relative_eq!(kappa.sum(), 1.0 / 0.01, max_relative = 1e-12);
    }

    #[test]
    fn time_delay_scales_with_one_plus_z_l() {
        let lens = point_mass(1.0);
        let (x, y, z_s) = (scalar(0.8), scalar(0.3), scalar(2.0));

        let at = |z_l: f64| {
            let packed = Packed::new().with("pm.z_l", z_l);
            lens.time_delay(&x, &y, &z_s, Some(&packed)).unwrap().sum()
        };

        assert_relative_eq!(at(1.0) / at(0.5), 2.0 / 1.5, max_relative = 1e-12);
    }

    #[test]
    fn time_delay_matches_closed_form() {
        let lens = point_mass(1.0);
        let (x, y, z_s) = (scalar(2.0), scalar(0.0), scalar(2.0));
        let delay = lens.time_delay(&x, &y, &z_s, None).unwrap().sum();

        // TestCosmology: D_l = 1000, D_s = 2000, D_ls = 1200 Mpc; z_l = 0.5.
        let factor = 1.5 / c_mpc_s() * 2000.0 * 1000.0 / 1200.0;
        let alpha = 0.5;
        let psi = 0.5 * 4.0_f64.ln();
        let fp = 0.5 * (1200.0_f64 / 2000.0).powi(2) * alpha * alpha - psi;
        assert_relative_eq!(delay, factor * fp * arcsec_to_rad().powi(2), max_relative = 1e-12);
    }

    #[test]
    fn physical_deflection_rescales_by_distance_ratio() {
        let lens = point_mass(1.0);
        let (x, y, z_s) = (scalar(2.0), scalar(0.0), scalar(2.0));
        let (ax, _) = lens.reduced_deflection_angle(&x, &y, &z_s, None).unwrap();
        let (px, py) = lens.physical_deflection_angle(&x, &y, &z_s, None).unwrap();
        assert_relative_eq!(px.sum(), ax.sum() * 2000.0 / 1200.0, max_relative = 1e-12);
        assert_eq!(py.sum(), 0.0);
    }
}
