use std::sync::Arc;

use crate::support::{
    autodiff::Real,
    cosmology::Cosmology,
    param::{ParamError, ParamSchema, Parametrized},
    tensor::IntoTensor,
};

use super::super::{THIN_LENS_PARAMS, ThinLens, thin_lens_schema};

/// Uniform external shear centered on `(x0, y0)`.
///
/// Models the tidal distortion from mass outside the main lens. Parameters,
/// in order:
///
/// | index | name      | units    |
/// |-------|-----------|----------|
/// | 0     | `z_l`     | unitless |
/// | 1     | `x0`      | arcsec   |
/// | 2     | `y0`      | arcsec   |
/// | 3     | `gamma_1` | unitless |
/// | 4     | `gamma_2` | unitless |
///
/// With `Δ = θ − θ₀`:
/// `α_x = γ₁Δx + γ₂Δy`, `α_y = γ₂Δx − γ₁Δy`, `ψ = ½(Δx·α_x + Δy·α_y)`.
/// The shear carries no mass, so `κ = 0`.
#[derive(Debug, Clone)]
pub struct ExternalShear<C> {
    name: String,
    cosmology: Arc<C>,
    schema: ParamSchema,
}

impl<C: Cosmology> ExternalShear<C> {
    pub const X0: usize = THIN_LENS_PARAMS;
    pub const Y0: usize = THIN_LENS_PARAMS + 1;
    pub const GAMMA_1: usize = THIN_LENS_PARAMS + 2;
    pub const GAMMA_2: usize = THIN_LENS_PARAMS + 3;

    /// A shear with every parameter dynamic.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] only if the parameter names collide.
    pub fn new(name: &str, cosmology: Arc<C>) -> Result<Self, ParamError> {
        let mut schema = thin_lens_schema(name, None)?;
        schema.declare(name, "x0", None, "arcsec")?;
        schema.declare(name, "y0", None, "arcsec")?;
        schema.declare(name, "gamma_1", None, "unitless")?;
        schema.declare(name, "gamma_2", None, "unitless")?;
        Ok(Self {
            name: name.to_owned(),
            cosmology,
            schema,
        })
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

    /// Stores the shear center.
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

    /// Stores the shear components.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] if a key is unknown.
    pub fn with_shear(
        mut self,
        gamma_1: impl IntoTensor,
        gamma_2: impl IntoTensor,
    ) -> Result<Self, ParamError> {
        self.set_own("gamma_1", gamma_1.into_tensor())?;
        self.set_own("gamma_2", gamma_2.into_tensor())?;
        Ok(self)
    }
}

impl<C> Parametrized for ExternalShear<C> {
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

impl<C: Cosmology> ThinLens for ExternalShear<C> {
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
        let dx = x - params[Self::X0];
        let dy = y - params[Self::Y0];
        let (g1, g2) = (params[Self::GAMMA_1], params[Self::GAMMA_2]);
        (dx * g1 + dy * g2, dx * g2 - dy * g1)
    }

    fn convergence_at<S: Real>(&self, _x: S, _y: S, _z_s: f64, _params: &[f64]) -> S {
        S::zero()
    }

    fn potential_at<S: Real>(&self, x: S, y: S, z_s: f64, params: &[f64]) -> S {
        let dx = x - params[Self::X0];
        let dy = y - params[Self::Y0];
        let (ax, ay) = self.reduced_deflection_angle_at(x, y, z_s, params);
        (dx * ax + dy * ay) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    use crate::support::{
        constraint::StrictlyPositive,
        lens::{
            JacobianMethod, LensError,
            test_support::{TestCosmology, shear},
        },
        param::Packed,
        tensor::{IntoTensor, meshgrid, pixel_grid, scalar},
    };

    #[test]
    fn declares_base_params_first() {
        let lens = ExternalShear::new("shear", Arc::new(TestCosmology::default())).unwrap();
        let keys: Vec<String> = lens.schema().keys().collect();
        assert_eq!(
            keys,
            vec![
                "shear.z_l",
                "shear.x0",
                "shear.y0",
                "shear.gamma_1",
                "shear.gamma_2"
            ]
        );
    }

    #[test]
    fn raytrace_subtracts_reduced_deflection() {
        let lens = shear(0.1, -0.05);
        let (x, y) = meshgrid(&array![-1.0, 0.3, 2.0], &array![0.5, -1.5]);
        let z_s = scalar(1.0);

        let (ax, ay) = lens.reduced_deflection_angle(&x, &y, &z_s, None).unwrap();
        let (bx, by) = lens.raytrace(&x, &y, &z_s, None).unwrap();

        assert_eq!(bx, &x - &ax);
        assert_eq!(by, &y - &ay);
    }

    #[test]
    fn convergence_and_surface_density_vanish() {
        let lens = shear(0.1, 0.1);
        let (x, y) = pixel_grid(4, 2.0);
        let z_s = scalar(1.5);

        let kappa = lens.convergence(&x, &y, &z_s, None).unwrap();
        assert_eq!(kappa.shape(), &[4, 4]);
        assert!(kappa.iter().all(|k| *k == 0.0));

        let sigma = lens.surface_density(&x, &y, &z_s, None).unwrap();
        assert_eq!(sigma.shape(), &[4, 4]);
        assert!(sigma.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn autograd_jacobian_is_constant_shear_matrix() {
        let (g1, g2) = (0.12, -0.04);
        let lens = shear(g1, g2);
        let (x, y) = pixel_grid(5, 3.0);

        let jac = lens
            .jacobian_reduced_deflection_angle(
                &x,
                &y,
                &scalar(1.0),
                None,
                JacobianMethod::Autograd,
                None,
            )
            .unwrap();

        assert_eq!(jac.shape(), &[5, 5, 2, 2]);
        for i in 0..5 {
            for j in 0..5 {
                assert_relative_eq!(jac[[i, j, 0, 0]], g1, epsilon = 1e-15);
                assert_relative_eq!(jac[[i, j, 0, 1]], g2, epsilon = 1e-15);
                assert_relative_eq!(jac[[i, j, 1, 0]], g2, epsilon = 1e-15);
                assert_relative_eq!(jac[[i, j, 1, 1]], -g1, epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn fft_jacobian_of_zero_shear_is_identity() {
        let lens = shear(0.0, 0.0);
        let (x, y) = pixel_grid(8, 2.0);
        let pixelscale = StrictlyPositive::new(0.25).unwrap();

        let jac = lens
            .jacobian_reduced_deflection_angle(
                &x,
                &y,
                &scalar(1.0),
                None,
                JacobianMethod::Fft,
                Some(pixelscale),
            )
            .unwrap();

        assert_eq!(jac.shape(), &[8, 8, 2, 2]);
        for cell in jac.to_shape((64, 4)).unwrap().outer_iter() {
            assert_relative_eq!(cell[0], 1.0, epsilon = 1e-12);
            assert_relative_eq!(cell[1], 0.0, epsilon = 1e-12);
            assert_relative_eq!(cell[2], 0.0, epsilon = 1e-12);
            assert_relative_eq!(cell[3], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn fft_jacobian_without_pixelscale_is_rejected() {
        let lens = shear(0.1, 0.0);
        let (x, y) = pixel_grid(4, 1.0);
        let err = lens
            .jacobian_reduced_deflection_angle(
                &x,
                &y,
                &scalar(1.0),
                None,
                JacobianMethod::Fft,
                None,
            )
            .unwrap_err();
        match err {
            LensError::InvalidArgument { context } => assert!(context.contains("pixelscale")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn potential_is_half_the_deflection_projection() {
        let lens = shear(0.2, 0.1);
        let x = array![1.0, -2.0].into_tensor();
        let y = array![3.0, 0.5].into_tensor();
        let psi = lens.potential(&x, &y, &scalar(1.0), None).unwrap();
        // ψ = ½[γ₁(x² − y²) + 2γ₂xy]
        assert_relative_eq!(psi[[0]], -0.5, epsilon = 1e-12);
        assert_relative_eq!(psi[[1]], 0.5 * (0.75 - 0.2), epsilon = 1e-12);
    }

    #[test]
    fn dynamic_params_come_from_packed() {
        let lens = ExternalShear::new("ext", Arc::new(TestCosmology::default())).unwrap();
        let (x, y) = (scalar(1.0), scalar(0.0));

        let missing = lens.raytrace(&x, &y, &scalar(1.0), None).unwrap_err();
        assert!(matches!(missing, LensError::Param(_)));

        let packed = Packed::from_positional(
            lens.schema(),
            vec![
                scalar(0.5),
                scalar(0.0),
                scalar(0.0),
                array![0.1, 0.2].into_tensor(),
                scalar(0.0),
            ],
        )
        .unwrap();
        let (bx, _) = lens.raytrace(&x, &y, &scalar(1.0), Some(&packed)).unwrap();
        assert_eq!(bx.shape(), &[2]);
        assert_relative_eq!(bx[[0]], 0.9);
        assert_relative_eq!(bx[[1]], 0.8);
    }

    #[test]
    fn shifted_center_moves_the_field() {
        let lens = shear(0.1, 0.0).with_center(1.0, 0.0).unwrap();
        let (ax, ay) = lens
            .reduced_deflection_angle(&scalar(1.0), &scalar(0.0), &scalar(1.0), None)
            .unwrap();
        assert_eq!(ax.sum(), 0.0);
        assert_eq!(ay.sum(), 0.0);
    }
}
