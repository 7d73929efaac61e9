use crate::support::{
    autodiff::{Jet, Real},
    constraint::{Constrained, StrictlyPositive},
    cosmology::Cosmology,
    param::{Packed, ParamError, Parametrized},
    tensor::{Batch, Tensor, broadcast_map, stack_matrices, unzip},
    units::{arcsec_to_rad, c_mpc_s},
};

use super::super::{
    JacobianMethod, LensError, Z_L,
    jacobian::{FFT_REQUIRES_PIXELSCALE, fft_jacobian},
    magnification,
};

/// A lens whose mass lies in a single plane at redshift `z_l`.
///
/// Implementors declare `z_l` first in their schema (see
/// [`thin_lens_schema`](super::super::thin_lens_schema)) and supply three
/// pointwise kernels. Each kernel receives one point's coordinates in arcsec,
/// the source redshift, and the lens's resolved parameter values in
/// declaration order, so `params[Z_L]` is always the lens redshift.
///
/// Kernels must be free of branches on coordinate values that would break
/// differentiability; they are evaluated on [`Jet`]s for Jacobians and
/// magnification.
pub trait ThinLens: Parametrized {
    type Cosmology: Cosmology;

    fn cosmology(&self) -> &Self::Cosmology;

    /// Reduced deflection angle `(α_x, α_y)` in arcsec.
    fn reduced_deflection_angle_at<S: Real>(&self, x: S, y: S, z_s: f64, params: &[f64]) -> (S, S);

    /// Dimensionless convergence `κ`.
    fn convergence_at<S: Real>(&self, x: S, y: S, z_s: f64, params: &[f64]) -> S;

    /// Lensing potential `ψ` in arcsec².
    fn potential_at<S: Real>(&self, x: S, y: S, z_s: f64, params: &[f64]) -> S;

    /// Source-plane position `(x − α_x, y − α_y)` of one ray.
    fn raytrace_at<S: Real>(&self, x: S, y: S, z_s: f64, params: &[f64]) -> (S, S) {
        let (ax, ay) = self.reduced_deflection_angle_at(x, y, z_s, params);
        (x - ax, y - ay)
    }

    /// The resolved lens redshift.
    ///
    /// # Errors
    ///
    /// Fails if the lens parameters cannot be resolved.
    fn z_l(&self, params: Option<&Packed>) -> Result<Tensor, LensError> {
        self.unpack(params)?
            .into_iter()
            .nth(Z_L)
            .ok_or_else(|| {
                LensError::Param(ParamError::Missing {
                    key: format!("{}.z_l", self.name()),
                })
            })
    }

    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn reduced_deflection_angle(
        &self,
        x: &Tensor,
        y: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<(Tensor, Tensor), LensError> {
        let values = self.unpack(params)?;
        let pairs = Batch::new([x, y, z_s], &values)?
            .map(|[x, y, z_s], p| self.reduced_deflection_angle_at(x, y, z_s, p))?;
        Ok(unzip(&pairs))
    }

    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn convergence(
        &self,
        x: &Tensor,
        y: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, LensError> {
        let values = self.unpack(params)?;
        Ok(Batch::new([x, y, z_s], &values)?
            .map(|[x, y, z_s], p| self.convergence_at(x, y, z_s, p))?)
    }

    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn potential(
        &self,
        x: &Tensor,
        y: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, LensError> {
        let values = self.unpack(params)?;
        Ok(Batch::new([x, y, z_s], &values)?
            .map(|[x, y, z_s], p| self.potential_at(x, y, z_s, p))?)
    }

    /// Physical deflection angle `(D_s / D_ls) · α` in arcsec.
    ///
    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn physical_deflection_angle(
        &self,
        x: &Tensor,
        y: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<(Tensor, Tensor), LensError> {
        let z_l = self.z_l(params)?;
        let cosmology = self.cosmology();
        let d_s = cosmology.angular_diameter_distance(z_s, params)?;
        let d_ls = cosmology.angular_diameter_distance_z1z2(&z_l, z_s, params)?;
        let (ax, ay) = self.reduced_deflection_angle(x, y, z_s, params)?;

        let scale = broadcast_map([&d_s, &d_ls], |[d_s, d_ls]| d_s / d_ls)?;
        Ok((
            broadcast_map([&ax, &scale], |[a, s]| s * a)?,
            broadcast_map([&ay, &scale], |[a, s]| s * a)?,
        ))
    }

    /// Surface mass density `κ · Σ_cr(z_l, z_s)` in M☉/Mpc².
    ///
    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn surface_density(
        &self,
        x: &Tensor,
        y: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, LensError> {
        let z_l = self.z_l(params)?;
        let sigma_cr = self
            .cosmology()
            .critical_surface_density(&z_l, z_s, params)?;
        let kappa = self.convergence(x, y, z_s, params)?;
        Ok(broadcast_map([&kappa, &sigma_cr], |[k, s]| k * s)?)
    }

    /// Source-plane positions `(x − α_x, y − α_y)`.
    ///
    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn raytrace(
        &self,
        x: &Tensor,
        y: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<(Tensor, Tensor), LensError> {
        let values = self.unpack(params)?;
        let pairs = Batch::new([x, y, z_s], &values)?
            .map(|[x, y, z_s], p| self.raytrace_at(x, y, z_s, p))?;
        Ok(unzip(&pairs))
    }

    /// Gravitational time delay in seconds.
    ///
    /// `Δt = (1 + z_l)/c · D_s·D_l/D_ls · [½(D_ls/D_s)²|α|² − ψ]`, with
    /// angles converted from arcsec to radians.
    ///
    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn time_delay(
        &self,
        x: &Tensor,
        y: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, LensError> {
        let z_l = self.z_l(params)?;
        let cosmology = self.cosmology();
        let d_l = cosmology.angular_diameter_distance(&z_l, params)?;
        let d_s = cosmology.angular_diameter_distance(z_s, params)?;
        let d_ls = cosmology.angular_diameter_distance_z1z2(&z_l, z_s, params)?;
        let (ax, ay) = self.reduced_deflection_angle(x, y, z_s, params)?;
        let psi = self.potential(x, y, z_s, params)?;

        let c = c_mpc_s();
        let rad2 = arcsec_to_rad().powi(2);
        Ok(broadcast_map(
            [&z_l, &d_l, &d_s, &d_ls, &ax, &ay, &psi],
            |[z_l, d_l, d_s, d_ls, ax, ay, psi]| {
                let factor = (1.0 + z_l) / c * d_s * d_l / d_ls;
                let fp = 0.5 * (d_ls / d_s).powi(2) * (ax * ax + ay * ay) - psi;
                factor * fp * rad2
            },
        )?)
    }

    /// Jacobian of the reduced deflection angle, shape `(..., 2, 2)`.
    ///
    /// Element `[i, j]` is `∂α_i/∂θ_j`. With [`JacobianMethod::Fft`] the
    /// inputs must be a regular meshgrid with spacing `pixelscale` and the
    /// result is the spectral estimate `[[1−ψ_xx, −ψ_xy], [−ψ_xy, 1−ψ_yy]]`.
    ///
    /// # Errors
    ///
    /// Returns [`LensError::InvalidArgument`] if the FFT method is requested
    /// without a `pixelscale`, and fails if parameters cannot be resolved or
    /// shapes do not broadcast.
    fn jacobian_reduced_deflection_angle(
        &self,
        x: &Tensor,
        y: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
        method: JacobianMethod,
        pixelscale: Option<Constrained<f64, StrictlyPositive>>,
    ) -> Result<Tensor, LensError> {
        match method {
            JacobianMethod::Autograd => {
                let values = self.unpack(params)?;
                let cells = Batch::new([x, y, z_s], &values)?.map(|[x, y, z_s], p| {
                    let (ax, ay) = self.reduced_deflection_angle_at(Jet::x(x), Jet::y(y), z_s, p);
                    [[ax.dx, ax.dy], [ay.dx, ay.dy]]
                })?;
                Ok(stack_matrices(&cells)?)
            }
            JacobianMethod::Fft => {
                let pixelscale = pixelscale.ok_or_else(|| LensError::InvalidArgument {
                    context: FFT_REQUIRES_PIXELSCALE.into(),
                })?;
                let psi = self.potential(x, y, z_s, params)?;
                Ok(fft_jacobian(&psi, pixelscale.into_inner())?)
            }
        }
    }

    /// Magnification `1 / det(∂β/∂θ)` of the lens map.
    ///
    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn magnification(
        &self,
        x: &Tensor,
        y: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, LensError> {
        let values = self.unpack(params)?;
        Ok(magnification::raytrace_magnification(
            |x, y, z_s, p| self.raytrace_at(x, y, z_s, p),
            x,
            y,
            z_s,
            &values,
        )?)
    }

    /// Jacobian `∂β/∂θ` of the lens map, shape `(..., 2, 2)`.
    ///
    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn raytrace_jacobian(
        &self,
        x: &Tensor,
        y: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, LensError> {
        let values = self.unpack(params)?;
        Ok(magnification::raytrace_jacobian(
            |x, y, z_s, p| self.raytrace_at(x, y, z_s, p),
            x,
            y,
            z_s,
            &values,
        )?)
    }
}
