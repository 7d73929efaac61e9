use crate::support::{
    autodiff::Real,
    cosmology::Cosmology,
    param::{Packed, Parametrized},
    tensor::{Batch, Tensor, broadcast_map, unzip},
};

use super::super::{LensError, magnification};

const REDUCED_DEFLECTION_DEPRECATED: &str = "ThickLens objects do not have a reduced deflection \
    angle since they have no unique lens redshift. The distance D_{ls} is undefined in the equation \
    $\\alpha_{reduced} = \\frac{D_{ls}}{D_s}\\alpha_{physical}$. See \
    `effective_reduced_deflection_angle`. Now using effective_reduced_deflection_angle, please \
    switch functions to remove this warning";

/// A lens with mass spread along the line of sight.
///
/// A thick lens has no single lens redshift, so quantities defined relative
/// to a lens plane either do not exist or are only available in an
/// effective sense. Implementors supply a pointwise ray-tracing kernel
/// together with surface density and time delay; everything else is derived
/// from the kernel.
pub trait ThickLens: Parametrized {
    type Cosmology: Cosmology;

    fn cosmology(&self) -> &Self::Cosmology;

    /// Source-plane position `(β_x, β_y)` of one ray, in arcsec.
    ///
    /// `params` holds this lens's resolved parameter values in declaration
    /// order.
    fn raytrace_at<S: Real>(&self, x: S, y: S, z_s: f64, params: &[f64]) -> (S, S);

    /// Projected surface mass density.
    ///
    /// # Errors
    ///
    /// Implementations without a meaningful definition return
    /// [`LensError::NotImplemented`].
    fn surface_density(
        &self,
        x: &Tensor,
        y: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, LensError>;

    /// Gravitational time delay in seconds.
    ///
    /// # Errors
    ///
    /// Implementations without a meaningful definition return
    /// [`LensError::NotImplemented`].
    fn time_delay(
        &self,
        x: &Tensor,
        y: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, LensError>;

    /// Source-plane positions of every ray.
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

    /// Effective reduced deflection `(x − β_x, y − β_y)`.
    ///
    /// This assumes `α = θ − β`, which is the only deflection angle a thick
    /// lens defines.
    ///
    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn effective_reduced_deflection_angle(
        &self,
        x: &Tensor,
        y: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<(Tensor, Tensor), LensError> {
        let (bx, by) = self.raytrace(x, y, z_s, params)?;
        Ok((
            broadcast_map([x, &bx], |[x, bx]| x - bx)?,
            broadcast_map([y, &by], |[y, by]| y - by)?,
        ))
    }

    /// Deprecated alias of [`ThickLens::effective_reduced_deflection_angle`].
    ///
    /// Emits one warning per call explaining that `D_ls` is undefined for a
    /// thick lens, then returns the effective deflection.
    ///
    /// # Errors
    ///
    /// Same as [`ThickLens::effective_reduced_deflection_angle`].
    #[deprecated(note = "use `effective_reduced_deflection_angle`")]
    fn reduced_deflection_angle(
        &self,
        x: &Tensor,
        y: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<(Tensor, Tensor), LensError> {
        tracing::warn!("{REDUCED_DEFLECTION_DEPRECATED}");
        self.effective_reduced_deflection_angle(x, y, z_s, params)
    }

    /// Always fails: physical deflection is defined relative to a single
    /// lens plane.
    ///
    /// # Errors
    ///
    /// Always returns [`LensError::NotImplemented`].
    fn physical_deflection_angle(
        &self,
        _x: &Tensor,
        _y: &Tensor,
        _z_s: &Tensor,
        _params: Option<&Packed>,
    ) -> Result<(Tensor, Tensor), LensError> {
        Err(LensError::NotImplemented {
            capability: "physical_deflection_angle",
            reason: "Physical deflection angles are computed with respect to a lensing plane. \
                ThickLens objects have no unique definition of a lens plane and so cannot \
                compute a physical_deflection_angle",
        })
    }

    /// Magnification `1 / det(∂β/∂θ)`.
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

    /// Jacobian `∂β/∂θ`, shape `(..., 2, 2)`.
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
