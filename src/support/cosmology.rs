//! Cosmological distances consumed by lens models.
//!
//! A [`Cosmology`] supplies one kernel, the line-of-sight comoving distance
//! to a redshift, and derives every other distance a lens needs from it.
//! Kernels are pointwise (`_at` suffix) and take the model's resolved
//! parameter values; the tensor-level methods resolve parameters from an
//! optional [`Packed`] override and broadcast over their redshift inputs.
//!
//! All distances are in megaparsecs and critical surface densities in
//! M☉/Mpc².

mod config;
mod error;
mod flat_lambda_cdm;

pub use config::IntegrationConfig;
pub use error::CosmologyError;
pub use flat_lambda_cdm::FlatLambdaCdm;

use crate::support::{
    param::{Packed, Parametrized},
    tensor::{Batch, Tensor},
    units::critical_surface_density_prefactor,
};

/// Distance model of a homogeneous universe.
pub trait Cosmology: Parametrized {
    /// Line-of-sight comoving distance to redshift `z`.
    fn comoving_distance_at(&self, z: f64, params: &[f64]) -> f64;

    /// Transverse comoving distance to redshift `z`.
    ///
    /// Equal to the line-of-sight distance in a spatially flat universe.
    fn transverse_comoving_distance_at(&self, z: f64, params: &[f64]) -> f64 {
        self.comoving_distance_at(z, params)
    }

    /// Transverse comoving distance between redshifts `z1` and `z2`.
    fn transverse_comoving_distance_z1z2_at(&self, z1: f64, z2: f64, params: &[f64]) -> f64 {
        self.transverse_comoving_distance_at(z2, params)
            - self.transverse_comoving_distance_at(z1, params)
    }

    fn angular_diameter_distance_at(&self, z: f64, params: &[f64]) -> f64 {
        self.transverse_comoving_distance_at(z, params) / (1.0 + z)
    }

    /// Angular diameter distance of `z2` as seen from `z1`.
    fn angular_diameter_distance_z1z2_at(&self, z1: f64, z2: f64, params: &[f64]) -> f64 {
        self.transverse_comoving_distance_z1z2_at(z1, z2, params) / (1.0 + z2)
    }

    /// `Σ_cr = c²/(4πG) · D_s / (D_l · D_ls)`.
    fn critical_surface_density_at(&self, z_l: f64, z_s: f64, params: &[f64]) -> f64 {
        let d_l = self.angular_diameter_distance_at(z_l, params);
        let d_s = self.angular_diameter_distance_at(z_s, params);
        let d_ls = self.angular_diameter_distance_z1z2_at(z_l, z_s, params);
        critical_surface_density_prefactor() * d_s / (d_l * d_ls)
    }

    /// `D_Δt = (1 + z_l) · D_l · D_s / D_ls`.
    fn time_delay_distance_at(&self, z_l: f64, z_s: f64, params: &[f64]) -> f64 {
        let d_l = self.angular_diameter_distance_at(z_l, params);
        let d_s = self.angular_diameter_distance_at(z_s, params);
        let d_ls = self.angular_diameter_distance_z1z2_at(z_l, z_s, params);
        (1.0 + z_l) * d_l * d_s / d_ls
    }

    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn comoving_distance(
        &self,
        z: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, CosmologyError> {
        let values = self.unpack(params)?;
        Ok(Batch::new([z], &values)?.map(|[z], p| self.comoving_distance_at(z, p))?)
    }

    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn transverse_comoving_distance(
        &self,
        z: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, CosmologyError> {
        let values = self.unpack(params)?;
        Ok(Batch::new([z], &values)?.map(|[z], p| self.transverse_comoving_distance_at(z, p))?)
    }

    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn transverse_comoving_distance_z1z2(
        &self,
        z1: &Tensor,
        z2: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, CosmologyError> {
        let values = self.unpack(params)?;
        Ok(Batch::new([z1, z2], &values)?
            .map(|[z1, z2], p| self.transverse_comoving_distance_z1z2_at(z1, z2, p))?)
    }

    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn angular_diameter_distance(
        &self,
        z: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, CosmologyError> {
        let values = self.unpack(params)?;
        Ok(Batch::new([z], &values)?.map(|[z], p| self.angular_diameter_distance_at(z, p))?)
    }

    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn angular_diameter_distance_z1z2(
        &self,
        z1: &Tensor,
        z2: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, CosmologyError> {
        let values = self.unpack(params)?;
        Ok(Batch::new([z1, z2], &values)?
            .map(|[z1, z2], p| self.angular_diameter_distance_z1z2_at(z1, z2, p))?)
    }

    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn critical_surface_density(
        &self,
        z_l: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, CosmologyError> {
        let values = self.unpack(params)?;
        Ok(Batch::new([z_l, z_s], &values)?
            .map(|[z_l, z_s], p| self.critical_surface_density_at(z_l, z_s, p))?)
    }

    /// # Errors
    ///
    /// Fails if parameters cannot be resolved or shapes do not broadcast.
    fn time_delay_distance(
        &self,
        z_l: &Tensor,
        z_s: &Tensor,
        params: Option<&Packed>,
    ) -> Result<Tensor, CosmologyError> {
        let values = self.unpack(params)?;
        Ok(Batch::new([z_l, z_s], &values)?
            .map(|[z_l, z_s], p| self.time_delay_distance_at(z_l, z_s, p))?)
    }
}
