use std::sync::Arc;

use crate::support::{
    autodiff::Real,
    cosmology::Cosmology,
    param::{Packed, ParamError, ParamSchema, Parametrized},
    tensor::Tensor,
    units::arcsec_to_rad,
};

use super::super::{LensError, ThickLens, ThinLens, Z_L};

/// A stack of thin lens planes traversed in redshift order.
///
/// Rays start at the observer, propagate in comoving coordinates between
/// planes, and are deflected at each plane by that plane's physical
/// deflection angle. Planes at or behind the source redshift do not deflect.
///
/// The schema is every plane's schema in the order the planes were given,
/// followed by the cosmology's schema, so plane keys must be unique. Stored
/// values are copied from the planes at construction; later changes go
/// through [`Parametrized::set`] on the multiplane itself. Every plane is
/// expected to share the multiplane's cosmology.
#[derive(Debug, Clone)]
pub struct Multiplane<L: ThinLens> {
    name: String,
    cosmology: Arc<L::Cosmology>,
    lenses: Vec<L>,
    schema: ParamSchema,
    offsets: Vec<usize>,
}

impl<L: ThinLens> Multiplane<L> {
    /// Stacks `lenses` under one cosmology.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Duplicate`] if two planes, or a plane and the
    /// cosmology, declare the same key.
    pub fn new(
        name: &str,
        cosmology: Arc<L::Cosmology>,
        lenses: Vec<L>,
    ) -> Result<Self, ParamError> {
        let mut schema = ParamSchema::new();
        let mut offsets = Vec::with_capacity(lenses.len() + 1);
        for lens in &lenses {
            offsets.push(schema.len());
            schema.extend(lens.schema())?;
        }
        offsets.push(schema.len());
        schema.extend(cosmology.schema())?;

        Ok(Self {
            name: name.to_owned(),
            cosmology,
            lenses,
            schema,
            offsets,
        })
    }

    #[must_use]
    pub fn lenses(&self) -> &[L] {
        &self.lenses
    }

    /// Resolved values belonging to plane `index`.
    fn plane_params<'p>(&self, params: &'p [f64], index: usize) -> &'p [f64] {
        &params[self.offsets[index]..self.offsets[index + 1]]
    }

    /// Resolved values belonging to the cosmology.
    fn cosmology_params<'p>(&self, params: &'p [f64]) -> &'p [f64] {
        &params[self.offsets[self.lenses.len()]..]
    }
}

impl<L: ThinLens> Parametrized for Multiplane<L> {
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

impl<L: ThinLens> ThickLens for Multiplane<L> {
    type Cosmology = L::Cosmology;

    fn cosmology(&self) -> &L::Cosmology {
        &self.cosmology
    }

    fn raytrace_at<S: Real>(&self, x: S, y: S, z_s: f64, params: &[f64]) -> (S, S) {
        let cosmology = &*self.cosmology;
        let cp = self.cosmology_params(params);
        let to_rad = arcsec_to_rad();

        let mut order: Vec<usize> = (0..self.lenses.len())
            .filter(|&i| self.plane_params(params, i)[Z_L] < z_s)
            .collect();
        order.sort_by(|&a, &b| {
            self.plane_params(params, a)[Z_L].total_cmp(&self.plane_params(params, b)[Z_L])
        });

        // Transverse comoving position in Mpc and ray angle in arcsec.
        let (mut px, mut py) = (S::zero(), S::zero());
        let (mut theta_x, mut theta_y) = (x, y);
        let mut z_prev = 0.0;

        for i in order {
            let lens_params = self.plane_params(params, i);
            let z_l = lens_params[Z_L];

            let step = cosmology.transverse_comoving_distance_z1z2_at(z_prev, z_l, cp) * to_rad;
            px = px + theta_x * step;
            py = py + theta_y * step;

            let d_l = cosmology.transverse_comoving_distance_at(z_l, cp) * to_rad;
            let (ax, ay) =
                self.lenses[i].reduced_deflection_angle_at(px / d_l, py / d_l, z_s, lens_params);
            let scale = cosmology.angular_diameter_distance_at(z_s, cp)
                / cosmology.angular_diameter_distance_z1z2_at(z_l, z_s, cp);
            theta_x = theta_x - ax * scale;
            theta_y = theta_y - ay * scale;

            z_prev = z_l;
        }

        let step = cosmology.transverse_comoving_distance_z1z2_at(z_prev, z_s, cp) * to_rad;
        px = px + theta_x * step;
        py = py + theta_y * step;

        let d_s = cosmology.transverse_comoving_distance_at(z_s, cp) * to_rad;
        (px / d_s, py / d_s)
    }

    fn surface_density(
        &self,
        _x: &Tensor,
        _y: &Tensor,
        _z_s: &Tensor,
        _params: Option<&Packed>,
    ) -> Result<Tensor, LensError> {
        Err(LensError::NotImplemented {
            capability: "surface_density",
            reason: "a multiplane lens has no single plane to project its mass onto",
        })
    }

    fn time_delay(
        &self,
        _x: &Tensor,
        _y: &Tensor,
        _z_s: &Tensor,
        _params: Option<&Packed>,
    ) -> Result<Tensor, LensError> {
        Err(LensError::NotImplemented {
            capability: "time_delay",
            reason: "a multiplane lens has no single lens redshift to scale a delay by",
        })
    }
}
