use crate::support::{
    constraint::{Constrained, StrictlyPositive, UnitInterval},
    param::{ParamError, ParamSchema, Parametrized},
    tensor::scalar,
    units::c_km_s,
};

use super::{Cosmology, IntegrationConfig};

/// Default dimensionless Hubble parameter, `H₀ / (100 km/s/Mpc)`.
const DEFAULT_H0: f64 = 0.6766;

/// Default present-day matter density fraction.
const DEFAULT_OM0: f64 = 0.30966;

/// Spatially flat ΛCDM cosmology with matter and a cosmological constant.
///
/// Parameters, in order:
///
/// | index | name  | units    |
/// |-------|-------|----------|
/// | 0     | `h0`  | unitless |
/// | 1     | `om0` | unitless |
///
/// The comoving distance is
/// `D_C(z) = (c / 100h₀) ∫₀ᶻ dz′ / √(Ω_m(1+z′)³ + 1 − Ω_m)`,
/// evaluated with the composite Simpson rule.
#[derive(Debug, Clone)]
pub struct FlatLambdaCdm {
    name: String,
    schema: ParamSchema,
    integration: IntegrationConfig,
}

impl FlatLambdaCdm {
    pub const H0: usize = 0;
    pub const OM0: usize = 1;

    /// A cosmology with the default `h0 = 0.6766` and `om0 = 0.30966`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Duplicate`] only if the schema is malformed,
    /// which cannot happen for the two fixed parameter names.
    pub fn new(name: &str) -> Result<Self, ParamError> {
        Self::build(name, Some(DEFAULT_H0), Some(DEFAULT_OM0))
    }

    /// A cosmology with explicit, validated parameter values.
    ///
    /// # Errors
    ///
    /// See [`FlatLambdaCdm::new`].
    pub fn with_values(
        name: &str,
        h0: Constrained<f64, StrictlyPositive>,
        om0: Constrained<f64, UnitInterval>,
    ) -> Result<Self, ParamError> {
        Self::build(name, Some(h0.into_inner()), Some(om0.into_inner()))
    }

    /// A cosmology whose `h0` and `om0` must be supplied on every call.
    ///
    /// # Errors
    ///
    /// See [`FlatLambdaCdm::new`].
    pub fn dynamic(name: &str) -> Result<Self, ParamError> {
        Self::build(name, None, None)
    }

    /// Replaces the quadrature settings.
    #[must_use]
    pub fn with_integration(mut self, integration: IntegrationConfig) -> Self {
        self.integration = integration;
        self
    }

    fn build(name: &str, h0: Option<f64>, om0: Option<f64>) -> Result<Self, ParamError> {
        let mut schema = ParamSchema::new();
        schema.declare(name, "h0", h0.map(scalar), "unitless")?;
        schema.declare(name, "om0", om0.map(scalar), "unitless")?;
        Ok(Self {
            name: name.to_owned(),
            schema,
            integration: IntegrationConfig::default(),
        })
    }

    /// Hubble distance `c / H₀` in Mpc.
    fn hubble_distance(h0: f64) -> f64 {
        c_km_s() / (100.0 * h0)
    }

    /// `1 / E(z)` for a flat universe without radiation.
    fn inverse_efunc(z: f64, om0: f64) -> f64 {
        let zp1 = 1.0 + z;
        1.0 / (om0 * zp1 * zp1 * zp1 + 1.0 - om0).sqrt()
    }
}

impl Parametrized for FlatLambdaCdm {
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

impl Cosmology for FlatLambdaCdm {
    fn comoving_distance_at(&self, z: f64, params: &[f64]) -> f64 {
        let (h0, om0) = (params[Self::H0], params[Self::OM0]);
        let n = self.integration.even_intervals();
        let h = z / n as f64;

        let interior: f64 = (1..n)
            .map(|i| {
                let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
                weight * Self::inverse_efunc(i as f64 * h, om0)
            })
            .sum();
        let integral =
            h / 3.0 * (Self::inverse_efunc(0.0, om0) + interior + Self::inverse_efunc(z, om0));

        Self::hubble_distance(h0) * integral
    }
}
