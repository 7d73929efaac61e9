use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    Layer,
    layer::{Context, SubscriberExt},
};

use crate::support::{
    cosmology::Cosmology,
    param::{ParamSchema, Parametrized},
};

use super::{ExternalShear, PointMass};

/// A cosmology with fixed distances, so lens arithmetic can be checked by hand.
///
/// `D_A(z)` is `d_l` up to `z = 1` and `d_s` beyond; every pairwise distance
/// is `d_ls`.
#[derive(Debug, Clone)]
pub(crate) struct TestCosmology {
    schema: ParamSchema,
    pub d_l: f64,
    pub d_s: f64,
    pub d_ls: f64,
}

impl Default for TestCosmology {
    fn default() -> Self {
        Self {
            schema: ParamSchema::new(),
            d_l: 1000.0,
            d_s: 2000.0,
            d_ls: 1200.0,
        }
    }
}

impl Parametrized for TestCosmology {
    fn name(&self) -> &str {
        "test_cosmology"
    }

    fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    fn schema_mut(&mut self) -> &mut ParamSchema {
        &mut self.schema
    }
}

impl Cosmology for TestCosmology {
    fn comoving_distance_at(&self, z: f64, params: &[f64]) -> f64 {
        self.angular_diameter_distance_at(z, params) * (1.0 + z)
    }

    fn angular_diameter_distance_at(&self, z: f64, _params: &[f64]) -> f64 {
        if z <= 1.0 { self.d_l } else { self.d_s }
    }

    fn angular_diameter_distance_z1z2_at(&self, _z1: f64, _z2: f64, _params: &[f64]) -> f64 {
        self.d_ls
    }
}

/// External shear named `shear` at `z_l = 0.5`, centered on the origin.
pub(crate) fn shear(gamma_1: f64, gamma_2: f64) -> ExternalShear<TestCosmology> {
    ExternalShear::new("shear", Arc::new(TestCosmology::default()))
        .and_then(|lens| lens.with_z_l(0.5))
        .and_then(|lens| lens.with_center(0.0, 0.0))
        .and_then(|lens| lens.with_shear(gamma_1, gamma_2))
        .expect("shear params are declared")
}

/// Unsoftened point mass named `pm` at `z_l = 0.5`, centered on the origin.
pub(crate) fn point_mass(th_ein: f64) -> PointMass<TestCosmology> {
    PointMass::new("pm", Arc::new(TestCosmology::default()))
        .and_then(|lens| lens.with_z_l(0.5))
        .and_then(|lens| lens.with_center(0.0, 0.0))
        .and_then(|lens| lens.with_einstein_radius(th_ein))
        .expect("point mass params are declared")
}

struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Runs `f` under a scoped subscriber and counts the warnings it emits.
pub(crate) fn count_warnings<R>(f: impl FnOnce() -> R) -> (R, usize) {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&count)));
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, count.load(Ordering::SeqCst))
}
