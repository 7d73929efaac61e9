//! Lensing models.
//!
//! Searches and solves built on the capability traits in
//! [`crate::support::lens`].

pub mod critical_radius;

pub use critical_radius::{
    CriticalRadiusConfig, CriticalRadiusError, RadialSearch, critical_radius, thick_critical_radius,
};
