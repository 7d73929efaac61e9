//! Supporting utilities and the lensing core.
//!
//! - [`lens`]: lens capability traits, the magnification utility and
//!   concrete profiles.
//! - [`cosmology`]: distance models consumed by lenses.
//! - [`param`]: ordered parameter schemas and per-call overrides.
//! - [`tensor`]: broadcasting and FFT helpers over `ndarray`.
//! - [`autodiff`]: forward-mode jets for exact local Jacobians.
//! - [`constraint`]: numeric invariants checked at construction.
//! - [`units`]: physical constants and unit conversions.

pub mod autodiff;
pub mod constraint;
pub mod cosmology;
pub mod lens;
pub mod param;
pub mod tensor;
pub mod units;
