//! # Twine Lensing
//!
//! Differentiable gravitational lensing models and model-building tools for
//! [Twine](https://github.com/isentropic-dev/twine).
//!
//! ## Crate layout
//!
//! - [`models`]: Domain-specific [`twine_core::Model`] implementations built
//!   on the lens capabilities, such as critical radius searches.
//! - [`support`]: The lensing core and the utilities it rests on.
//!
//! The heart of the crate is [`support::lens`]: the [`ThinLens`] and
//! [`ThickLens`] capability traits derive ray tracing, deflection, surface
//! density, time delays, Jacobians and magnification from a few pointwise
//! kernels supplied by each lens profile. Kernels are differentiated with
//! forward-mode jets ([`support::autodiff`]) and evaluated over
//! numpy-style broadcast batches ([`support::tensor`]).
//!
//! ## Utility code lifecycle
//!
//! Modules in [`support`] are part of the public API because they're useful,
//! but their APIs are not stable. Breaking changes may occur as needed.
//!
//! [`ThinLens`]: support::lens::ThinLens
//! [`ThickLens`]: support::lens::ThickLens

pub mod models;
pub mod support;
