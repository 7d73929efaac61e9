//! Public Twine models.
//!
//! Models are organized into domain-specific submodules. Each model exposes
//! a plain function entry point backed by a [`twine_core::Model`] adapter
//! that the Twine solvers drive.

pub mod lensing;
