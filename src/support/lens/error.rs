use thiserror::Error;

use crate::support::{cosmology::CosmologyError, param::ParamError, tensor::TensorError};

/// Errors raised by lens evaluations.
#[derive(Debug, Clone, Error)]
pub enum LensError {
    /// The lens kind has no definition for the requested quantity.
    #[error("{capability} is not implemented: {reason}")]
    NotImplemented {
        capability: &'static str,
        reason: &'static str,
    },

    /// An argument is missing or has an unsupported value.
    #[error("invalid argument: {context}")]
    InvalidArgument { context: String },

    #[error("parameter resolution failed")]
    Param(#[from] ParamError),

    #[error("tensor operation failed")]
    Tensor(#[from] TensorError),

    #[error("cosmology evaluation failed")]
    Cosmology(#[from] CosmologyError),
}
