use thiserror::Error;

use crate::support::{param::ParamError, tensor::TensorError};

/// Errors raised by tensor-level cosmology operations.
#[derive(Debug, Clone, Error)]
pub enum CosmologyError {
    #[error("cosmology parameter error")]
    Param(#[from] ParamError),

    #[error("cosmology tensor error")]
    Tensor(#[from] TensorError),
}
