use thiserror::Error;

/// Errors raised while combining or reshaping tensors.
#[derive(Debug, Clone, Error)]
pub enum TensorError {
    /// Two shapes cannot be broadcast together.
    #[error("shapes {left:?} and {right:?} are not broadcast-compatible")]
    Incompatible { left: Vec<usize>, right: Vec<usize> },

    /// An operation needs more dimensions than the input has.
    #[error("expected at least {expected} dimensions, got {actual}")]
    Rank { expected: usize, actual: usize },

    /// Data could not be arranged into the requested shape.
    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
