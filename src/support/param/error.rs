use thiserror::Error;

/// Errors raised while declaring or resolving parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// A dynamic parameter was not supplied.
    #[error("parameter `{key}` has no stored value and was not supplied")]
    Missing { key: String },

    /// No declared parameter has this key.
    #[error("unknown parameter `{key}`")]
    Unknown { key: String },

    /// A key was declared twice in one schema.
    #[error("parameter `{key}` is declared more than once")]
    Duplicate { key: String },

    /// An override does not have the shape of the stored value it replaces.
    #[error("parameter `{key}` expects shape {expected:?}, got {actual:?}")]
    ShapeMismatch {
        key: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The number of positional values differs from the number of dynamic parameters.
    #[error("expected {expected} positional parameter values, got {actual}")]
    PositionalCount { expected: usize, actual: usize },
}
