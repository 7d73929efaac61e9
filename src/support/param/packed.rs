use std::collections::BTreeMap;

use crate::support::tensor::{IntoTensor, Tensor};

use super::{ParamError, ParamSchema};

/// Parameter values supplied for a single evaluation.
///
/// A `Packed` is read by every model it is passed to; each model picks out
/// the keys it declares and ignores the rest, so one `Packed` can carry the
/// values for a lens and its cosmology together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Packed {
    values: BTreeMap<String, Tensor>,
}

impl Packed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl IntoTensor) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl IntoTensor) {
        self.values.insert(key.into(), value.into_tensor());
    }

    /// Assigns `values` to the dynamic parameters of `schema` in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::PositionalCount`] unless there is exactly one
    /// value per dynamic parameter.
    pub fn from_positional(schema: &ParamSchema, values: Vec<Tensor>) -> Result<Self, ParamError> {
        let keys: Vec<String> = schema
            .iter()
            .filter(|param| param.is_dynamic())
            .map(super::Param::key)
            .collect();

        if keys.len() != values.len() {
            return Err(ParamError::PositionalCount {
                expected: keys.len(),
                actual: values.len(),
            });
        }

        Ok(Self {
            values: keys.into_iter().zip(values).collect(),
        })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Tensor> {
        self.values.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
