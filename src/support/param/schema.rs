use crate::support::tensor::Tensor;

use super::{Packed, ParamError};

/// A declared model parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    owner: String,
    name: String,
    value: Option<Tensor>,
    units: &'static str,
}

impl Param {
    /// The hierarchical key, `"{owner}.{name}"`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}.{}", self.owner, self.name)
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stored value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn units(&self) -> &'static str {
        self.units
    }

    /// A dynamic parameter has no stored value and must be supplied per call.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.value.is_none()
    }

    /// Picks the override from `packed` or falls back to the stored value.
    fn resolve(&self, packed: Option<&Packed>) -> Result<Tensor, ParamError> {
        let key = self.key();
        match (packed.and_then(|p| p.get(&key)), &self.value) {
            (Some(given), Some(stored)) if given.shape() != stored.shape() => {
                Err(ParamError::ShapeMismatch {
                    key,
                    expected: stored.shape().to_vec(),
                    actual: given.shape().to_vec(),
                })
            }
            (Some(given), _) => Ok(given.clone()),
            (None, Some(stored)) => Ok(stored.clone()),
            (None, None) => Err(ParamError::Missing { key }),
        }
    }
}

/// Ordered parameter declarations of a model.
///
/// Declaration order is the order in which [`ParamSchema::resolve`] yields
/// values. Composite models build their schema by extending with the
/// schemas of their parts, so a part's parameters stay contiguous.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSchema {
    params: Vec<Param>,
}

impl ParamSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Duplicate`] if the key is already declared.
    pub fn declare(
        &mut self,
        owner: &str,
        name: &str,
        value: Option<Tensor>,
        units: &'static str,
    ) -> Result<(), ParamError> {
        self.push(Param {
            owner: owner.to_owned(),
            name: name.to_owned(),
            value,
            units,
        })
    }

    /// Appends every parameter of `other`, preserving its order.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Duplicate`] on the first key both schemas declare.
    pub fn extend(&mut self, other: &ParamSchema) -> Result<(), ParamError> {
        other
            .params
            .iter()
            .try_for_each(|param| self.push(param.clone()))
    }

    fn push(&mut self, param: Param) -> Result<(), ParamError> {
        let key = param.key();
        if self.index_of(&key).is_some() {
            return Err(ParamError::Duplicate { key });
        }
        self.params.push(param);
        Ok(())
    }

    /// Position of `key` in declaration order.
    #[must_use]
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.params.iter().position(|param| param.key() == key)
    }

    /// Replaces the stored value of the parameter at `key`.
    ///
    /// Passing a value makes a dynamic parameter static; its shape becomes
    /// the shape later overrides must match.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Unknown`] if no parameter has that key.
    pub fn set(&mut self, key: &str, value: Tensor) -> Result<(), ParamError> {
        let index = self.index_of(key).ok_or_else(|| ParamError::Unknown {
            key: key.to_owned(),
        })?;
        self.params[index].value = Some(value);
        Ok(())
    }

    /// Resolves every parameter in declaration order.
    ///
    /// Keys in `packed` that this schema does not declare are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Missing`] for a dynamic parameter with no
    /// override, or [`ParamError::ShapeMismatch`] for an override whose shape
    /// differs from the stored value's.
    pub fn resolve(&self, packed: Option<&Packed>) -> Result<Vec<Tensor>, ParamError> {
        self.params.iter().map(|param| param.resolve(packed)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.params.iter().map(Param::key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
