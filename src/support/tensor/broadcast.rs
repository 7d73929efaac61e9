use ndarray::{ArrayD, ArrayViewD, IxDyn};

use super::{Tensor, TensorError};

/// Computes the shape that all `shapes` broadcast to.
///
/// Shapes are right-aligned and each axis must either match or be `1`,
/// following numpy's rules. A zero-dimensional shape broadcasts with anything.
///
/// # Errors
///
/// Returns [`TensorError::Incompatible`] when two extents differ and neither is `1`.
pub fn broadcast_shape(shapes: &[&[usize]]) -> Result<Vec<usize>, TensorError> {
    let rank = shapes.iter().map(|shape| shape.len()).max().unwrap_or(0);
    let mut out = vec![1; rank];

    for shape in shapes {
        let offset = rank - shape.len();
        for (axis, &len) in shape.iter().enumerate() {
            let current = out[offset + axis];
            if current == 1 {
                out[offset + axis] = len;
            } else if len != 1 && len != current {
                return Err(TensorError::Incompatible {
                    left: out,
                    right: shape.to_vec(),
                });
            }
        }
    }

    Ok(out)
}

/// A set of tensors broadcast to one common shape, ready for pointwise evaluation.
///
/// A batch has `N` positional inputs (for lenses: `x`, `y`, `z_s`) and a
/// variable number of resolved parameter tensors in declaration order.
/// Nothing is copied; each input is a broadcast view of the caller's data.
#[derive(Debug, Clone)]
pub struct Batch<'a, const N: usize> {
    shape: Vec<usize>,
    inputs: [ArrayViewD<'a, f64>; N],
    params: Vec<ArrayViewD<'a, f64>>,
}

impl<'a, const N: usize> Batch<'a, N> {
    /// Broadcasts `inputs` and `params` together.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::Incompatible`] if the shapes cannot be broadcast.
    pub fn new(inputs: [&'a Tensor; N], params: &'a [Tensor]) -> Result<Self, TensorError> {
        let shapes: Vec<&[usize]> = inputs
            .iter()
            .map(|tensor| tensor.shape())
            .chain(params.iter().map(|tensor| tensor.shape()))
            .collect();
        let shape = broadcast_shape(&shapes)?;

        let view = |tensor: &'a Tensor| {
            tensor
                .broadcast(IxDyn(&shape))
                .ok_or_else(|| TensorError::Incompatible {
                    left: tensor.shape().to_vec(),
                    right: shape.clone(),
                })
        };

        let mut views = Vec::with_capacity(N);
        for tensor in inputs {
            views.push(view(tensor)?);
        }
        let inputs: [ArrayViewD<'a, f64>; N] =
            views
                .try_into()
                .map_err(|_: Vec<ArrayViewD<'a, f64>>| TensorError::Rank {
                    expected: N,
                    actual: 0,
                })?;

        let params = params.iter().map(view).collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            shape,
            inputs,
            params,
        })
    }

    /// The common broadcast shape.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of elements in the broadcast shape.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Returns `true` if the broadcast shape has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evaluates `f` at every point and collects the results in the broadcast shape.
    ///
    /// The closure receives the `N` input values and the resolved parameter
    /// values at that point, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::Shape`] if the results cannot be arranged in the
    /// broadcast shape.
    pub fn map<R>(
        &self,
        mut f: impl FnMut([f64; N], &[f64]) -> R,
    ) -> Result<ArrayD<R>, TensorError> {
        let mut inputs: Vec<_> = self.inputs.iter().map(|view| view.iter()).collect();
        let mut params: Vec<_> = self.params.iter().map(|view| view.iter()).collect();

        let mut args = [0.0; N];
        let mut values = vec![0.0; params.len()];
        let mut out = Vec::with_capacity(self.len());

        for _ in 0..self.len() {
            for (arg, iter) in args.iter_mut().zip(inputs.iter_mut()) {
                *arg = iter.next().copied().unwrap_or(f64::NAN);
            }
            for (value, iter) in values.iter_mut().zip(params.iter_mut()) {
                *value = iter.next().copied().unwrap_or(f64::NAN);
            }
            out.push(f(args, &values));
        }

        Ok(ArrayD::from_shape_vec(IxDyn(&self.shape), out)?)
    }
}

/// Broadcasts `inputs` together and maps `f` over every point.
///
/// # Errors
///
/// Returns [`TensorError::Incompatible`] if the shapes cannot be broadcast.
pub fn broadcast_map<const N: usize>(
    inputs: [&Tensor; N],
    mut f: impl FnMut([f64; N]) -> f64,
) -> Result<Tensor, TensorError> {
    Batch::new(inputs, &[])?.map(|args, _| f(args))
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    use crate::support::tensor::{IntoTensor, scalar};

    #[test]
    fn shapes_right_align() {
        assert_eq!(broadcast_shape(&[&[3, 1], &[4]]).unwrap(), vec![3, 4]);
        assert_eq!(broadcast_shape(&[&[], &[2, 5]]).unwrap(), vec![2, 5]);
        assert_eq!(broadcast_shape(&[]).unwrap(), Vec::<usize>::new());
        assert_eq!(broadcast_shape(&[&[0], &[1]]).unwrap(), vec![0]);
    }

    #[test]
    fn mismatched_extents_are_rejected() {
        let err = broadcast_shape(&[&[3], &[4]]).unwrap_err();
        assert!(matches!(err, TensorError::Incompatible { .. }));
    }

    #[test]
    fn batch_feeds_params_in_order() {
        let x = array![1.0, 2.0].into_tensor();
        let y = scalar(10.0);
        let params = vec![scalar(100.0), array![1000.0, 2000.0].into_tensor()];

        let batch = Batch::new([&x, &y], &params).unwrap();
        assert_eq!(batch.shape(), &[2]);

        let out = batch.map(|[x, y], p| x + y + p[0] + p[1]).unwrap();
        assert_eq!(out, array![1111.0, 2112.0].into_dyn());
    }

    #[test]
    fn zero_dimensional_batch_has_one_point() {
        let z = scalar(2.0);
        let batch = Batch::new([&z], &[]).unwrap();
        assert_eq!(batch.len(), 1);
        let out = batch.map(|[z], _| z * z).unwrap();
        assert_eq!(out.ndim(), 0);
        assert_eq!(out.sum(), 4.0);
    }

    #[test]
    fn incompatible_inputs_fail_without_panicking() {
        let a = array![1.0, 2.0, 3.0].into_tensor();
        let b = array![1.0, 2.0].into_tensor();
        assert!(broadcast_map([&a, &b], |[a, b]| a * b).is_err());
    }
}
