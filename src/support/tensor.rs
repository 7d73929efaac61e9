//! Array substrate for batched lensing evaluations.
//!
//! Every field in this crate is a [`Tensor`], an `f64` array of any shape.
//! Coordinates, redshifts and parameter values combine under numpy-style
//! broadcasting, and the lens traits evaluate their pointwise kernels over a
//! [`Batch`] of broadcast inputs.
//!
//! ```
//! use ndarray::array;
//! use twine_lensing::support::tensor::{broadcast_map, scalar, IntoTensor};
//!
//! let x = array![[1.0, 2.0, 3.0]].into_tensor();
//! let y = array![[10.0], [20.0]].into_tensor();
//! let offset = scalar(0.5);
//!
//! let sum = broadcast_map([&x, &y, &offset], |[x, y, o]| x + y + o).unwrap();
//! assert_eq!(sum.shape(), &[2, 3]);
//! assert_eq!(sum[[1, 2]], 23.5);
//! ```

mod broadcast;
mod error;
pub(crate) mod fft;

use ndarray::{Array, Array1, ArrayD, Dimension, IxDyn};

pub use broadcast::{Batch, broadcast_map, broadcast_shape};
pub use error::TensorError;

/// An `f64` array of dynamic dimension.
pub type Tensor = ArrayD<f64>;

/// Conversion into a [`Tensor`].
///
/// Lets constructors and parameter setters accept plain scalars as well as
/// arrays of any fixed dimension.
pub trait IntoTensor {
    fn into_tensor(self) -> Tensor;
}

impl IntoTensor for f64 {
    fn into_tensor(self) -> Tensor {
        scalar(self)
    }
}

impl<D: Dimension> IntoTensor for Array<f64, D> {
    fn into_tensor(self) -> Tensor {
        self.into_dyn()
    }
}

/// Returns a zero-dimensional tensor holding `value`.
#[must_use]
pub fn scalar(value: f64) -> Tensor {
    ArrayD::from_elem(IxDyn(&[]), value)
}

/// Builds `(x, y)` coordinate grids from axis samples with `xy` indexing.
///
/// Both outputs have shape `(ys.len(), xs.len())`: `x` varies along the last
/// axis and `y` along the first, which is the layout the FFT Jacobian
/// expects.
#[must_use]
pub fn meshgrid(xs: &Array1<f64>, ys: &Array1<f64>) -> (Tensor, Tensor) {
    let shape = (ys.len(), xs.len());
    let x = Array::from_shape_fn(shape, |(_, j)| xs[j]).into_dyn();
    let y = Array::from_shape_fn(shape, |(i, _)| ys[i]).into_dyn();
    (x, y)
}

/// Square pixel grid of `n × n` pixel centers spanning `fov` arcseconds.
///
/// Pixel centers sit at `±(fov − pixelscale)/2`, with
/// `pixelscale = fov / n`.
#[must_use]
pub fn pixel_grid(n: usize, fov: f64) -> (Tensor, Tensor) {
    let half = fov / 2.0 - fov / (2.0 * n as f64);
    let axis = Array1::linspace(-half, half, n);
    meshgrid(&axis, &axis)
}

/// Splits a tensor of pairs into two tensors of the same shape.
#[must_use]
pub fn unzip(pairs: &ArrayD<(f64, f64)>) -> (Tensor, Tensor) {
    (pairs.mapv(|(a, _)| a), pairs.mapv(|(_, b)| b))
}

/// Stacks per-point 2×2 matrices into a tensor of shape `(..., 2, 2)`.
///
/// # Errors
///
/// Returns [`TensorError::Shape`] if the stacked data does not fit the
/// extended shape, which indicates a non-contiguous input.
pub fn stack_matrices(cells: &ArrayD<[[f64; 2]; 2]>) -> Result<Tensor, TensorError> {
    let mut shape = cells.shape().to_vec();
    shape.extend([2, 2]);
    let data: Vec<f64> = cells.iter().flatten().flatten().copied().collect();
    Ok(ArrayD::from_shape_vec(IxDyn(&shape), data)?)
}
