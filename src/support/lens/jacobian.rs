use std::{fmt, str::FromStr};

use ndarray::{ArrayD, IxDyn};
use rustfft::FftPlanner;

use crate::support::tensor::{Tensor, TensorError, fft};

use super::LensError;

pub(super) const FFT_REQUIRES_PIXELSCALE: &str = "FFT lensing jacobian requires regular grid and \
    known pixelscale. Please include the pixelscale argument";

/// How a thin lens computes the Jacobian of its reduced deflection angle.
///
/// See [`ThinLens::jacobian_reduced_deflection_angle`](super::ThinLens).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JacobianMethod {
    /// Exact local derivatives of the deflection kernel by forward-mode
    /// differentiation. Works for any coordinate batch.
    #[default]
    Autograd,

    /// Spectral second derivatives of the potential. Requires a regular
    /// meshgrid and its pixel scale; the result is approximate near the
    /// grid edges.
    Fft,
}

impl FromStr for JacobianMethod {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "autograd" => Ok(Self::Autograd),
            "fft" => Ok(Self::Fft),
            _ => Err(LensError::InvalidArgument {
                context: "method should be one of: autograd, fft".into(),
            }),
        }
    }
}

impl fmt::Display for JacobianMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Autograd => "autograd",
            Self::Fft => "fft",
        })
    }
}

/// Lens-map Jacobian `[[1−ψ_xx, −ψ_xy], [−ψ_xy, 1−ψ_yy]]` from a sampled potential.
///
/// The last two axes of `psi` are the `(ny, nx)` axes of a regular meshgrid
/// with spacing `pixelscale`; any leading axes are treated as a batch of
/// independent grids. Regularity of the grid is not checked.
///
/// Wavenumbers are angular (`2π·fftfreq`), so `ψ_xx`, `ψ_yy` and `ψ_xy` are
/// true second derivatives in arcsec⁻². Wavenumbers in cycles per arcsec
/// would make them smaller by `(2π)²`. Each entry is the magnitude of the
/// inverse transform, so the sign of negative curvature is not kept.
///
/// # Errors
///
/// Returns [`TensorError::Rank`] if `psi` has fewer than two dimensions.
pub(super) fn fft_jacobian(psi: &Tensor, pixelscale: f64) -> Result<Tensor, TensorError> {
    let ndim = psi.ndim();
    if ndim < 2 {
        return Err(TensorError::Rank {
            expected: 2,
            actual: ndim,
        });
    }

    let (ny, nx) = (psi.shape()[ndim - 2], psi.shape()[ndim - 1]);
    let batch: usize = psi.shape()[..ndim - 2].iter().product();
    let grids = psi.to_shape((batch, ny, nx))?;

    let mut planner = FftPlanner::new();
    let mut data = Vec::with_capacity(batch * ny * nx * 4);
    for grid in grids.outer_iter() {
        let c = fft::curvature(grid, pixelscale, &mut planner);
        for ((xx, yy), xy) in c.xx.iter().zip(c.yy.iter()).zip(c.xy.iter()) {
            data.extend([1.0 - xx, -xy, -xy, 1.0 - yy]);
        }
    }

    let mut shape = psi.shape().to_vec();
    shape.extend([2, 2]);
    Ok(ArrayD::from_shape_vec(IxDyn(&shape), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::Array3;

    use crate::support::tensor::{pixel_grid, scalar};

    #[test]
    fn parses_known_methods() {
        assert_eq!(
            "autograd".parse::<JacobianMethod>().unwrap(),
            JacobianMethod::Autograd
        );
        assert_eq!("fft".parse::<JacobianMethod>().unwrap(), JacobianMethod::Fft);
        assert_eq!(JacobianMethod::Fft.to_string(), "fft");
    }

    #[test]
    fn rejects_unknown_method_listing_choices() {
        let err = "bogus".parse::<JacobianMethod>().unwrap_err();
        match err {
            LensError::InvalidArgument { context } => {
                assert!(context.contains("autograd") && context.contains("fft"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fft_jacobian_needs_a_grid() {
        let err = fft_jacobian(&scalar(1.0), 0.1).unwrap_err();
        assert!(matches!(
            err,
            TensorError::Rank {
                expected: 2,
                actual: 0
            }
        ));
    }

    #[test]
    fn fft_jacobian_keeps_batch_axes() {
        let psi = Array3::<f64>::zeros((3, 4, 5)).into_dyn();
        let jac = fft_jacobian(&psi, 0.05).unwrap();
        assert_eq!(jac.shape(), &[3, 4, 5, 2, 2]);
        assert_eq!(jac[[2, 3, 4, 0, 0]], 1.0);
        assert_eq!(jac[[2, 3, 4, 0, 1]], 0.0);
        assert_eq!(jac[[0, 0, 0, 1, 1]], 1.0);
    }

    #[test]
    fn fft_jacobian_recovers_gaussian_curvature() {
        let (a, b, d, n): (f64, f64, f64, usize) = (0.5, 0.9, 0.1, 64);
        let (x, y) = pixel_grid(n, d * n as f64);
        let psi = ndarray::Zip::from(&x)
            .and(&y)
            .map_collect(|&x, &y| (-x * x / (2.0 * a * a) - y * y / (2.0 * b * b)).exp());

        let jac = fft_jacobian(&psi, d).unwrap();
        assert_eq!(jac.shape(), &[n, n, 2, 2]);

        for i in (16..48).step_by(3) {
            for j in (16..48).step_by(3) {
                let (x, y, p) = (x[[i, j]], y[[i, j]], psi[[i, j]]);
                let psi_xx = p * (x * x / a.powi(4) - 1.0 / (a * a));
                let psi_yy = p * (y * y / b.powi(4) - 1.0 / (b * b));
                let psi_xy = p * x * y / (a * a * b * b);

                assert_relative_eq!(1.0 - jac[[i, j, 0, 0]], psi_xx.abs(), epsilon = 2e-3);
                assert_relative_eq!(1.0 - jac[[i, j, 1, 1]], psi_yy.abs(), epsilon = 2e-3);
                assert_relative_eq!(-jac[[i, j, 0, 1]], psi_xy.abs(), epsilon = 2e-3);
                assert_eq!(jac[[i, j, 0, 1]], jac[[i, j, 1, 0]]);
            }
        }
    }
}
