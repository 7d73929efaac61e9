//! Spectral second derivatives of a sampled 2D field.

use std::{f64::consts::PI, sync::Arc};

use ndarray::{Array2, ArrayView2, s};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

/// Second partial derivatives of a field on a regular grid.
#[derive(Debug, Clone)]
pub(crate) struct Curvature {
    pub xx: Array2<f64>,
    pub yy: Array2<f64>,
    pub xy: Array2<f64>,
}

/// Angular sample frequencies of an `n`-point transform with sample spacing `d`.
///
/// Same ordering as numpy's `fftfreq` (non-negative frequencies first),
/// scaled by `2π` so that `∂/∂x ↔ i·k`.
pub(crate) fn angular_frequencies(n: usize, d: f64) -> Vec<f64> {
    let positive = n.div_ceil(2);
    (0..n)
        .map(|i| {
            let k = if i < positive {
                i as f64
            } else {
                i as f64 - n as f64
            };
            2.0 * PI * k / (n as f64 * d)
        })
        .collect()
}

/// Estimates `∂²f/∂x²`, `∂²f/∂y²` and `∂²f/∂x∂y` of `field` spectrally.
///
/// The field is zero-padded to twice its size on both axes, transformed,
/// weighted by `−kx²`, `−ky²` and `−kx·ky`, transformed back, and cropped to
/// the original extent. Magnitudes of the inverse transforms are returned.
///
/// Axis 0 of `field` is `y` and axis 1 is `x`, as produced by a meshgrid
/// with `xy` indexing.
pub(crate) fn curvature(
    field: ArrayView2<'_, f64>,
    pixelscale: f64,
    planner: &mut FftPlanner<f64>,
) -> Curvature {
    let (ny, nx) = field.dim();
    let (py, px) = (2 * ny, 2 * nx);
    tracing::debug!(ny, nx, py, px, "padding potential for spectral curvature");

    let mut spectrum = Array2::<Complex64>::zeros((py, px));
    spectrum
        .slice_mut(s![..ny, ..nx])
        .zip_mut_with(&field, |c, &v| *c = Complex64::new(v, 0.0));
    fft2(&mut spectrum, planner, false);

    let kx = angular_frequencies(px, pixelscale);
    let ky = angular_frequencies(py, pixelscale);

    let mut component = |weight: fn(f64, f64) -> f64| {
        let mut buf =
            Array2::from_shape_fn((py, px), |(i, j)| spectrum[[i, j]] * weight(kx[j], ky[i]));
        fft2(&mut buf, planner, true);
        let norm = 1.0 / (py * px) as f64;
        buf.slice(s![..ny, ..nx]).mapv(|c| (c * norm).norm())
    };

    Curvature {
        xx: component(|kx, _| -kx * kx),
        yy: component(|_, ky| -ky * ky),
        xy: component(|kx, ky| -kx * ky),
    }
}

/// In-place 2D transform: rows first, then columns.
///
/// The inverse transform is unnormalized.
fn fft2(data: &mut Array2<Complex64>, planner: &mut FftPlanner<f64>, inverse: bool) {
    let (rows, cols) = data.dim();

    let row_fft = plan(planner, cols, inverse);
    let mut buffer = vec![Complex64::default(); cols];
    for mut row in data.rows_mut() {
        buffer.iter_mut().zip(row.iter()).for_each(|(b, v)| *b = *v);
        row_fft.process(&mut buffer);
        row.iter_mut().zip(buffer.iter()).for_each(|(v, b)| *v = *b);
    }

    let col_fft = plan(planner, rows, inverse);
    let mut buffer = vec![Complex64::default(); rows];
    for mut col in data.columns_mut() {
        buffer.iter_mut().zip(col.iter()).for_each(|(b, v)| *b = *v);
        col_fft.process(&mut buffer);
        col.iter_mut().zip(buffer.iter()).for_each(|(v, b)| *v = *b);
    }
}

fn plan(planner: &mut FftPlanner<f64>, len: usize, inverse: bool) -> Arc<dyn Fft<f64>> {
    if inverse {
        planner.plan_fft_inverse(len)
    } else {
        planner.plan_fft_forward(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn frequencies_follow_fftfreq_ordering() {
        let k = angular_frequencies(4, 0.5);
        let unit = 2.0 * PI / 2.0;
        assert_relative_eq!(k[0], 0.0);
        assert_relative_eq!(k[1], unit);
        assert_relative_eq!(k[2], -2.0 * unit);
        assert_relative_eq!(k[3], -unit);

        let odd = angular_frequencies(5, 1.0);
        assert!(odd[2] > 0.0 && odd[3] < 0.0);
    }

    #[test]
    fn forward_then_inverse_recovers_field() {
        let mut planner = FftPlanner::new();
        let field = Array2::from_shape_fn((3, 4), |(i, j)| (i * 4 + j) as f64);
        let mut data = field.mapv(|v| Complex64::new(v, 0.0));

        fft2(&mut data, &mut planner, false);
        fft2(&mut data, &mut planner, true);

        for (out, expected) in data.iter().zip(field.iter()) {
            assert_relative_eq!(out.re / 12.0, *expected, epsilon = 1e-12);
            assert_relative_eq!(out.im / 12.0, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn flat_field_has_no_curvature() {
        let mut planner = FftPlanner::new();
        let field = Array2::<f64>::zeros((6, 6));
        let c = curvature(field.view(), 0.1, &mut planner);
        assert_eq!(c.xx.dim(), (6, 6));
        assert!(c.xx.iter().chain(c.yy.iter()).chain(c.xy.iter()).all(|v| *v == 0.0));
    }
}
