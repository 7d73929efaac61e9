//! Jacobian and magnification of a ray-tracing map.
//!
//! Shared by both lens kinds: the ray-tracing kernel is evaluated once per
//! point on [`Jet`] inputs seeded for `x` and `y`, which gives the full
//! observed-to-source Jacobian `∂β/∂θ` alongside the traced position.

use ndarray::ArrayD;

use crate::support::{
    autodiff::Jet,
    tensor::{Batch, Tensor, TensorError, stack_matrices},
};

fn jacobian_cells<F>(
    raytrace: F,
    x: &Tensor,
    y: &Tensor,
    z_s: &Tensor,
    params: &[Tensor],
) -> Result<ArrayD<[[f64; 2]; 2]>, TensorError>
where
    F: Fn(Jet, Jet, f64, &[f64]) -> (Jet, Jet),
{
    Batch::new([x, y, z_s], params)?.map(|[x, y, z_s], p| {
        let (bx, by) = raytrace(Jet::x(x), Jet::y(y), z_s, p);
        [[bx.dx, bx.dy], [by.dx, by.dy]]
    })
}

/// The observed-to-source Jacobian `∂β/∂θ`, shape `(..., 2, 2)`.
///
/// `params` are the resolved parameter tensors the kernel expects, in
/// declaration order.
///
/// # Errors
///
/// Returns a [`TensorError`] if the inputs do not broadcast.
pub fn raytrace_jacobian<F>(
    raytrace: F,
    x: &Tensor,
    y: &Tensor,
    z_s: &Tensor,
    params: &[Tensor],
) -> Result<Tensor, TensorError>
where
    F: Fn(Jet, Jet, f64, &[f64]) -> (Jet, Jet),
{
    stack_matrices(&jacobian_cells(raytrace, x, y, z_s, params)?)
}

/// Magnification `1 / det(∂β/∂θ)` of a ray-tracing map.
///
/// Values are not clipped: near critical curves the determinant vanishes
/// and the result grows without bound or becomes infinite.
///
/// # Errors
///
/// Returns a [`TensorError`] if the inputs do not broadcast.
pub fn raytrace_magnification<F>(
    raytrace: F,
    x: &Tensor,
    y: &Tensor,
    z_s: &Tensor,
    params: &[Tensor],
) -> Result<Tensor, TensorError>
where
    F: Fn(Jet, Jet, f64, &[f64]) -> (Jet, Jet),
{
    let cells = jacobian_cells(raytrace, x, y, z_s, params)?;
    Ok(cells.mapv(|[[a, b], [c, d]]| 1.0 / (a * d - b * c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    use crate::support::tensor::{IntoTensor, scalar};

    fn scaling(x: Jet, y: Jet, _z_s: f64, p: &[f64]) -> (Jet, Jet) {
        (x * p[0], y * p[0])
    }

    #[test]
    fn uniform_scaling_magnifies_by_inverse_area() {
        let x = array![[0.0, 1.0], [2.0, 3.0]].into_tensor();
        let y = scalar(0.5);
        let mu = raytrace_magnification(scaling, &x, &y, &scalar(1.0), &[scalar(0.5)]).unwrap();
        assert_eq!(mu.shape(), &[2, 2]);
        for m in &mu {
            assert_relative_eq!(*m, 4.0);
        }
    }

    #[test]
    fn jacobian_rows_are_source_components() {
        let shear = |x: Jet, y: Jet, _: f64, _: &[f64]| (x + y * 0.3, y - x * 0.2);
        let jac = raytrace_jacobian(shear, &scalar(1.0), &scalar(2.0), &scalar(1.0), &[]).unwrap();
        assert_eq!(jac.shape(), &[2, 2]);
        assert_relative_eq!(jac[[0, 0]], 1.0);
        assert_relative_eq!(jac[[0, 1]], 0.3);
        assert_relative_eq!(jac[[1, 0]], -0.2);
        assert_relative_eq!(jac[[1, 1]], 1.0);
    }

    #[test]
    fn singular_map_gives_infinite_magnification() {
        let collapse = |x: Jet, _: Jet, _: f64, _: &[f64]| (x, x);
        let one = scalar(1.0);
        let mu = raytrace_magnification(collapse, &one, &one, &one, &[]).unwrap();
        assert!(mu.sum().is_infinite());
    }
}
