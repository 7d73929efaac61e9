//! Forward-mode differentiation over the two sky-plane coordinates.
//!
//! Lens kernels are written once, generically over [`Real`], and evaluated
//! either on plain `f64` values or on [`Jet`]s. A jet carries a value and its
//! partial derivatives with respect to the observed `x` and `y`, so evaluating
//! a kernel on `Jet::x(x)` and `Jet::y(y)` yields the kernel's local Jacobian
//! in a single pass.
//!
//! ```
//! use twine_lensing::support::autodiff::{Jet, Real};
//!
//! fn kernel<S: Real>(x: S, y: S) -> S {
//!     x * y + x.powi(2)
//! }
//!
//! let f = kernel(Jet::x(3.0), Jet::y(2.0));
//! assert_eq!(f.val, 15.0);
//! assert_eq!(f.dx, 8.0);
//! assert_eq!(f.dy, 3.0);
//! ```

mod jet;
mod real;

pub use jet::Jet;
pub use real::Real;
