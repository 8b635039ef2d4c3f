//! Power iteration and inverse power iteration.
//!
//! Both converge to a single eigenpair under the usual assumption that the
//! targeted eigenvalue is simple and strictly separated in magnitude from
//! the rest. The estimate is the Rayleigh quotient of the normalized
//! iterate, and the iteration stops when its relative change drops to
//! `cfg.tol`.

use crate::Float;
use crate::config::{IterResult, LinalgConfig};
use crate::error::Result;
use crate::linalg::decomp::LuDecomposition;
use crate::matrix::{Matrix, Vector};

/// Default iteration cap for power and inverse power iteration.
const DEFAULT_MAX_ITER: usize = 1000;

/// An eigenvalue with its unit eigenvector.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenPair<T: Float> {
    pub value: T,
    pub vector: Vector<T>,
}

/// Dominant (largest magnitude) eigenpair by power iteration.
///
/// ```
/// # use linvex_core::matrix::Matrix;
/// # use linvex_core::linalg::eigen::power_iteration;
/// let a = Matrix::from_vec(vec![2.0_f64, 0.0, 0.0, 5.0], 2, 2).unwrap();
/// let res = power_iteration(&a).unwrap();
/// assert!(res.converged);
/// assert!((res.value.value - 5.0).abs() < 1e-6);
/// ```
pub fn power_iteration<T: Float>(a: &Matrix<T>) -> Result<IterResult<EigenPair<T>>> {
    power_iteration_with(a, &LinalgConfig::default())
}

/// Power iteration with an explicit configuration.
pub fn power_iteration_with<T: Float>(
    a: &Matrix<T>,
    cfg: &LinalgConfig<T>,
) -> Result<IterResult<EigenPair<T>>> {
    let n = a.require_square("power_iteration")?;
    iterate("power_iteration", n, cfg, |x| a.matvec(x))
}

/// Smallest-magnitude eigenpair by inverse power iteration.
///
/// `A` is factored once by LU; each step solves `A y = x`. A singular `A`
/// is reported as [`CoreError::SingularMatrix`](crate::CoreError::SingularMatrix):
/// zero is then an eigenvalue and the inverse does not exist.
pub fn inverse_power_iteration<T: Float>(a: &Matrix<T>) -> Result<IterResult<EigenPair<T>>> {
    inverse_power_iteration_with(a, &LinalgConfig::default())
}

/// Inverse power iteration with an explicit configuration.
pub fn inverse_power_iteration_with<T: Float>(
    a: &Matrix<T>,
    cfg: &LinalgConfig<T>,
) -> Result<IterResult<EigenPair<T>>> {
    let n = a.require_square("inverse_power_iteration")?;
    let lu = LuDecomposition::decompose_with(a, cfg)?;
    let res = iterate("inverse_power_iteration", n, cfg, |x| lu.solve(x))?;
    // The iteration estimated mu = 1 / lambda
    Ok(res.map(|pair| EigenPair {
        value: pair.value.recip(),
        vector: pair.vector,
    }))
}

/// Shared driver: `x <- apply(x) / ||apply(x)||`, tracking the Rayleigh
/// quotient `x^T apply(x)`.
fn iterate<T, F>(
    op: &'static str,
    n: usize,
    cfg: &LinalgConfig<T>,
    apply: F,
) -> Result<IterResult<EigenPair<T>>>
where
    T: Float,
    F: Fn(&Vector<T>) -> Result<Vector<T>>,
{
    let max_iter = cfg.max_iter_or(DEFAULT_MAX_ITER);

    let mut x = start_vector(n);
    let mut lambda = T::zero();
    let mut change = T::infinity();

    for iter in 1..=max_iter {
        let y = apply(&x)?;
        let next = x.dot(&y)?;
        let norm = y.norm();

        if norm <= T::zero() {
            // x lies in the null space: x is an eigenvector for 0
            log::debug!("{op}: {n}x{n} hit an exact zero eigenvalue at iteration {iter}");
            return Ok(IterResult::new(
                EigenPair {
                    value: T::zero(),
                    vector: x,
                },
                iter,
                0.0,
                true,
            ));
        }

        if iter > 1 {
            let scale = next.abs().max(T::min_positive());
            change = (next - lambda).abs() / scale;
        }
        lambda = next;
        x = y * norm.recip();

        log::trace!("{op}: iteration {iter}, estimate {lambda}, relative change {change}");
        if change <= cfg.tol {
            log::debug!("{op}: {n}x{n} converged after {iter} iterations");
            return Ok(IterResult::new(
                EigenPair {
                    value: lambda,
                    vector: x,
                },
                iter,
                change.to_f64(),
                true,
            ));
        }
    }

    log::warn!("{op}: {n}x{n} did not converge in {max_iter} iterations, relative change {change}");
    Ok(IterResult::new(
        EigenPair {
            value: lambda,
            vector: x,
        },
        max_iter,
        change.to_f64(),
        false,
    ))
}

/// Normalized start vector with distinct positive entries, so that it is
/// unlikely to be orthogonal to the target eigenvector.
fn start_vector<T: Float>(n: usize) -> Vector<T> {
    let mut x: Vector<T> = (0..n)
        .map(|i| T::one() + T::from_usize(i) / T::from_usize(n + 1))
        .collect();
    x.normalize();
    x
}
