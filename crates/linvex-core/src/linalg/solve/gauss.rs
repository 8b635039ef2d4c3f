//! Gauss elimination with partial pivoting.

use crate::Float;
use crate::config::LinalgConfig;
use crate::error::{CoreError, Result};
use crate::matrix::{Matrix, Vector};

/// Solve a square system `Ax = b` by Gauss elimination.
///
/// `A` and `b` are left untouched; see [`solve_gauss_in_place`] for the
/// destructive form.
///
/// ```
/// # use linvex_core::matrix::{Matrix, Vector};
/// # use linvex_core::linalg::solve::solve_gauss;
/// let a = Matrix::from_vec(vec![0.0_f64, 2.0, 3.0, 1.0], 2, 2).unwrap();
/// let b = Vector::from_vec(vec![4.0, 5.0]);
/// let x = solve_gauss(&a, &b).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-12);
/// assert!((x[1] - 2.0).abs() < 1e-12);
/// ```
pub fn solve_gauss<T: Float>(a: &Matrix<T>, b: &Vector<T>) -> Result<Vector<T>> {
    solve_gauss_with(a, b, &LinalgConfig::default())
}

/// Gauss elimination with an explicit singularity threshold.
pub fn solve_gauss_with<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    cfg: &LinalgConfig<T>,
) -> Result<Vector<T>> {
    let mut work = a.clone();
    let mut x = b.clone();
    solve_gauss_in_place(&mut work, &mut x, cfg)?;
    Ok(x)
}

/// Solve `Ax = b` in place: on success `b` holds `x` and `a` holds the
/// row-echelon form produced by the elimination.
///
/// Singularity is decided before anything is returned: when the largest
/// candidate pivot in a column satisfies
/// `|pivot| <= cfg.pivot_tol * max|a_ij|`, the call fails with
/// [`CoreError::SingularMatrix`]. Both buffers are then in an unspecified
/// partially eliminated state.
#[allow(clippy::needless_range_loop)]
pub fn solve_gauss_in_place<T: Float>(
    a: &mut Matrix<T>,
    b: &mut Vector<T>,
    cfg: &LinalgConfig<T>,
) -> Result<()> {
    let n = a.require_square("gauss")?;
    b.check_len(n, "gauss")?;
    let threshold = cfg.pivot_threshold(a.max_abs());

    let m = a.as_mut_slice();
    let x = b.as_mut_slice();

    for k in 0..n {
        // Partial pivoting
        let mut pivot_row = k;
        let mut pivot_abs = m[k * n + k].abs();
        for i in (k + 1)..n {
            let v = m[i * n + k].abs();
            if v > pivot_abs {
                pivot_abs = v;
                pivot_row = i;
            }
        }
        if pivot_abs <= threshold {
            log::debug!("gauss: column {k} of {n} has no usable pivot");
            return Err(CoreError::SingularMatrix { op: "gauss", n });
        }
        if pivot_row != k {
            for j in k..n {
                m.swap(k * n + j, pivot_row * n + j);
            }
            x.swap(k, pivot_row);
        }

        let pivot = m[k * n + k];
        for i in (k + 1)..n {
            let factor = m[i * n + k] / pivot;
            m[i * n + k] = T::zero();
            if factor == T::zero() {
                continue;
            }
            for j in (k + 1)..n {
                let mkj = m[k * n + j];
                m[i * n + j] -= factor * mkj;
            }
            let xk = x[k];
            x[i] -= factor * xk;
        }
    }

    // Back substitution
    for i in (0..n).rev() {
        let mut acc = x[i];
        for j in (i + 1)..n {
            acc -= m[i * n + j] * x[j];
        }
        x[i] = acc / m[i * n + i];
    }
    Ok(())
}
