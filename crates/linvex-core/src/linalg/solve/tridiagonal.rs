//! Tridiagonal systems by the Thomas algorithm.
//!
//! The system is given by its three bands: `sub` (length n - 1, entries
//! `a[i+1][i]`), `diag` (length n) and `sup` (length n - 1, entries
//! `a[i][i+1]`). No pivoting is performed, so the method is meant for
//! diagonally dominant or symmetric positive definite bands.

use crate::Float;
use crate::config::LinalgConfig;
use crate::error::{CoreError, Result};
use crate::matrix::Vector;

fn check_bands<T: Float>(
    sub: &Vector<T>,
    diag: &Vector<T>,
    sup: &Vector<T>,
    b: &Vector<T>,
) -> Result<usize> {
    let n = diag.len();
    if n == 0 {
        return Err(CoreError::InvalidArgument {
            reason: "tridiagonal system needs a non-empty diagonal",
        });
    }
    sub.check_len(n - 1, "tridiagonal sub-diagonal")?;
    sup.check_len(n - 1, "tridiagonal super-diagonal")?;
    b.check_len(n, "tridiagonal rhs")?;
    Ok(n)
}

/// Solve a tridiagonal system, leaving the inputs untouched.
///
/// ```
/// # use linvex_core::matrix::Vector;
/// # use linvex_core::linalg::solve::solve_tridiagonal;
/// // [[2, 1, 0], [1, 2, 1], [0, 1, 2]] x = [3, 4, 3]
/// let sub = Vector::from_vec(vec![1.0_f64, 1.0]);
/// let diag = Vector::from_vec(vec![2.0, 2.0, 2.0]);
/// let sup = Vector::from_vec(vec![1.0, 1.0]);
/// let b = Vector::from_vec(vec![3.0, 4.0, 3.0]);
/// let x = solve_tridiagonal(&sub, &diag, &sup, &b).unwrap();
/// assert!(x.iter().all(|&v| (v - 1.0).abs() < 1e-12));
/// ```
pub fn solve_tridiagonal<T: Float>(
    sub: &Vector<T>,
    diag: &Vector<T>,
    sup: &Vector<T>,
    b: &Vector<T>,
) -> Result<Vector<T>> {
    solve_tridiagonal_with(sub, diag, sup, b, &LinalgConfig::default())
}

/// [`solve_tridiagonal`] with an explicit singularity threshold.
pub fn solve_tridiagonal_with<T: Float>(
    sub: &Vector<T>,
    diag: &Vector<T>,
    sup: &Vector<T>,
    b: &Vector<T>,
    cfg: &LinalgConfig<T>,
) -> Result<Vector<T>> {
    let mut work = diag.clone();
    let mut x = b.clone();
    solve_tridiagonal_in_place_with(sub, &mut work, sup, &mut x, cfg)?;
    Ok(x)
}

/// Solve a tridiagonal system in place: `b` is overwritten with the
/// solution and `diag` with the eliminated diagonal.
///
/// Fails with [`CoreError::SingularMatrix`] when an eliminated pivot drops
/// to `pivot_tol` times the largest band entry.
pub fn solve_tridiagonal_in_place<T: Float>(
    sub: &Vector<T>,
    diag: &mut Vector<T>,
    sup: &Vector<T>,
    b: &mut Vector<T>,
) -> Result<()> {
    solve_tridiagonal_in_place_with(sub, diag, sup, b, &LinalgConfig::default())
}

/// [`solve_tridiagonal_in_place`] with an explicit singularity threshold.
pub fn solve_tridiagonal_in_place_with<T: Float>(
    sub: &Vector<T>,
    diag: &mut Vector<T>,
    sup: &Vector<T>,
    b: &mut Vector<T>,
    cfg: &LinalgConfig<T>,
) -> Result<()> {
    let n = check_bands(sub, diag, sup, b)?;

    let scale = sub
        .iter()
        .chain(diag.iter())
        .chain(sup.iter())
        .fold(T::zero(), |acc, &v| acc.max(v.abs()));
    let threshold = cfg.pivot_threshold(scale);

    let d = diag.as_mut_slice();
    let x = b.as_mut_slice();

    // Forward elimination
    if d[0].abs() <= threshold {
        return Err(CoreError::SingularMatrix {
            op: "tridiagonal",
            n,
        });
    }
    for i in 1..n {
        let factor = sub[i - 1] / d[i - 1];
        d[i] -= factor * sup[i - 1];
        let prev = x[i - 1];
        x[i] -= factor * prev;
        if d[i].abs() <= threshold {
            log::debug!("tridiagonal: pivot {i} of {n} vanished");
            return Err(CoreError::SingularMatrix {
                op: "tridiagonal",
                n,
            });
        }
    }

    // Back substitution
    x[n - 1] /= d[n - 1];
    for i in (0..n - 1).rev() {
        let next = x[i + 1];
        x[i] = (x[i] - sup[i] * next) / d[i];
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;

    fn approx_eq(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| (x - y).abs() < tol)
    }

    fn dense(sub: &[f64], diag: &[f64], sup: &[f64]) -> Matrix<f64> {
        let n = diag.len();
        Matrix::from_fn(n, n, |i, j| {
            if i == j {
                diag[i]
            } else if i == j + 1 {
                sub[j]
            } else if j == i + 1 {
                sup[i]
            } else {
                0.0
            }
        })
    }

    #[test]
    fn test_matches_dense_solve() {
        let sub = [1.0, -2.0, 0.5, 1.5];
        let diag = [4.0, 5.0, 6.0, 4.5, 3.0];
        let sup = [2.0, 1.0, -1.0, 0.5];
        let b = Vector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let x = solve_tridiagonal(
            &Vector::from_slice(&sub),
            &Vector::from_slice(&diag),
            &Vector::from_slice(&sup),
            &b,
        )
        .unwrap();
        let expected = dense(&sub, &diag, &sup).solve(&b).unwrap();
        assert!(approx_eq(x.as_slice(), expected.as_slice(), 1e-12));
    }

    #[test]
    fn test_in_place() {
        let sub = Vector::from_vec(vec![-1.0, -1.0]);
        let mut diag = Vector::from_vec(vec![2.0, 2.0, 2.0]);
        let sup = Vector::from_vec(vec![-1.0, -1.0]);
        let mut b = Vector::from_vec(vec![1.0, 0.0, 1.0]);
        solve_tridiagonal_in_place(&sub, &mut diag, &sup, &mut b).unwrap();
        assert!(approx_eq(b.as_slice(), &[1.0, 1.0, 1.0], 1e-12));
        // Diagonal now holds the eliminated pivots
        assert!(approx_eq(diag.as_slice(), &[2.0, 1.5, 4.0 / 3.0], 1e-12));
    }

    #[test]
    fn test_1x1() {
        let empty = Vector::<f64>::zeros(0);
        let x = solve_tridiagonal(
            &empty,
            &Vector::from_vec(vec![4.0]),
            &empty,
            &Vector::from_vec(vec![2.0]),
        )
        .unwrap();
        assert_eq!(x.as_slice(), &[0.5]);
    }

    #[test]
    fn test_singular() {
        // [[1, 1], [1, 1]]
        let one = Vector::from_vec(vec![1.0]);
        let diag = Vector::from_vec(vec![1.0, 1.0]);
        let b = Vector::from_vec(vec![1.0, 2.0]);
        assert!(matches!(
            solve_tridiagonal(&one, &diag, &one, &b),
            Err(CoreError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn test_band_lengths() {
        let diag = Vector::from_vec(vec![1.0, 1.0, 1.0]);
        let short = Vector::from_vec(vec![1.0]);
        let ok = Vector::from_vec(vec![1.0, 1.0]);
        let b = Vector::from_vec(vec![1.0, 1.0, 1.0]);
        assert!(solve_tridiagonal(&short, &diag, &ok, &b).is_err());
        assert!(solve_tridiagonal(&ok, &diag, &short, &b).is_err());
        let empty = Vector::<f64>::zeros(0);
        assert!(solve_tridiagonal(&empty, &empty, &empty, &empty).is_err());
    }

    #[test]
    fn test_pivot_tol_sets_singularity() {
        // [[1, 1], [1, 1 + 1e-6]]: second pivot is 1e-6
        let one = Vector::from_vec(vec![1.0]);
        let diag = Vector::from_vec(vec![1.0, 1.0 + 1e-6]);
        let b = Vector::from_vec(vec![2.0, 2.0 + 1e-6]);

        let x = solve_tridiagonal(&one, &diag, &one, &b).unwrap();
        assert!(approx_eq(x.as_slice(), &[1.0, 1.0], 1e-8));

        let strict = LinalgConfig::default().with_pivot_tol(1e-4);
        assert!(matches!(
            solve_tridiagonal_with(&one, &diag, &one, &b, &strict),
            Err(CoreError::SingularMatrix { op: "tridiagonal", n: 2 })
        ));

        let mut d = diag.clone();
        let mut x = b.clone();
        assert!(solve_tridiagonal_in_place_with(&one, &mut d, &one, &mut x, &strict).is_err());

        let loose = LinalgConfig::default().with_pivot_tol(1e-8);
        let mut d = diag.clone();
        let mut x = b.clone();
        solve_tridiagonal_in_place_with(&one, &mut d, &one, &mut x, &loose).unwrap();
        assert!(approx_eq(x.as_slice(), &[1.0, 1.0], 1e-8));
    }
}
