//! Iterative solvers: Gauss-Seidel sweeps and residual iteration
//! (iterative refinement of a direct LU solve).

use crate::Float;
use crate::config::{IterResult, LinalgConfig};
use crate::error::{CoreError, Result};
use crate::linalg::decomp::LuDecomposition;
use crate::matrix::{Matrix, Vector};

/// Default sweep cap for Gauss-Seidel.
const GAUSS_SEIDEL_MAX_ITER: usize = 1000;

/// Gauss-Seidel fails once the residual exceeds `‖b‖` by this factor.
const DIVERGENCE_FACTOR: f64 = 1e4;

/// Consecutive growing sweeps, above `‖b‖`, that count as divergence.
const GROWTH_SWEEPS: usize = 25;

/// Default refinement cap for residual iteration.
const REFINEMENT_MAX_ITER: usize = 32;

/// `b - A x`
fn residual<T: Float>(a: &Matrix<T>, x: &Vector<T>, b: &Vector<T>) -> Result<Vector<T>> {
    let ax = a.matvec(x)?;
    b.sub_checked(&ax)
}

// ======================================================================
// Gauss-Seidel
// ======================================================================

/// Solve `Ax = b` with Gauss-Seidel sweeps starting from `x = 0`.
///
/// Converges for strictly diagonally dominant and for symmetric positive
/// definite `A`. Stops when `||b - Ax|| <= cfg.tol * ||b||`.
///
/// ```
/// # use linvex_core::matrix::{Matrix, Vector};
/// # use linvex_core::linalg::solve::solve_gauss_seidel;
/// let a = Matrix::from_vec(vec![4.0_f64, 1.0, 2.0, 5.0], 2, 2).unwrap();
/// let b = Vector::from_vec(vec![5.0, 7.0]);
/// let res = solve_gauss_seidel(&a, &b).unwrap();
/// assert!(res.converged);
/// assert!((res.value[0] - 1.0).abs() < 1e-6);
/// assert!((res.value[1] - 1.0).abs() < 1e-6);
/// ```
pub fn solve_gauss_seidel<T: Float>(a: &Matrix<T>, b: &Vector<T>) -> Result<IterResult<Vector<T>>> {
    solve_gauss_seidel_with(a, b, &LinalgConfig::default())
}

/// Gauss-Seidel with an explicit tolerance and sweep cap.
///
/// A zero diagonal entry fails with [`CoreError::SingularMatrix`]. The
/// iteration fails with [`CoreError::Diverged`] when the residual turns
/// non-finite, exceeds `1e4 ||b||`, or grows for 25 sweeps in a row while
/// above `||b||`. Reaching the cap is a soft failure that returns the
/// iterate with the smallest residual.
pub fn solve_gauss_seidel_with<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    cfg: &LinalgConfig<T>,
) -> Result<IterResult<Vector<T>>> {
    let n = a.require_square("gauss_seidel")?;
    b.check_len(n, "gauss_seidel")?;
    let max_iter = cfg.max_iter_or(GAUSS_SEIDEL_MAX_ITER);

    let threshold = cfg.pivot_threshold(a.max_abs());
    if (0..n).any(|i| a[(i, i)].abs() <= threshold) {
        return Err(CoreError::SingularMatrix {
            op: "gauss_seidel",
            n,
        });
    }

    let b_norm = b.norm();
    let target = if b_norm > T::zero() {
        cfg.tol * b_norm
    } else {
        cfg.tol
    };

    let data = a.as_slice();
    let mut x = Vector::zeros(n);
    let mut r_norm = b_norm;
    if r_norm <= target {
        return Ok(IterResult::new(x, 0, r_norm.to_f64(), true));
    }

    let blow_up = T::from_f64(DIVERGENCE_FACTOR) * b_norm;
    let mut best = x.clone();
    let mut best_norm = r_norm;
    let mut growing = 0;

    for iter in 1..=max_iter {
        for i in 0..n {
            let row = &data[i * n..(i + 1) * n];
            let mut acc = b[i];
            for (j, (&aij, &xj)) in row.iter().zip(x.iter()).enumerate() {
                if j != i {
                    acc -= aij * xj;
                }
            }
            x[i] = acc / row[i];
        }

        let prev = r_norm;
        r_norm = residual(a, &x, b)?.norm();
        log::trace!("gauss_seidel: sweep {iter}, residual {r_norm}");
        if r_norm <= target {
            log::debug!("gauss_seidel: {n}x{n} converged after {iter} sweeps");
            return Ok(IterResult::new(x, iter, r_norm.to_f64(), true));
        }

        growing = if r_norm > prev && r_norm > b_norm {
            growing + 1
        } else {
            0
        };
        if !r_norm.is_finite() || r_norm > blow_up || growing >= GROWTH_SWEEPS {
            log::warn!("gauss_seidel: {n}x{n} diverged at sweep {iter}, residual {r_norm}");
            return Err(CoreError::Diverged {
                op: "gauss_seidel",
                iteration: iter,
            });
        }
        if r_norm < best_norm {
            best_norm = r_norm;
            best.as_mut_slice().copy_from_slice(x.as_slice());
        }
    }

    log::warn!("gauss_seidel: {n}x{n} did not converge in {max_iter} sweeps, residual {best_norm}");
    Ok(IterResult::new(best, max_iter, best_norm.to_f64(), false))
}

// ======================================================================
// Residual iteration
// ======================================================================

/// Solve `Ax = b` by LU, then refine: `r = b - Ax`, `A d = r`, `x += d`.
///
/// The factorization is computed once and reused for every correction.
/// Refinement stops when the residual reaches rounding level
/// (`||r|| <= n eps (||A|| ||x|| + ||b||)` in the infinity norm) or stops
/// decreasing; both count as converged. The iterate with the smallest
/// residual is returned.
pub fn solve_residual_iteration<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
) -> Result<IterResult<Vector<T>>> {
    solve_residual_iteration_with(a, b, &LinalgConfig::default())
}

/// Residual iteration with an explicit configuration.
pub fn solve_residual_iteration_with<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    cfg: &LinalgConfig<T>,
) -> Result<IterResult<Vector<T>>> {
    let n = a.require_square("residual_iteration")?;
    b.check_len(n, "residual_iteration")?;
    let max_iter = cfg.max_iter_or(REFINEMENT_MAX_ITER);

    let lu = LuDecomposition::decompose_with(a, cfg)?;
    let a_norm = a.norm_inf();
    let b_norm = b.norm_inf();
    let floor = T::from_usize(n) * T::epsilon();

    let mut x = lu.solve(b)?;
    let mut r = residual(a, &x, b)?;
    let mut best_norm = r.norm_inf();
    let mut best = x.clone();

    for iter in 1..=max_iter {
        if best_norm <= floor * (a_norm * best.norm_inf() + b_norm) {
            log::debug!("residual_iteration: {n}x{n} reached rounding level after {iter} solves");
            return Ok(IterResult::new(best, iter, best_norm.to_f64(), true));
        }

        let d = lu.solve(&r)?;
        x = &x + &d;
        r = residual(a, &x, b)?;
        let r_norm = r.norm_inf();
        log::trace!("residual_iteration: step {iter}, residual {r_norm}");

        if r_norm < best_norm {
            best_norm = r_norm;
            best = x.clone();
        } else {
            log::debug!("residual_iteration: {n}x{n} stagnated after {iter} corrections");
            return Ok(IterResult::new(best, iter, best_norm.to_f64(), true));
        }
    }

    log::warn!(
        "residual_iteration: {n}x{n} still improving after {max_iter} corrections, residual {best_norm}"
    );
    Ok(IterResult::new(best, max_iter, best_norm.to_f64(), false))
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn approx_eq(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| (x - y).abs() < tol)
    }

    fn dominant_3x3() -> Matrix<f64> {
        Matrix::from_vec(vec![10.0, -1.0, 2.0, -1.0, 11.0, -1.0, 2.0, -1.0, 10.0], 3, 3).unwrap()
    }

    #[test]
    fn test_gauss_seidel_dominant() {
        let a = dominant_3x3();
        let b = Vector::from_vec(vec![6.0, 25.0, -11.0]);
        let res = solve_gauss_seidel(&a, &b).unwrap();
        assert!(res.is_converged());
        assert!(res.iterations > 1);
        let exact = a.solve(&b).unwrap();
        assert!(approx_eq(res.value.as_slice(), exact.as_slice(), 1e-6));
    }

    #[test]
    fn test_gauss_seidel_zero_rhs() {
        let a = dominant_3x3();
        let res = solve_gauss_seidel(&a, &Vector::zeros(3)).unwrap();
        assert!(res.converged);
        assert_eq!(res.iterations, 0);
        assert!(res.value.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_gauss_seidel_zero_diagonal() {
        let a = Matrix::from_vec(vec![0.0, 1.0, 1.0, 0.0], 2, 2).unwrap();
        let b = Vector::from_vec(vec![1.0, 1.0]);
        assert!(matches!(
            solve_gauss_seidel(&a, &b),
            Err(CoreError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn test_gauss_seidel_diverges() {
        // Far from diagonally dominant: the iterates grow without bound
        let a = Matrix::from_vec(vec![1.0, 10.0, 10.0, 1.0], 2, 2).unwrap();
        let b = Vector::from_vec(vec![1.0, 1.0]);
        let cfg = LinalgConfig::default().with_max_iter(100_000);
        assert!(matches!(
            solve_gauss_seidel_with(&a, &b, &cfg),
            Err(CoreError::Diverged { .. })
        ));
    }

    #[test]
    fn test_gauss_seidel_slow_divergence() {
        // Iteration matrix has spectral radius 1.02^2, just above one
        let a = Matrix::from_vec(vec![1.0, 1.02, 1.02, 1.0], 2, 2).unwrap();
        let b = Vector::from_vec(vec![1.0, 1.0]);
        match solve_gauss_seidel(&a, &b) {
            Err(CoreError::Diverged { op, iteration }) => {
                assert_eq!(op, "gauss_seidel");
                assert!(iteration < 1000);
            }
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[test]
    fn test_gauss_seidel_cap_keeps_best() {
        // Convergent but slow: spectral radius 0.98^2
        let a = Matrix::from_vec(vec![1.0, 0.98, 0.98, 1.0], 2, 2).unwrap();
        let b = Vector::from_vec(vec![1.0, 1.0]);
        let cfg = LinalgConfig::default().with_max_iter(5);
        let res = solve_gauss_seidel_with(&a, &b, &cfg).unwrap();
        assert!(!res.converged);
        let r = residual(&a, &res.value, &b).unwrap().norm();
        assert!((r - res.residual).abs() < 1e-12);
        assert!(res.residual < b.norm());
    }

    #[test]
    fn test_gauss_seidel_cap_is_soft() {
        let a = dominant_3x3();
        let b = Vector::from_vec(vec![6.0, 25.0, -11.0]);
        let cfg = LinalgConfig::default().with_max_iter(2);
        let res = solve_gauss_seidel_with(&a, &b, &cfg).unwrap();
        assert!(!res.converged);
        assert_eq!(res.iterations, 2);
        assert!(res.residual > 0.0);
    }

    #[test]
    fn test_residual_iteration() {
        let a = Matrix::from_fn(5, 5, |i, j| 1.0 / (i + j + 1) as f64);
        let x_true = Vector::from_vec(vec![1.0, -1.0, 2.0, -2.0, 3.0]);
        let b = a.matvec(&x_true).unwrap();
        let res = solve_residual_iteration(&a, &b).unwrap();
        assert!(res.converged);
        let direct = solve_residual_iteration_with(&a, &b, &LinalgConfig::default().with_max_iter(1))
            .unwrap();
        // Refinement never makes the residual worse
        assert!(res.residual <= direct.residual);
        assert!(approx_eq(res.value.as_slice(), x_true.as_slice(), 1e-8));
    }

    #[test]
    fn test_residual_iteration_singular() {
        let a = Matrix::from_vec(vec![1.0, 2.0, 2.0, 4.0], 2, 2).unwrap();
        let b = Vector::from_vec(vec![1.0, 2.0]);
        assert!(solve_residual_iteration(&a, &b).is_err());
    }
}
