//! Linear system solvers.
//!
//! | Problem                              | Entry point                   | Method                           |
//! |--------------------------------------|-------------------------------|----------------------------------|
//! | Square `Ax = b`                      | [`solve_gauss`]               | Gauss elimination, partial pivot |
//! | Square `Ax = b`                      | [`solve_lu`]                  | LU factor + substitution         |
//! | Diagonally dominant `Ax = b`         | [`solve_gauss_seidel`]        | Gauss-Seidel sweeps              |
//! | Square `Ax = b`, extra accuracy      | [`solve_residual_iteration`]  | LU + iterative refinement        |
//! | Overdetermined least squares         | [`solve_normal_equations`]    | `A^T A x = A^T b`                |
//! | Weighted least squares               | [`solve_error_min`]           | `min (b-Ax)^T W (b-Ax)`          |
//! | Weighted minimum norm                | [`solve_norm_min`]            | `min x^T W x` s.t. `Ax = b`      |
//! | Reference tracking                   | [`solve_ref_min`]             | `min (x-r)^T W (x-r)` s.t. `Ax=b`|
//! | Any shape, rank deficient            | [`solve_mp`], [`solve_mp_aux`], [`solve_mp_null`] | pseudoinverse |
//! | Tridiagonal                          | [`solve_tridiagonal`]         | Thomas algorithm, O(n)           |
//! | Lyapunov `XA + A^T X = B`            | [`solve_lyapunov`]            | vectorized Gauss elimination     |

pub mod gauss;
pub mod iterative;
pub mod lstsq;
pub mod lyapunov;
pub mod tridiagonal;

pub use gauss::{solve_gauss, solve_gauss_in_place, solve_gauss_with};
pub use iterative::{
    solve_gauss_seidel, solve_gauss_seidel_with, solve_residual_iteration,
    solve_residual_iteration_with,
};
pub use lstsq::{
    solve_error_min, solve_error_min_with, solve_mp, solve_mp_aux, solve_mp_aux_with,
    solve_mp_null, solve_mp_null_with, solve_mp_with, solve_norm_min, solve_norm_min_with,
    solve_normal_equations, solve_normal_equations_with, solve_ref_min, solve_ref_min_with,
};
pub use lyapunov::{solve_lyapunov, solve_lyapunov_with};
pub use tridiagonal::{
    solve_tridiagonal, solve_tridiagonal_in_place, solve_tridiagonal_in_place_with,
    solve_tridiagonal_with,
};

use crate::Float;
use crate::config::LinalgConfig;
use crate::error::{CoreError, Result};
use crate::linalg::decomp::LuDecomposition;
use crate::matrix::{Matrix, Vector};

/// Solve a square system `Ax = b` through an LU factorization.
///
/// To solve for several right-hand sides, keep the
/// [`LuDecomposition`] and call its `solve` or `solve_matrix` instead.
///
/// ```
/// # use linvex_core::matrix::{Matrix, Vector};
/// # use linvex_core::linalg::solve::solve_lu;
/// let a = Matrix::from_vec(vec![2.0_f64, 1.0, 1.0, 3.0], 2, 2).unwrap();
/// let b = Vector::from_vec(vec![3.0, 5.0]);
/// let x = solve_lu(&a, &b).unwrap();
/// assert!((x[0] - 0.8).abs() < 1e-12);
/// assert!((x[1] - 1.4).abs() < 1e-12);
/// ```
pub fn solve_lu<T: Float>(a: &Matrix<T>, b: &Vector<T>) -> Result<Vector<T>> {
    solve_lu_with(a, b, &LinalgConfig::default())
}

/// LU solve with an explicit singularity threshold.
pub fn solve_lu_with<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    cfg: &LinalgConfig<T>,
) -> Result<Vector<T>> {
    b.check_len(a.rows(), "solve_lu")?;
    LuDecomposition::decompose_with(a, cfg)?.solve(b)
}

/// Check that a weight vector has the expected length and only positive,
/// finite entries.
pub(crate) fn check_weights<T: Float>(
    w: &Vector<T>,
    expected: usize,
    op: &'static str,
) -> Result<()> {
    w.check_len(expected, op)?;
    if w.iter().any(|&wi| wi <= T::zero() || !wi.is_finite()) {
        return Err(CoreError::InvalidArgument {
            reason: "weights must be positive and finite",
        });
    }
    Ok(())
}
