//! Continuous Lyapunov-type equation `X A + A^T X = B`.
//!
//! The equation is linear in the entries of `X`. Writing `X` row by row as a
//! vector of length `n^2` turns it into an `n^2 x n^2` system, solved by
//! Gauss elimination. The operator is singular exactly when two eigenvalues
//! of `A` sum to zero.

use crate::Float;
use crate::config::LinalgConfig;
use crate::error::{CoreError, Result};
use crate::matrix::{Matrix, Vector};

use super::gauss::solve_gauss_in_place;

/// Solve `X A + A^T X = B` for `X` (all n x n).
///
/// ```
/// # use linvex_core::matrix::Matrix;
/// # use linvex_core::linalg::solve::solve_lyapunov;
/// let a = Matrix::from_vec(vec![-1.0_f64, 0.0, 0.0, -2.0], 2, 2).unwrap();
/// let b = Matrix::from_vec(vec![-2.0, 0.0, 0.0, -4.0], 2, 2).unwrap();
/// let x = solve_lyapunov(&a, &b).unwrap();
/// assert!(x.approx_eq(&Matrix::eye(2), 1e-12));
/// ```
pub fn solve_lyapunov<T: Float>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>> {
    solve_lyapunov_with(a, b, &LinalgConfig::default())
}

/// Lyapunov solve with an explicit singularity threshold.
pub fn solve_lyapunov_with<T: Float>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    cfg: &LinalgConfig<T>,
) -> Result<Matrix<T>> {
    let n = a.require_square("lyapunov")?;
    if b.shape() != (n, n) {
        return Err(CoreError::DimensionMismatch {
            op: "lyapunov",
            expected: vec![n, n],
            got: vec![b.rows(), b.cols()],
        });
    }

    let nn = n * n;
    let mut system = Matrix::try_zeros(nn, nn)?;
    {
        let m = system.as_mut_slice();
        for i in 0..n {
            for j in 0..n {
                let row = i * n + j;
                for k in 0..n {
                    // (X A)[i][j] = sum_k X[i][k] A[k][j]
                    m[row * nn + i * n + k] += a[(k, j)];
                    // (A^T X)[i][j] = sum_k A[k][i] X[k][j]
                    m[row * nn + k * n + j] += a[(k, i)];
                }
            }
        }
    }

    let mut rhs = Vector::from_slice(b.as_slice());
    solve_gauss_in_place(&mut system, &mut rhs, cfg).map_err(|e| match e {
        CoreError::SingularMatrix { .. } => CoreError::SingularMatrix { op: "lyapunov", n },
        other => other,
    })?;
    Matrix::from_vec(rhs.into_vec(), n, n)
}
