//! Dense linear algebra.
//!
//! All routines are implemented from scratch, with no external BLAS/LAPACK
//! bindings. The API is split into BLAS-style kernels, matrix
//! decompositions, eigen solvers, linear system solvers and generalized
//! inverses:
//!
//! | Level | Operations | Complexity |
//! |-------|-----------|------------|
//! | L1 | `dot`, `axpy`, `nrm2`, `asum`, `scal`, `iamax` | O(n) |
//! | L2 | `gemv` (matrix-vector multiply) | O(n^2) |
//! | L3 | `gemm` (matrix-matrix multiply) | O(n^3) |
//!
//! Decompositions: [`LuDecomposition`], [`QrDecomposition`],
//! [`LqDecomposition`], [`HessenbergDecomposition`], [`SvdDecomposition`].
//! Eigen solvers live in [`eigen`], system solvers in [`solve`] and the
//! Moore-Penrose machinery in [`pinv`](mod@pinv).
//!
//! The free functions below cover the common one-shot cases with default
//! tolerances.

pub mod blas;
pub mod decomp;
pub mod eigen;
pub mod pinv;
pub mod solve;

pub use blas::{asum, axpy, dot, gemm, gemv, iamax, nrm2, scal};
pub use decomp::{
    HessenbergDecomposition, LqDecomposition, LuDecomposition, QrDecomposition,
    SvdDecomposition,
};
pub use eigen::{EigenPair, GeneralEigen, SymmetricEigen};
pub use pinv::{GeneralSolution, MpInverse, null_space};

use crate::Float;
use crate::config::LinalgConfig;
use crate::error::Result;
use crate::matrix::{Matrix, Vector};

/// Solve the linear system `Ax = b` for a square matrix `A`.
///
/// Uses LU decomposition with partial pivoting internally.
///
/// ```
/// # use linvex_core::matrix::{Matrix, Vector};
/// # use linvex_core::linalg;
/// let a = Matrix::from_vec(vec![2.0_f64, 1.0, 1.0, 4.0], 2, 2).unwrap();
/// let b = Vector::from_vec(vec![5.0_f64, 6.0]);
/// let x = linalg::solve(&a, &b).unwrap();
/// assert!((x[0] - 2.0).abs() < 1e-10);
/// assert!((x[1] - 1.0).abs() < 1e-10);
/// ```
pub fn solve<T: Float>(a: &Matrix<T>, b: &Vector<T>) -> Result<Vector<T>> {
    solve_with(a, b, &LinalgConfig::default())
}

/// [`solve`] with an explicit singularity threshold.
pub fn solve_with<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    cfg: &LinalgConfig<T>,
) -> Result<Vector<T>> {
    solve::solve_lu_with(a, b, cfg)
}

/// Compute the inverse of a square matrix.
///
/// Uses LU decomposition with partial pivoting internally.
/// Returns [`CoreError::SingularMatrix`](crate::CoreError::SingularMatrix) if the
/// matrix is singular.
///
/// ```
/// # use linvex_core::matrix::Matrix;
/// # use linvex_core::linalg;
/// let a = Matrix::from_vec(vec![2.0_f64, 1.0, 1.0, 4.0], 2, 2).unwrap();
/// let inv = linalg::inv(&a).unwrap();
/// // A * A^-1 ≈ I
/// let eye = a.matmul(&inv).unwrap();
/// assert!(eye.approx_eq(&Matrix::eye(2), 1e-12));
/// ```
pub fn inv<T: Float>(a: &Matrix<T>) -> Result<Matrix<T>> {
    LuDecomposition::decompose(a)?.inverse()
}

/// Compute the determinant of a square matrix.
///
/// Uses LU decomposition with partial pivoting internally, so a matrix
/// that is singular to working precision is reported as an error rather
/// than given a determinant of zero.
///
/// ```
/// # use linvex_core::matrix::Matrix;
/// # use linvex_core::linalg;
/// let a = Matrix::from_vec(vec![2.0_f64, 1.0, 1.0, 4.0], 2, 2).unwrap();
/// let det = linalg::det(&a).unwrap();
/// assert!((det - 7.0).abs() < 1e-10);
/// ```
pub fn det<T: Float>(a: &Matrix<T>) -> Result<T> {
    Ok(LuDecomposition::decompose(a)?.det())
}

/// Moore-Penrose pseudoinverse via the SVD.
///
/// ```
/// # use linvex_core::matrix::Matrix;
/// # use linvex_core::linalg;
/// let a = Matrix::from_vec(vec![1.0_f64, 2.0, 3.0], 3, 1).unwrap();
/// let p = linalg::pinv(&a).unwrap();
/// assert_eq!(p.shape(), (1, 3));
/// assert!((p.matmul(&a).unwrap()[(0, 0)] - 1.0).abs() < 1e-12);
/// ```
pub fn pinv<T: Float>(a: &Matrix<T>) -> Result<Matrix<T>> {
    Ok(pinv::pinv_svd(a)?.pinv)
}

/// Numerical rank: singular values above `1e-8 * s_max`.
pub fn rank<T: Float>(a: &Matrix<T>) -> Result<usize> {
    Ok(SvdDecomposition::decompose(a)?.rank())
}

/// 2-norm condition number `s_max / s_min`; infinite for a singular matrix.
///
/// ```
/// # use linvex_core::matrix::Matrix;
/// # use linvex_core::linalg;
/// let a = Matrix::from_vec(vec![10.0_f64, 0.0, 0.0, 0.1], 2, 2).unwrap();
/// assert!((linalg::cond(&a).unwrap() - 100.0).abs() < 1e-8);
/// ```
pub fn cond<T: Float>(a: &Matrix<T>) -> Result<T> {
    Ok(SvdDecomposition::decompose(a)?.condition_number())
}

/// Minimum-norm least-squares solution of `Ax = b` for any shape and rank.
///
/// ```
/// # use linvex_core::matrix::{Matrix, Vector};
/// # use linvex_core::linalg;
/// // Underdetermined: x + y = 2 has minimum-norm solution (1, 1)
/// let a = Matrix::from_vec(vec![1.0_f64, 1.0], 1, 2).unwrap();
/// let x = linalg::lstsq(&a, &Vector::from_vec(vec![2.0])).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-12 && (x[1] - 1.0).abs() < 1e-12);
/// ```
pub fn lstsq<T: Float>(a: &Matrix<T>, b: &Vector<T>) -> Result<Vector<T>> {
    SvdDecomposition::decompose(a)?.solve(b)
}
