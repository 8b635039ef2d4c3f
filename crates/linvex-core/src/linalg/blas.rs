//! BLAS Level 1–3 kernels on [`Matrix`] and [`Vector`].
//!
//! All functions validate shapes and return [`Result`] on mismatches.

use crate::error::{CoreError, Result};
use crate::matrix::{Matrix, Vector};
use crate::{Float, Scalar};

// ======================================================================
// BLAS Level 1: vector operations, O(n)
// ======================================================================

/// Inner (dot) product `sum(x_i * y_i)`.
///
/// ```
/// # use linvex_core::matrix::Vector;
/// # use linvex_core::linalg::dot;
/// let x = Vector::from_vec(vec![1.0_f64, 2.0, 3.0]);
/// let y = Vector::from_vec(vec![4.0_f64, 5.0, 6.0]);
/// assert!((dot(&x, &y).unwrap() - 32.0).abs() < 1e-10);
/// ```
pub fn dot<T: Scalar>(x: &Vector<T>, y: &Vector<T>) -> Result<T> {
    x.dot(y)
}

/// `y = alpha * x + y` (in-place update of `y`).
pub fn axpy<T: Scalar>(alpha: T, x: &Vector<T>, y: &mut Vector<T>) -> Result<()> {
    y.axpy(alpha, x)
}

/// Euclidean norm `sqrt(sum(x_i^2))`.
pub fn nrm2<T: Float>(x: &Vector<T>) -> T {
    x.norm()
}

/// Sum of absolute values `sum(|x_i|)`.
pub fn asum<T: Float>(x: &Vector<T>) -> T {
    x.iter().fold(T::zero(), |acc, &v| acc + v.abs())
}

/// Scale a vector in place: `x = alpha * x`.
pub fn scal<T: Scalar>(alpha: T, x: &mut Vector<T>) {
    x.scale_in_place(alpha);
}

/// Index of the element with the largest absolute value.
///
/// Returns `None` for empty vectors.
///
/// ```
/// # use linvex_core::matrix::Vector;
/// # use linvex_core::linalg::iamax;
/// let x = Vector::from_vec(vec![1.0_f64, -5.0, 3.0]);
/// assert_eq!(iamax(&x), Some(1));
/// ```
pub fn iamax<T: Float>(x: &Vector<T>) -> Option<usize> {
    let s = x.as_slice();
    if s.is_empty() {
        return None;
    }
    let mut max_idx = 0;
    let mut max_val = s[0].abs();
    for (i, &v) in s.iter().enumerate().skip(1) {
        let av = v.abs();
        if av > max_val {
            max_val = av;
            max_idx = i;
        }
    }
    Some(max_idx)
}

// ======================================================================
// BLAS Level 2: matrix-vector operations, O(n^2)
// ======================================================================

/// General matrix-vector multiply: `y = alpha * A * x + beta * y`.
///
/// `a` is `m x n`, `x` has length `n`, `y` has length `m`.
/// If `beta` is zero, `y` is overwritten (not read).
///
/// ```
/// # use linvex_core::matrix::{Matrix, Vector};
/// # use linvex_core::linalg::gemv;
/// let a = Matrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
/// let x = Vector::from_vec(vec![5.0, 6.0]);
/// let mut y = Vector::<f64>::zeros(2);
/// gemv(1.0, &a, &x, 0.0, &mut y).unwrap();
/// assert_eq!(y.as_slice(), &[17.0, 39.0]);
/// ```
#[allow(clippy::many_single_char_names)]
pub fn gemv<T: Scalar>(
    alpha: T,
    a: &Matrix<T>,
    x: &Vector<T>,
    beta: T,
    y: &mut Vector<T>,
) -> Result<()> {
    let (m, n) = a.shape();
    x.check_len(n, "gemv")?;
    y.check_len(m, "gemv")?;

    let a_data = a.as_slice();
    let x_data = x.as_slice();
    let beta_is_zero = beta == T::zero();

    for (i, yi) in y.iter_mut().enumerate() {
        let row = &a_data[i * n..(i + 1) * n];
        let sum = row
            .iter()
            .zip(x_data.iter())
            .fold(T::zero(), |acc, (&aij, &xj)| acc + aij * xj);
        *yi = if beta_is_zero {
            alpha * sum
        } else {
            alpha * sum + beta * *yi
        };
    }

    Ok(())
}

// ======================================================================
// BLAS Level 3: matrix-matrix operations, O(n^3)
// ======================================================================

/// General matrix-matrix multiply: `C = alpha * A * B + beta * C`.
///
/// `a` is `m x k`, `b` is `k x n`, `c` is `m x n`.
/// If `beta` is zero, `c` is overwritten (not read).
#[allow(clippy::many_single_char_names)]
pub fn gemm<T: Scalar>(
    alpha: T,
    a: &Matrix<T>,
    b: &Matrix<T>,
    beta: T,
    c: &mut Matrix<T>,
) -> Result<()> {
    let (m, k) = a.shape();
    let n = b.cols();

    if b.rows() != k {
        return Err(CoreError::DimensionMismatch {
            op: "gemm",
            expected: vec![k, n],
            got: vec![b.rows(), b.cols()],
        });
    }
    if c.shape() != (m, n) {
        return Err(CoreError::DimensionMismatch {
            op: "gemm",
            expected: vec![m, n],
            got: vec![c.rows(), c.cols()],
        });
    }

    let a_data = a.as_slice();
    let b_data = b.as_slice();
    let beta_is_zero = beta == T::zero();
    let c_data = c.as_mut_slice();

    // ikj loop order keeps the inner loop contiguous for B and C
    let mut row = vec![T::zero(); n];
    for i in 0..m {
        row.iter_mut().for_each(|x| *x = T::zero());
        for p in 0..k {
            let aip = a_data[i * k + p];
            if aip == T::zero() {
                continue;
            }
            let b_row = &b_data[p * n..(p + 1) * n];
            for (acc, &bpj) in row.iter_mut().zip(b_row.iter()) {
                *acc += aip * bpj;
            }
        }
        let c_row = &mut c_data[i * n..(i + 1) * n];
        for (cij, &sum) in c_row.iter_mut().zip(row.iter()) {
            *cij = if beta_is_zero {
                alpha * sum
            } else {
                alpha * sum + beta * *cij
            };
        }
    }

    Ok(())
}

// ======================================================================
// Convenience methods on Matrix
// ======================================================================

impl<T: Scalar> Matrix<T> {
    /// Matrix-vector multiply: returns `A x` as a new vector.
    pub fn matvec(&self, x: &Vector<T>) -> Result<Vector<T>> {
        let mut y = Vector::zeros(self.rows());
        gemv(T::one(), self, x, T::zero(), &mut y)?;
        Ok(y)
    }

    /// Matrix-matrix multiply: returns `A B` as a new matrix.
    ///
    /// ```
    /// # use linvex_core::matrix::Matrix;
    /// let a = Matrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
    /// let b = Matrix::from_vec(vec![5.0, 6.0, 7.0, 8.0], 2, 2).unwrap();
    /// assert_eq!(a.matmul(&b).unwrap().as_slice(), &[19.0, 22.0, 43.0, 50.0]);
    /// ```
    pub fn matmul(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        let mut c = Matrix::zeros(self.rows(), other.cols());
        gemm(T::one(), self, other, T::zero(), &mut c)?;
        Ok(c)
    }

    /// `A^T x` without forming the transpose.
    pub fn tr_matvec(&self, x: &Vector<T>) -> Result<Vector<T>> {
        let (m, n) = self.shape();
        x.check_len(m, "tr_matvec")?;
        let a = self.as_slice();
        let mut y = Vector::zeros(n);
        for (i, &xi) in x.iter().enumerate() {
            let row = &a[i * n..(i + 1) * n];
            for (yj, &aij) in y.iter_mut().zip(row.iter()) {
                *yj += aij * xi;
            }
        }
        Ok(y)
    }

    /// `A^T B` without forming the transpose.
    pub fn tr_matmul(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.transpose().matmul(other)
    }
}

impl<T: Float> Matrix<T> {
    /// Solve `self * x = b` for a square matrix via LU with partial pivoting.
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>> {
        crate::linalg::solve(self, b)
    }

    /// Inverse of a square matrix via LU with partial pivoting.
    pub fn inv(&self) -> Result<Matrix<T>> {
        crate::linalg::inv(self)
    }

    /// Determinant of a square matrix via LU with partial pivoting.
    pub fn det(&self) -> Result<T> {
        crate::linalg::det(self)
    }

    /// Moore-Penrose pseudoinverse via the SVD.
    pub fn pinv(&self) -> Result<Matrix<T>> {
        crate::linalg::pinv(self)
    }
}
