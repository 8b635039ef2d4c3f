//! LU decomposition with partial pivoting.
//!
//! Decomposes a square matrix `A` into `PA = LU` where:
//! - `P` is a permutation matrix (stored as a pivot vector)
//! - `L` is lower triangular with unit diagonal
//! - `U` is upper triangular

use crate::Float;
use crate::config::LinalgConfig;
use crate::error::{CoreError, Result};
use crate::matrix::{Matrix, Vector};

/// Result of an LU decomposition with partial pivoting.
///
/// Stores the factorization `PA = LU` in compact form: `L` and `U` are
/// packed into a single matrix (the unit diagonal of `L` is implicit),
/// and the permutation is stored as a pivot index vector.
#[derive(Debug, Clone)]
pub struct LuDecomposition<T: Float> {
    /// Packed LU matrix: lower triangle holds L (without diagonal),
    /// upper triangle (including diagonal) holds U.
    lu: Vec<T>,
    /// `pivots[i]` is the row of `A` that ended up in row `i` of `PA`.
    pivots: Vec<usize>,
    /// Matrix dimension (n x n).
    n: usize,
    /// Sign of the permutation (+1 or -1), for determinant computation.
    sign: T,
}

impl<T: Float> LuDecomposition<T> {
    /// Perform LU decomposition with partial pivoting on a square matrix.
    ///
    /// ```
    /// # use linvex_core::matrix::Matrix;
    /// # use linvex_core::linalg::decomp::LuDecomposition;
    /// let a = Matrix::from_vec(vec![2.0_f64, 1.0, 1.0, 4.0], 2, 2).unwrap();
    /// let lu = LuDecomposition::decompose(&a).unwrap();
    /// assert!((lu.det() - 7.0).abs() < 1e-10);
    /// ```
    pub fn decompose(a: &Matrix<T>) -> Result<Self> {
        Self::decompose_with(a, &LinalgConfig::default())
    }

    /// LU decomposition with an explicit singularity threshold.
    ///
    /// Fails with [`CoreError::SingularMatrix`] as soon as the selected pivot
    /// satisfies `|pivot| <= cfg.pivot_tol * max|a_ij|`.
    pub fn decompose_with(a: &Matrix<T>, cfg: &LinalgConfig<T>) -> Result<Self> {
        let n = a.require_square("lu")?;
        let threshold = cfg.pivot_threshold(a.max_abs());

        let mut lu: Vec<T> = a.as_slice().to_vec();
        let mut pivots: Vec<usize> = (0..n).collect();
        let mut sign = T::one();

        for k in 0..n {
            // Find pivot: row with largest |lu[i, k]| for i >= k
            let mut max_val = lu[k * n + k].abs();
            let mut max_row = k;
            for i in (k + 1)..n {
                let val = lu[i * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_row != k {
                for j in 0..n {
                    lu.swap(k * n + j, max_row * n + j);
                }
                pivots.swap(k, max_row);
                sign = -sign;
            }

            let pivot = lu[k * n + k];
            if pivot.abs() <= threshold {
                log::debug!("lu: pivot {k} of {n} below threshold");
                return Err(CoreError::SingularMatrix { op: "lu", n });
            }

            // Eliminate below the pivot
            for i in (k + 1)..n {
                let factor = lu[i * n + k] / pivot;
                lu[i * n + k] = factor;
                if factor == T::zero() {
                    continue;
                }
                for j in (k + 1)..n {
                    let ukj = lu[k * n + j];
                    lu[i * n + j] -= factor * ukj;
                }
            }
        }

        Ok(Self {
            lu,
            pivots,
            n,
            sign,
        })
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Extract the lower triangular matrix `L` (with unit diagonal).
    pub fn l(&self) -> Matrix<T> {
        let n = self.n;
        Matrix::from_fn(n, n, |i, j| match i.cmp(&j) {
            core::cmp::Ordering::Greater => self.lu[i * n + j],
            core::cmp::Ordering::Equal => T::one(),
            core::cmp::Ordering::Less => T::zero(),
        })
    }

    /// Extract the upper triangular matrix `U`.
    pub fn u(&self) -> Matrix<T> {
        let n = self.n;
        Matrix::from_fn(n, n, |i, j| {
            if j >= i {
                self.lu[i * n + j]
            } else {
                T::zero()
            }
        })
    }

    /// Extract the permutation matrix `P`.
    pub fn p(&self) -> Matrix<T> {
        let n = self.n;
        let mut p = Matrix::zeros(n, n);
        for (i, &pi) in self.pivots.iter().enumerate() {
            p[(i, pi)] = T::one();
        }
        p
    }

    /// The permutation pivot vector.
    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    /// Compute the determinant from the LU factorization.
    ///
    /// `det(A) = sign * product(diag(U))`
    pub fn det(&self) -> T {
        let n = self.n;
        let mut d = self.sign;
        for i in 0..n {
            d *= self.lu[i * n + i];
        }
        d
    }

    /// Solve `Ax = b` using the precomputed factorization.
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>> {
        let mut x = b.clone();
        self.solve_in_place(&mut x)?;
        Ok(x)
    }

    /// Solve `Ax = b`, overwriting `b` with `x`.
    pub fn solve_in_place(&self, b: &mut Vector<T>) -> Result<()> {
        b.check_len(self.n, "lu solve")?;
        let n = self.n;

        // Apply permutation: Pb
        let permuted: Vec<T> = self.pivots.iter().map(|&pi| b[pi]).collect();
        let x = b.as_mut_slice();
        x.copy_from_slice(&permuted);

        // Forward substitution: Ly = Pb
        #[allow(clippy::needless_range_loop)]
        for i in 1..n {
            for j in 0..i {
                let lij_xj = self.lu[i * n + j] * x[j];
                x[i] -= lij_xj;
            }
        }

        // Back substitution: Ux = y
        #[allow(clippy::needless_range_loop)]
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                let uij_xj = self.lu[i * n + j] * x[j];
                x[i] -= uij_xj;
            }
            x[i] /= self.lu[i * n + i];
        }

        Ok(())
    }

    /// Solve `AX = B` for every column of `B`.
    pub fn solve_matrix(&self, b: &Matrix<T>) -> Result<Matrix<T>> {
        if b.rows() != self.n {
            return Err(CoreError::DimensionMismatch {
                op: "lu solve_matrix",
                expected: vec![self.n, b.cols()],
                got: vec![b.rows(), b.cols()],
            });
        }
        let mut x = Matrix::zeros(self.n, b.cols());
        for col in 0..b.cols() {
            let mut c = b.column(col)?;
            self.solve_in_place(&mut c)?;
            x.set_column(col, &c)?;
        }
        Ok(x)
    }

    /// Compute the inverse matrix by solving `AX = I` column by column.
    pub fn inverse(&self) -> Result<Matrix<T>> {
        self.solve_matrix(&Matrix::eye(self.n))
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn mat(data: &[f64], n: usize) -> Matrix<f64> {
        Matrix::from_vec(data.to_vec(), n, n).unwrap()
    }

    fn approx_eq(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| (x - y).abs() < tol)
    }

    fn check_pa_eq_lu(a: &Matrix<f64>, tol: f64) {
        let lu = LuDecomposition::decompose(a).unwrap();
        let pa = lu.p().matmul(a).unwrap();
        let prod = lu.l().matmul(&lu.u()).unwrap();
        assert!(approx_eq(pa.as_slice(), prod.as_slice(), tol));
    }

    #[test]
    fn test_lu_2x2() {
        check_pa_eq_lu(&mat(&[2.0, 1.0, 1.0, 4.0], 2), 1e-12);
    }

    #[test]
    fn test_lu_3x3() {
        check_pa_eq_lu(&mat(&[2.0, 1.0, 1.0, 4.0, 3.0, 3.0, 8.0, 7.0, 9.0], 3), 1e-12);
    }

    #[test]
    fn test_lu_4x4() {
        check_pa_eq_lu(
            &mat(
                &[
                    1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 2.0, 6.0, 4.0, 8.0, 3.0, 1.0, 1.0, 2.0,
                ],
                4,
            ),
            1e-10,
        );
    }

    #[test]
    fn test_lu_triangular_shapes() {
        let a = mat(&[2.0, 1.0, 1.0, 4.0, 3.0, 3.0, 8.0, 7.0, 9.0], 3);
        let lu = LuDecomposition::decompose(&a).unwrap();
        let l = lu.l();
        let u = lu.u();
        for i in 0..3 {
            assert_eq!(l[(i, i)], 1.0);
            for j in (i + 1)..3 {
                assert_eq!(l[(i, j)], 0.0);
                assert_eq!(u[(j, i)], 0.0);
            }
        }
        // Partial pivoting picks the largest entry of column 0
        assert_eq!(lu.pivots()[0], 2);
    }

    #[test]
    fn test_lu_1x1() {
        let a = mat(&[-3.5], 1);
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert_eq!(lu.l().as_slice(), &[1.0]);
        assert_eq!(lu.u().as_slice(), &[-3.5]);
    }

    #[test]
    fn test_lu_idempotent() {
        let a = mat(&[4.0, 3.0, 6.0, 3.0], 2);
        let first = LuDecomposition::decompose(&a).unwrap();
        let rebuilt = first.l().matmul(&first.u()).unwrap();
        let second = LuDecomposition::decompose(&rebuilt).unwrap();
        assert!(approx_eq(
            first.u().as_slice(),
            second.u().as_slice(),
            1e-12
        ));
        assert!(approx_eq(
            first.l().as_slice(),
            second.l().as_slice(),
            1e-12
        ));
    }

    #[test]
    fn test_det_3x3() {
        // >>> np.linalg.det([[6,1,1],[4,-2,5],[2,8,7]])
        // -306.0
        let a = mat(&[6.0, 1.0, 1.0, 4.0, -2.0, 5.0, 2.0, 8.0, 7.0], 3);
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert!((lu.det() - (-306.0)).abs() < 1e-10);
    }

    #[test]
    fn test_det_4x4_numpy() {
        let a = mat(
            &[
                1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 2.0, 6.0, 4.0, 8.0, 3.0, 1.0, 1.0, 2.0,
            ],
            4,
        );
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert!((lu.det() - 72.0).abs() < 1e-10);
    }

    #[test]
    fn test_singular_matrix() {
        // Rows are linearly dependent
        let a = mat(&[1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 7.0, 8.0, 9.0], 3);
        assert_eq!(
            LuDecomposition::decompose(&a).unwrap_err(),
            CoreError::SingularMatrix { op: "lu", n: 3 }
        );
    }

    #[test]
    fn test_zero_matrix_is_singular() {
        assert!(LuDecomposition::decompose(&Matrix::<f64>::zeros(2, 2)).is_err());
    }

    #[test]
    fn test_pivot_tolerance_is_configurable() {
        let a = mat(&[1.0, 0.0, 0.0, 1e-9], 2);
        assert!(LuDecomposition::decompose(&a).is_ok());
        let strict = LinalgConfig::default().with_pivot_tol(1e-6);
        assert!(LuDecomposition::decompose_with(&a, &strict).is_err());
    }

    #[test]
    fn test_solve_4x4_numpy() {
        // >>> np.linalg.solve(A, [10, 26, 20, 7]) -> [1, 1, 1, 1]
        let a = mat(
            &[
                1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 2.0, 6.0, 4.0, 8.0, 3.0, 1.0, 1.0, 2.0,
            ],
            4,
        );
        let b = Vector::from_vec(vec![10.0, 26.0, 20.0, 7.0]);
        let lu = LuDecomposition::decompose(&a).unwrap();
        let x = lu.solve(&b).unwrap();
        assert!(approx_eq(x.as_slice(), &[1.0, 1.0, 1.0, 1.0], 1e-10));
    }

    #[test]
    fn test_solve_matrix_multiple_rhs() {
        let a = mat(&[2.0, 1.0, 1.0, 4.0], 2);
        let b = Matrix::from_vec(vec![5.0, 3.0, 6.0, 5.0], 2, 2).unwrap();
        let lu = LuDecomposition::decompose(&a).unwrap();
        let x = lu.solve_matrix(&b).unwrap();
        // columns: [2, 1] and [1, 1]
        assert!(approx_eq(x.as_slice(), &[2.0, 1.0, 1.0, 1.0], 1e-12));
    }

    #[test]
    fn test_inverse_3x3() {
        let a = mat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0], 3);
        let lu = LuDecomposition::decompose(&a).unwrap();
        let inv = lu.inverse().unwrap();
        let eye = a.matmul(&inv).unwrap();
        assert!(approx_eq(eye.as_slice(), Matrix::eye(3).as_slice(), 1e-10));
    }

    #[test]
    fn test_not_square() {
        let a = Matrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert!(matches!(
            LuDecomposition::decompose(&a),
            Err(CoreError::NotSquare { rows: 2, cols: 3, .. })
        ));
    }

    #[test]
    fn test_solve_dimension_mismatch() {
        let a = mat(&[1.0, 0.0, 0.0, 1.0], 2);
        let b = Vector::from_vec(vec![1.0, 2.0, 3.0]);
        let lu = LuDecomposition::decompose(&a).unwrap();
        assert!(lu.solve(&b).is_err());
    }
}
