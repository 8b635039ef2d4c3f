//! Element-wise arithmetic, transposition, norms and tolerant comparison
//! for [`Matrix`].
//!
//! Operator impls panic on a shape mismatch, since operator traits cannot
//! return errors. The `*_checked` methods return `Err` instead.

use core::ops::{Add, Mul, Neg, Sub};

use crate::error::{CoreError, Result};
use crate::{Float, Scalar};

use super::Matrix;

// ======================================================================
// Matrix + Matrix  (element-wise, same shape, panics on mismatch)
// ======================================================================

macro_rules! impl_matrix_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<T: Scalar> $trait for Matrix<T> {
            type Output = Matrix<T>;

            fn $method(self, rhs: Matrix<T>) -> Matrix<T> {
                &self $op &rhs
            }
        }

        impl<T: Scalar> $trait for &Matrix<T> {
            type Output = Matrix<T>;

            fn $method(self, rhs: &Matrix<T>) -> Matrix<T> {
                assert_eq!(
                    self.shape(), rhs.shape(),
                    "shape mismatch in element-wise {}: {:?} vs {:?}",
                    stringify!($method), self.shape(), rhs.shape(),
                );
                let data = self.data.iter()
                    .zip(rhs.data.iter())
                    .map(|(&a, &b)| a $op b)
                    .collect();
                Matrix::from_parts(data, self.rows, self.cols)
            }
        }
    };
}

impl_matrix_binop!(Add, add, +);
impl_matrix_binop!(Sub, sub, -);

// ======================================================================
// Matrix * scalar
// ======================================================================

impl<T: Scalar> Mul<T> for Matrix<T> {
    type Output = Matrix<T>;

    fn mul(mut self, rhs: T) -> Matrix<T> {
        self.scale_in_place(rhs);
        self
    }
}

impl<T: Scalar> Mul<T> for &Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: T) -> Matrix<T> {
        self.map(|a| a * rhs)
    }
}

impl<T: Float> Neg for Matrix<T> {
    type Output = Matrix<T>;

    fn neg(self) -> Matrix<T> {
        self.map(|a| -a)
    }
}

impl<T: Float> Neg for &Matrix<T> {
    type Output = Matrix<T>;

    fn neg(self) -> Matrix<T> {
        self.map(|a| -a)
    }
}

// ======================================================================
// Fallible and in-place arithmetic
// ======================================================================

impl<T: Scalar> Matrix<T> {
    /// Element-wise addition, returning `Err` on shape mismatch.
    pub fn add_checked(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.zip_map(other, |a, b| a + b)
    }

    /// Element-wise subtraction, returning `Err` on shape mismatch.
    pub fn sub_checked(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.zip_map(other, |a, b| a - b)
    }

    /// `self += alpha * other` in place.
    pub fn add_scaled_in_place(&mut self, alpha: T, other: &Matrix<T>) -> Result<()> {
        self.check_same_shape(other, "add_scaled_in_place")?;
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += alpha * b;
        }
        Ok(())
    }

    /// Multiply every element by `alpha` in place.
    pub fn scale_in_place(&mut self, alpha: T) {
        for x in &mut self.data {
            *x *= alpha;
        }
    }

    /// Transpose into a new `cols x rows` matrix.
    pub fn transpose(&self) -> Matrix<T> {
        let (rows, cols) = self.shape();
        let mut data = vec![T::zero(); self.data.len()];
        for r in 0..rows {
            for c in 0..cols {
                data[c * rows + r] = self.data[r * cols + c];
            }
        }
        Matrix::from_parts(data, cols, rows)
    }

    /// Transpose a square matrix in place.
    pub fn transpose_in_place(&mut self) -> Result<()> {
        if !self.is_square() {
            return Err(CoreError::NotSquare {
                op: "transpose_in_place",
                rows: self.rows,
                cols: self.cols,
            });
        }
        let n = self.rows;
        for i in 0..n {
            for j in (i + 1)..n {
                self.data.swap(i * n + j, j * n + i);
            }
        }
        Ok(())
    }
}

// ======================================================================
// Norms and predicates
// ======================================================================

impl<T: Float> Matrix<T> {
    /// Frobenius norm `sqrt(sum a_ij^2)`.
    pub fn norm_fro(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &x| acc.hypot(x))
    }

    /// Infinity norm: maximum absolute row sum.
    pub fn norm_inf(&self) -> T {
        self.data
            .chunks(self.cols.max(1))
            .map(|row| row.iter().fold(T::zero(), |acc, &x| acc + x.abs()))
            .fold(T::zero(), T::max)
    }

    /// One norm: maximum absolute column sum.
    pub fn norm_1(&self) -> T {
        (0..self.cols)
            .map(|j| {
                (0..self.rows).fold(T::zero(), |acc, i| acc + self.data[i * self.cols + j].abs())
            })
            .fold(T::zero(), T::max)
    }

    /// Largest absolute element.
    pub fn max_abs(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &x| acc.max(x.abs()))
    }

    /// Whether every element is within `tol` of `other`'s.
    pub fn approx_eq(&self, other: &Matrix<T>, tol: T) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(&a, &b)| (a - b).abs() <= tol)
    }

    /// Whether the matrix is square and `|a_ij - a_ji| <= tol * max|a|`.
    pub fn is_symmetric(&self, tol: T) -> bool {
        if !self.is_square() {
            return false;
        }
        let n = self.rows;
        let bound = tol * self.max_abs();
        for i in 0..n {
            for j in (i + 1)..n {
                if (self.data[i * n + j] - self.data[j * n + i]).abs() > bound {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn mat(data: &[f64], rows: usize, cols: usize) -> Matrix<f64> {
        Matrix::from_vec(data.to_vec(), rows, cols).unwrap()
    }

    #[test]
    fn test_add_sub() {
        let a = mat(&[1.0, 2.0, 3.0, 4.0], 2, 2);
        let b = mat(&[10.0, 20.0, 30.0, 40.0], 2, 2);
        assert_eq!((&a + &b).as_slice(), &[11.0, 22.0, 33.0, 44.0]);
        assert_eq!((b - a).as_slice(), &[9.0, 18.0, 27.0, 36.0]);
    }

    #[test]
    fn test_scale_neg() {
        let a = mat(&[1.0, -2.0], 1, 2);
        assert_eq!((&a * 3.0).as_slice(), &[3.0, -6.0]);
        assert_eq!((-a).as_slice(), &[-1.0, 2.0]);
    }

    #[test]
    fn test_checked_mismatch() {
        let a = mat(&[1.0, 2.0], 1, 2);
        let b = mat(&[1.0, 2.0], 2, 1);
        assert!(a.add_checked(&b).is_err());
        assert!(a.sub_checked(&b).is_err());
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn test_add_panics_on_mismatch() {
        let _ = mat(&[1.0, 2.0], 1, 2) + mat(&[1.0, 2.0], 2, 1);
    }

    #[test]
    fn test_add_scaled_in_place() {
        let mut a = mat(&[1.0, 1.0], 1, 2);
        a.add_scaled_in_place(2.0, &mat(&[1.0, 2.0], 1, 2)).unwrap();
        assert_eq!(a.as_slice(), &[3.0, 5.0]);
    }

    #[test]
    fn test_transpose() {
        let a = mat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let t = a.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert!(a.clone().transpose_in_place().is_err());

        let mut s = mat(&[1.0, 2.0, 3.0, 4.0], 2, 2);
        s.transpose_in_place().unwrap();
        assert_eq!(s.as_slice(), &[1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn test_norms() {
        let a = mat(&[1.0, -2.0, 3.0, 4.0], 2, 2);
        assert_eq!(a.norm_inf(), 7.0);
        assert_eq!(a.norm_1(), 6.0);
        assert_eq!(a.max_abs(), 4.0);
        assert!((a.norm_fro() - 30.0_f64.sqrt()).abs() < 1e-14);
    }

    #[test]
    fn test_symmetric_and_approx_eq() {
        let s = mat(&[2.0, 1.0, 1.0, 3.0], 2, 2);
        assert!(s.is_symmetric(1e-12));
        let ns = mat(&[2.0, 1.0, 1.5, 3.0], 2, 2);
        assert!(!ns.is_symmetric(1e-12));
        let t = s.map(|x| x + 1e-13);
        assert!(s.approx_eq(&t, 1e-12));
        assert!(!s.approx_eq(&ns, 1e-12));
    }
}
