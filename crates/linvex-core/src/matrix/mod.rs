//! Dense row-major matrices and vectors.
//!
//! [`Matrix`] and [`Vector`] are the primitive containers every
//! decomposition and solver in this crate consumes. Both own their data;
//! cloning performs a deep copy.

mod create;
mod display;
mod ops;
mod vector;

pub use vector::Vector;

use core::ops::{Index, IndexMut};

use crate::Scalar;
use crate::error::{CoreError, Result};

/// A dense 2-D matrix stored contiguously in row-major order.
///
/// Matrices built from user data always have `rows >= 1` and `cols >= 1`.
/// [`Matrix::zeros`] additionally accepts a zero dimension so that trivial
/// results, such as the null-space basis of a full-rank matrix, can be
/// represented without a special case.
#[derive(Debug, Clone)]
pub struct Matrix<T: Scalar> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Scalar> Matrix<T> {
    // ------------------------------------------------------------------
    // Construction from raw parts
    // ------------------------------------------------------------------

    /// Create a matrix from row-major data.
    ///
    /// Returns an error if either dimension is zero or `data.len()` does not
    /// equal `rows * cols`.
    ///
    /// ```
    /// # use linvex_core::matrix::Matrix;
    /// let a = Matrix::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
    /// assert_eq!(a.shape(), (2, 3));
    /// assert_eq!(a[(1, 0)], 4.0);
    /// ```
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(CoreError::InvalidShape {
                shape: vec![rows, cols],
                reason: "matrix dimensions must be at least 1x1",
            });
        }
        if data.len() != rows * cols {
            return Err(CoreError::InvalidShape {
                shape: vec![rows, cols],
                reason: "rows * cols does not match data length",
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Create a matrix from a row-major slice (copies the data).
    pub fn from_slice(data: &[T], rows: usize, cols: usize) -> Result<Self> {
        Self::from_vec(data.to_vec(), rows, cols)
    }

    /// Build without validation; callers guarantee `data.len() == rows * cols`.
    pub(crate) fn from_parts(data: Vec<T>, rows: usize, cols: usize) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { data, rows, cols }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether `rows == cols`.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Whether the matrix holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat row-major slice of all elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable flat row-major slice of all elements.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the matrix and return the row-major buffer.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    // ------------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------------

    fn check_index(&self, i: usize, j: usize) -> Result<usize> {
        if i >= self.rows || j >= self.cols {
            return Err(CoreError::IndexOutOfBounds {
                index: vec![i, j],
                shape: vec![self.rows, self.cols],
            });
        }
        Ok(i * self.cols + j)
    }

    /// Bounds-checked element read.
    pub fn get(&self, i: usize, j: usize) -> Result<T> {
        let k = self.check_index(i, j)?;
        Ok(self.data[k])
    }

    /// Bounds-checked element write.
    pub fn set(&mut self, i: usize, j: usize, value: T) -> Result<()> {
        let k = self.check_index(i, j)?;
        self.data[k] = value;
        Ok(())
    }

    /// Copy of row `i`.
    pub fn row(&self, i: usize) -> Result<Vector<T>> {
        if i >= self.rows {
            return Err(CoreError::IndexOutOfBounds {
                index: vec![i],
                shape: vec![self.rows, self.cols],
            });
        }
        let start = i * self.cols;
        Ok(Vector::from_slice(&self.data[start..start + self.cols]))
    }

    /// Copy of column `j`.
    pub fn column(&self, j: usize) -> Result<Vector<T>> {
        if j >= self.cols {
            return Err(CoreError::IndexOutOfBounds {
                index: vec![j],
                shape: vec![self.rows, self.cols],
            });
        }
        Ok((0..self.rows).map(|i| self.data[i * self.cols + j]).collect())
    }

    /// Overwrite column `j` with `v`.
    pub fn set_column(&mut self, j: usize, v: &Vector<T>) -> Result<()> {
        if j >= self.cols {
            return Err(CoreError::IndexOutOfBounds {
                index: vec![j],
                shape: vec![self.rows, self.cols],
            });
        }
        if v.len() != self.rows {
            return Err(CoreError::DimensionMismatch {
                op: "set_column",
                expected: vec![self.rows],
                got: vec![v.len()],
            });
        }
        for (i, &x) in v.iter().enumerate() {
            self.data[i * self.cols + j] = x;
        }
        Ok(())
    }

    /// Swap rows `a` and `b` in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let n = self.cols;
        for j in 0..n {
            self.data.swap(a * n + j, b * n + j);
        }
    }

    /// Copy of the main diagonal.
    pub fn diagonal(&self) -> Vector<T> {
        (0..self.rows.min(self.cols))
            .map(|i| self.data[i * self.cols + i])
            .collect()
    }

    /// Sum of the main diagonal.
    pub fn trace(&self) -> T {
        self.diagonal().iter().copied().sum()
    }

    // ------------------------------------------------------------------
    // Map / apply
    // ------------------------------------------------------------------

    /// Apply a function to every element, returning a new matrix.
    pub fn map<F>(&self, f: F) -> Matrix<T>
    where
        F: Fn(T) -> T,
    {
        Matrix {
            data: self.data.iter().map(|&x| f(x)).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Apply a function element-wise to two matrices of the same shape.
    pub fn zip_map<F>(&self, other: &Matrix<T>, f: F) -> Result<Matrix<T>>
    where
        F: Fn(T, T) -> T,
    {
        self.check_same_shape(other, "zip_map")?;
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Matrix {
            data,
            rows: self.rows,
            cols: self.cols,
        })
    }

    /// Apply a function to every element in place.
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(T) -> T,
    {
        for x in &mut self.data {
            *x = f(*x);
        }
    }

    pub(crate) fn check_same_shape(&self, other: &Matrix<T>, op: &'static str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(CoreError::DimensionMismatch {
                op,
                expected: vec![self.rows, self.cols],
                got: vec![other.rows, other.cols],
            });
        }
        Ok(())
    }

    /// Fail with [`CoreError::NotSquare`] unless the matrix is square and
    /// non-empty.
    pub(crate) fn require_square(&self, op: &'static str) -> Result<usize> {
        if !self.is_square() || self.is_empty() {
            return Err(CoreError::NotSquare {
                op,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.rows)
    }

    pub(crate) fn require_nonempty(&self, op: &'static str) -> Result<()> {
        if self.is_empty() {
            return Err(CoreError::DimensionMismatch {
                op,
                expected: vec![1, 1],
                got: vec![self.rows, self.cols],
            });
        }
        Ok(())
    }
}

impl<T: Scalar> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    /// Unchecked-style access: panics on an out-of-range index like slice
    /// indexing does.
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(
            i < self.rows && j < self.cols,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &self.data[i * self.cols + j]
    }
}

impl<T: Scalar> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(
            i < self.rows && j < self.cols,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &mut self.data[i * self.cols + j]
    }
}

impl<T: Scalar> PartialEq for Matrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.data == other.data
    }
}
