//! Matrix factories: zeros, identity, diagonal, closures, rows, columns.

use crate::Scalar;
use crate::error::{CoreError, Result};

use super::{Matrix, Vector};

impl<T: Scalar> Matrix<T> {
    /// Create a `rows x cols` matrix of zeros.
    ///
    /// ```
    /// # use linvex_core::matrix::Matrix;
    /// let z = Matrix::<f64>::zeros(2, 3);
    /// assert_eq!(z.shape(), (2, 3));
    /// assert!(z.as_slice().iter().all(|&x| x == 0.0));
    /// ```
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_parts(vec![T::zero(); rows * cols], rows, cols)
    }

    /// Like [`zeros`](Self::zeros) but reports an allocation failure instead
    /// of aborting. Used for buffers whose size grows faster than the input,
    /// such as the `n^2 x n^2` system of a Lyapunov solve.
    pub fn try_zeros(rows: usize, cols: usize) -> Result<Self> {
        let elements = rows
            .checked_mul(cols)
            .ok_or(CoreError::AllocationFailure { elements: usize::MAX })?;
        let mut data = Vec::new();
        data.try_reserve_exact(elements)
            .map_err(|_| CoreError::AllocationFailure { elements })?;
        data.resize(elements, T::zero());
        Ok(Self::from_parts(data, rows, cols))
    }

    /// Create an `n x n` identity matrix.
    ///
    /// ```
    /// # use linvex_core::matrix::Matrix;
    /// let eye = Matrix::<f64>::eye(3);
    /// assert_eq!(eye[(1, 1)], 1.0);
    /// assert_eq!(eye[(0, 1)], 0.0);
    /// ```
    pub fn eye(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = T::one();
        }
        m
    }

    /// Square diagonal matrix with `diag` on the main diagonal.
    pub fn from_diag(diag: &Vector<T>) -> Self {
        let n = diag.len();
        let mut m = Self::zeros(n, n);
        for (i, &d) in diag.iter().enumerate() {
            m.data[i * n + i] = d;
        }
        m
    }

    /// Build a matrix by evaluating `f(i, j)` at every position.
    ///
    /// ```
    /// # use linvex_core::matrix::Matrix;
    /// // 3x3 Hilbert matrix
    /// let h = Matrix::from_fn(3, 3, |i, j| 1.0 / (i + j + 1) as f64);
    /// assert_eq!(h[(2, 2)], 0.2);
    /// ```
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self::from_parts(data, rows, cols)
    }

    /// Build a matrix from equally long rows.
    pub fn from_rows(rows: &[&[T]]) -> Result<Self> {
        let r = rows.len();
        let c = rows.first().map_or(0, |row| row.len());
        let mut data = Vec::with_capacity(r * c);
        for row in rows {
            if row.len() != c {
                return Err(CoreError::InvalidShape {
                    shape: vec![r, row.len()],
                    reason: "rows have different lengths",
                });
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(data, r, c)
    }

    /// Build a matrix whose columns are `columns`. An empty list yields a
    /// `rows x 0` matrix.
    pub fn from_columns(rows: usize, columns: &[Vector<T>]) -> Result<Self> {
        let c = columns.len();
        let mut m = Self::zeros(rows, c);
        for (j, col) in columns.iter().enumerate() {
            col.check_len(rows, "from_columns")?;
            for (i, &x) in col.iter().enumerate() {
                m.data[i * c + j] = x;
            }
        }
        Ok(m)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let m = Matrix::<f64>::zeros(3, 4);
        assert_eq!(m.shape(), (3, 4));
        assert!(m.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_try_zeros() {
        let m = Matrix::<f64>::try_zeros(4, 4).unwrap();
        assert_eq!(m.as_slice().len(), 16);
        assert!(matches!(
            Matrix::<f64>::try_zeros(usize::MAX, 2),
            Err(CoreError::AllocationFailure { .. })
        ));
    }

    #[test]
    fn test_eye() {
        let m = Matrix::<f64>::eye(3);
        assert_eq!(m.trace(), 3.0);
        assert_eq!(m[(2, 0)], 0.0);
    }

    #[test]
    fn test_from_diag() {
        let m = Matrix::from_diag(&Vector::from_vec(vec![1.0, 2.0, 3.0]));
        assert_eq!(m[(1, 1)], 2.0);
        assert_eq!(m[(0, 2)], 0.0);
    }

    #[test]
    fn test_from_rows() {
        let m = Matrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]).unwrap();
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m[(2, 1)], 6.0);
        assert!(Matrix::from_rows(&[&[1.0, 2.0], &[3.0]]).is_err());
        assert!(Matrix::<f64>::from_rows(&[]).is_err());
    }

    #[test]
    fn test_from_columns() {
        let cols = vec![
            Vector::from_vec(vec![1.0, 2.0]),
            Vector::from_vec(vec![3.0, 4.0]),
        ];
        let m = Matrix::from_columns(2, &cols).unwrap();
        assert_eq!(m.as_slice(), &[1.0, 3.0, 2.0, 4.0]);
        let empty = Matrix::<f64>::from_columns(3, &[]).unwrap();
        assert_eq!(empty.shape(), (3, 0));
        assert!(empty.is_empty());
    }
}
