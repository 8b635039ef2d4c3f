//! Eigenvalue problems.
//!
//! | Problem                 | Entry point                              | Method                          |
//! |-------------------------|------------------------------------------|---------------------------------|
//! | Symmetric, all pairs    | [`SymmetricEigen::jacobi`]               | classical Jacobi rotations      |
//! | Symmetric, all pairs    | [`SymmetricEigen::bisection`]            | tridiagonal Sturm bisection     |
//! | Dominant pair           | [`power_iteration`]                      | power iteration                 |
//! | Smallest-magnitude pair | [`inverse_power_iteration`]              | inverse power iteration via LU  |
//! | General real matrix     | [`GeneralEigen::decompose`]              | Hessenberg + shifted QR         |

pub mod bisection;
pub mod general;
pub mod jacobi;
pub mod power;

pub use general::GeneralEigen;
pub use power::{
    EigenPair, inverse_power_iteration, inverse_power_iteration_with, power_iteration,
    power_iteration_with,
};

use crate::Float;
use crate::config::LinalgConfig;
use crate::error::{CoreError, Result};
use crate::matrix::{Matrix, Vector};

/// Eigendecomposition `A = V diag(d) V^T` of a real symmetric matrix.
///
/// Eigenvalues are sorted in descending order; column `i` of `V` is the
/// unit eigenvector for `eigenvalues()[i]`.
#[derive(Debug, Clone)]
pub struct SymmetricEigen<T: Float> {
    eigenvalues: Vec<T>,
    /// Eigenvectors as columns of an n x n matrix (stored row-major).
    eigenvectors: Vec<T>,
    n: usize,
}

impl<T: Float> SymmetricEigen<T> {
    /// Sort the pairs by descending eigenvalue.
    pub(crate) fn from_unsorted(values: &[T], vectors: &[T], n: usize) -> Self {
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            values[b]
                .partial_cmp(&values[a])
                .unwrap_or(core::cmp::Ordering::Equal)
        });

        let eigenvalues: Vec<T> = order.iter().map(|&i| values[i]).collect();
        let mut eigenvectors = vec![T::zero(); n * n];
        for (new_j, &old_j) in order.iter().enumerate() {
            for i in 0..n {
                eigenvectors[i * n + new_j] = vectors[i * n + old_j];
            }
        }
        Self {
            eigenvalues,
            eigenvectors,
            n,
        }
    }

    /// The eigenvalues, sorted in descending order.
    pub fn eigenvalues(&self) -> &[T] {
        &self.eigenvalues
    }

    /// The eigenvalues as a vector.
    pub fn eigenvalues_vector(&self) -> Vector<T> {
        Vector::from_slice(&self.eigenvalues)
    }

    /// The eigenvector matrix `V` (n x n, columns are eigenvectors).
    pub fn eigenvectors(&self) -> Matrix<T> {
        Matrix::from_parts(self.eigenvectors.clone(), self.n, self.n)
    }

    /// The unit eigenvector belonging to `eigenvalues()[i]`.
    pub fn eigenvector(&self, i: usize) -> Result<Vector<T>> {
        if i >= self.n {
            return Err(CoreError::IndexOutOfBounds {
                index: vec![i],
                shape: vec![self.n],
            });
        }
        Ok((0..self.n)
            .map(|r| self.eigenvectors[r * self.n + i])
            .collect())
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Rebuild `V diag(d) V^T`.
    pub fn reconstruct(&self) -> Matrix<T> {
        let n = self.n;
        Matrix::from_fn(n, n, |i, j| {
            (0..n).fold(T::zero(), |acc, k| {
                acc + self.eigenvectors[i * n + k]
                    * self.eigenvalues[k]
                    * self.eigenvectors[j * n + k]
            })
        })
    }
}

/// Square and symmetric within `cfg.tol` relative to `max|a_ij|`.
pub(crate) fn require_symmetric<T: Float>(
    a: &Matrix<T>,
    op: &'static str,
    cfg: &LinalgConfig<T>,
) -> Result<usize> {
    let n = a.require_square(op)?;
    if !a.is_symmetric(cfg.tol) {
        return Err(CoreError::InvalidArgument {
            reason: "symmetric eigensolver requires a symmetric matrix",
        });
    }
    Ok(n)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unsorted_orders_descending() {
        // Columns of the identity paired with values 1, 3, 2
        let vectors = Matrix::<f64>::eye(3);
        let eig = SymmetricEigen::from_unsorted(&[1.0, 3.0, 2.0], vectors.as_slice(), 3);
        assert_eq!(eig.eigenvalues(), &[3.0, 2.0, 1.0]);
        assert_eq!(eig.eigenvector(0).unwrap().as_slice(), &[0.0, 1.0, 0.0]);
        assert_eq!(eig.eigenvector(2).unwrap().as_slice(), &[1.0, 0.0, 0.0]);
        assert!(eig.eigenvector(3).is_err());
        assert_eq!(eig.eigenvalues_vector().len(), 3);
    }

    #[test]
    fn test_reconstruct() {
        let eig = SymmetricEigen::from_unsorted(&[2.0, 5.0], Matrix::<f64>::eye(2).as_slice(), 2);
        let a = eig.reconstruct();
        assert_eq!(a.as_slice(), &[2.0, 0.0, 0.0, 5.0]);
    }

    #[test]
    fn test_require_symmetric() {
        let cfg = LinalgConfig::default();
        let s = Matrix::from_vec(vec![1.0, 2.0, 2.0, 1.0], 2, 2).unwrap();
        assert_eq!(require_symmetric(&s, "test", &cfg), Ok(2));
        let ns = Matrix::from_vec(vec![1.0, 2.0, 3.0, 1.0], 2, 2).unwrap();
        assert!(matches!(
            require_symmetric(&ns, "test", &cfg),
            Err(CoreError::InvalidArgument { .. })
        ));
        let rect = Matrix::<f64>::zeros(2, 3);
        assert!(matches!(
            require_symmetric(&rect, "test", &cfg),
            Err(CoreError::NotSquare { .. })
        ));
    }
}
