//! Classical Jacobi eigenvalue method for symmetric matrices.
//!
//! Each step annihilates the largest off-diagonal element with a plane
//! rotation and accumulates the rotation into the eigenvector matrix. The
//! iteration stops once the Frobenius norm of the off-diagonal part drops
//! to `tol * ||A||_F`.

use crate::Float;
use crate::config::{IterResult, LinalgConfig};
use crate::error::Result;
use crate::matrix::Matrix;

use super::{SymmetricEigen, require_symmetric};

impl<T: Float> SymmetricEigen<T> {
    /// Eigendecomposition of a symmetric matrix by Jacobi rotations.
    ///
    /// Hitting the rotation cap (default `max(100, 30 n^2)`) is reported
    /// through [`IterResult::converged`], with the current estimate kept.
    ///
    /// ```
    /// # use linvex_core::matrix::Matrix;
    /// # use linvex_core::linalg::eigen::SymmetricEigen;
    /// let a = Matrix::from_vec(vec![2.0_f64, 1.0, 1.0, 2.0], 2, 2).unwrap();
    /// let eig = SymmetricEigen::jacobi(&a).unwrap().into_converged("jacobi").unwrap();
    /// assert!((eig.eigenvalues()[0] - 3.0).abs() < 1e-12);
    /// assert!((eig.eigenvalues()[1] - 1.0).abs() < 1e-12);
    /// ```
    pub fn jacobi(a: &Matrix<T>) -> Result<IterResult<Self>> {
        Self::jacobi_with(a, &LinalgConfig::default())
    }

    /// Jacobi eigendecomposition with an explicit configuration.
    #[allow(clippy::many_single_char_names)]
    pub fn jacobi_with(a: &Matrix<T>, cfg: &LinalgConfig<T>) -> Result<IterResult<Self>> {
        let n = require_symmetric(a, "jacobi", cfg)?;
        let max_rotations = cfg.max_iter_or((30 * n * n).max(100));
        let threshold = cfg.tol * a.norm_fro();

        let mut s: Vec<T> = a.as_slice().to_vec();
        // V starts as identity
        let mut v = vec![T::zero(); n * n];
        for i in 0..n {
            v[i * n + i] = T::one();
        }

        let mut rotations = 0;
        let (converged, off) = loop {
            let (p, q, off) = largest_off_diagonal(&s, n);
            if off <= threshold {
                break (true, off);
            }
            if rotations >= max_rotations {
                break (false, off);
            }

            let apq = s[p * n + q];
            let app = s[p * n + p];
            let aqq = s[q * n + q];

            // Rotation angle; hypot keeps theta^2 from overflowing
            let theta = (aqq - app) / (apq + apq);
            let t = if theta >= T::zero() {
                T::one() / (theta + T::one().hypot(theta))
            } else {
                -T::one() / (-theta + T::one().hypot(theta))
            };
            let cs = T::one() / T::one().hypot(t);
            let sn = t * cs;

            // S' = G^T S G on rows/cols p and q
            s[p * n + p] = app - t * apq;
            s[q * n + q] = aqq + t * apq;
            s[p * n + q] = T::zero();
            s[q * n + p] = T::zero();

            for r in 0..n {
                if r == p || r == q {
                    continue;
                }
                let srp = s[r * n + p];
                let srq = s[r * n + q];
                s[r * n + p] = cs * srp - sn * srq;
                s[p * n + r] = cs * srp - sn * srq;
                s[r * n + q] = sn * srp + cs * srq;
                s[q * n + r] = sn * srp + cs * srq;
            }

            // V' = V G
            for i in 0..n {
                let vp = v[i * n + p];
                let vq = v[i * n + q];
                v[i * n + p] = cs * vp - sn * vq;
                v[i * n + q] = sn * vp + cs * vq;
            }

            rotations += 1;
            log::trace!("jacobi: rotation {rotations} on ({p}, {q}), off = {off}");
        };

        if converged {
            log::debug!("jacobi: {n}x{n} converged after {rotations} rotations");
        } else {
            log::warn!("jacobi: {n}x{n} did not converge in {max_rotations} rotations, off-diagonal norm {off}");
        }

        let diag: Vec<T> = (0..n).map(|i| s[i * n + i]).collect();
        let eig = Self::from_unsorted(&diag, &v, n);
        Ok(IterResult::new(eig, rotations, off.to_f64(), converged))
    }
}

/// Position of the largest off-diagonal element in the upper triangle, and
/// the Frobenius norm of the whole off-diagonal part.
fn largest_off_diagonal<T: Float>(s: &[T], n: usize) -> (usize, usize, T) {
    let mut best = (0, 1.min(n - 1));
    let mut best_abs = T::zero();
    let mut off = T::zero();
    for i in 0..n {
        for j in (i + 1)..n {
            let x = s[i * n + j];
            off = off.hypot(x);
            if x.abs() > best_abs {
                best_abs = x.abs();
                best = (i, j);
            }
        }
    }
    // Both triangles
    (best.0, best.1, off * T::from_f64(core::f64::consts::SQRT_2))
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::CoreError;
    use crate::matrix::Vector;

    fn approx_eq(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| (x - y).abs() < tol)
    }

    fn check_pairs(a: &Matrix<f64>, eig: &SymmetricEigen<f64>, tol: f64) {
        let n = a.rows();
        for i in 0..n {
            let v = eig.eigenvector(i).unwrap();
            let av = a.matvec(&v).unwrap();
            let lv = &v * eig.eigenvalues()[i];
            assert!(av.approx_eq(&lv, tol), "pair {i} residual too large");
        }
        let vt_v = eig.eigenvectors().tr_matmul(&eig.eigenvectors()).unwrap();
        assert!(approx_eq(vt_v.as_slice(), Matrix::eye(n).as_slice(), tol));
    }

    #[test]
    fn test_jacobi_diagonal() {
        let a = Matrix::from_vec(vec![3.0, 0.0, 0.0, 5.0], 2, 2).unwrap();
        let res = SymmetricEigen::jacobi(&a).unwrap();
        assert!(res.converged);
        assert_eq!(res.iterations, 0);
        assert_eq!(res.value.eigenvalues(), &[5.0, 3.0]);
    }

    #[test]
    fn test_jacobi_identity() {
        let eig = SymmetricEigen::jacobi(&Matrix::<f64>::eye(3)).unwrap().value;
        for &v in eig.eigenvalues() {
            assert!((v - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_jacobi_3x3() {
        // Eigenvalues of [[2,-1,0],[-1,2,-1],[0,-1,2]] are 2+sqrt2, 2, 2-sqrt2
        let a = Matrix::from_vec(vec![2.0, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 2.0], 3, 3)
            .unwrap();
        let res = SymmetricEigen::jacobi(&a).unwrap();
        assert!(res.is_converged());
        let s2 = 2.0_f64.sqrt();
        assert!(approx_eq(
            res.value.eigenvalues(),
            &[2.0 + s2, 2.0, 2.0 - s2],
            1e-10
        ));
        check_pairs(&a, &res.value, 1e-6);
    }

    #[test]
    fn test_jacobi_trace_and_reconstruction() {
        let a = Matrix::from_fn(6, 6, |i, j| {
            ((i * 7 + j * 7) % 5) as f64 - 2.0 + if i == j { 1.0 } else { 0.0 }
        });
        let eig = SymmetricEigen::jacobi(&a).unwrap().into_converged("jacobi").unwrap();
        let sum: f64 = eig.eigenvalues().iter().sum();
        assert!((sum - a.trace()).abs() < 1e-10);
        assert!(eig.reconstruct().approx_eq(&a, 1e-6));
        check_pairs(&a, &eig, 1e-6);
    }

    #[test]
    fn test_jacobi_zero_matrix() {
        let res = SymmetricEigen::jacobi(&Matrix::<f64>::zeros(3, 3)).unwrap();
        assert!(res.converged);
        assert!(res.value.eigenvalues().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_jacobi_1x1() {
        let a = Matrix::from_vec(vec![-4.0], 1, 1).unwrap();
        let eig = SymmetricEigen::jacobi(&a).unwrap().value;
        assert_eq!(eig.eigenvalues(), &[-4.0]);
        assert_eq!(eig.eigenvector(0).unwrap(), Vector::from_vec(vec![1.0]));
    }

    #[test]
    fn test_jacobi_cap_is_soft() {
        let a = Matrix::from_vec(vec![4.0, 1.0, 2.0, 1.0, 3.0, 0.5, 2.0, 0.5, 1.0], 3, 3).unwrap();
        let cfg = LinalgConfig::default().with_max_iter(1);
        let res = SymmetricEigen::jacobi_with(&a, &cfg).unwrap();
        assert!(!res.converged);
        assert_eq!(res.iterations, 1);
        assert!(res.residual > 0.0);
        assert_eq!(res.value.eigenvalues().len(), 3);
        assert!(matches!(
            res.into_converged("jacobi"),
            Err(CoreError::NoConvergence { .. })
        ));
    }

    #[test]
    fn test_jacobi_rejects_nonsymmetric() {
        let a = Matrix::from_vec(vec![1.0, 2.0, 0.0, 1.0], 2, 2).unwrap();
        assert!(SymmetricEigen::jacobi(&a).is_err());
    }
}
