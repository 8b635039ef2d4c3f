//! LQ decomposition, the transposed dual of QR.
//!
//! Decomposes `A` (m x n) into `A = LQ` with `L` lower trapezoidal (m x n)
//! and `Q` orthogonal (n x n). Computed as the QR decomposition of `A^T`:
//! `A^T = Q_1 R_1` gives `L = R_1^T`, `Q = Q_1^T`.
//!
//! The natural use is the minimum-norm solution of a wide system.

use crate::Float;
use crate::config::LinalgConfig;
use crate::error::{CoreError, Result};
use crate::matrix::{Matrix, Vector};

use super::QrDecomposition;

/// Result of an LQ decomposition.
#[derive(Debug, Clone)]
pub struct LqDecomposition<T: Float> {
    /// QR decomposition of `A^T`.
    qr_t: QrDecomposition<T>,
    m: usize,
    n: usize,
}

impl<T: Float> LqDecomposition<T> {
    /// Perform LQ decomposition on an m x n matrix.
    ///
    /// ```
    /// # use linvex_core::matrix::Matrix;
    /// # use linvex_core::linalg::decomp::LqDecomposition;
    /// let a = Matrix::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
    /// let lq = LqDecomposition::decompose(&a).unwrap();
    /// let prod = lq.l().matmul(&lq.q()).unwrap();
    /// assert!(prod.approx_eq(&a, 1e-10));
    /// ```
    pub fn decompose(a: &Matrix<T>) -> Result<Self> {
        Self::decompose_with(a, &LinalgConfig::default())
    }

    /// LQ decomposition using `cfg.tol` for the rank decision.
    pub fn decompose_with(a: &Matrix<T>, cfg: &LinalgConfig<T>) -> Result<Self> {
        a.require_nonempty("lq")?;
        let (m, n) = a.shape();
        let qr_t = QrDecomposition::decompose_with(&a.transpose(), cfg)?;
        Ok(Self { qr_t, m, n })
    }

    /// The lower trapezoidal factor `L` (m x n).
    pub fn l(&self) -> Matrix<T> {
        self.qr_t.r().transpose()
    }

    /// The orthogonal factor `Q` (n x n).
    pub fn q(&self) -> Matrix<T> {
        self.qr_t.q().transpose()
    }

    /// The first `min(m, n)` rows of `Q`.
    pub fn q_thin(&self) -> Matrix<T> {
        self.qr_t.q_thin().transpose()
    }

    /// Numerical rank from the diagonal of `L`.
    pub fn rank(&self) -> usize {
        self.qr_t.rank()
    }

    /// Minimum-norm solution of the underdetermined system `Ax = b`
    /// (m <= n, full row rank).
    ///
    /// Solves `L y = b` by forward substitution, pads `y` with zeros and
    /// returns `x = Q^T y`, the solution orthogonal to the null space of `A`.
    pub fn solve_min_norm(&self, b: &Vector<T>) -> Result<Vector<T>> {
        let (m, n) = (self.m, self.n);
        b.check_len(m, "lq solve_min_norm")?;
        if m > n {
            return Err(CoreError::InvalidArgument {
                reason: "lq solve_min_norm: more rows than columns, use QrDecomposition::solve",
            });
        }
        if self.rank() < m {
            return Err(CoreError::SingularMatrix {
                op: "lq solve_min_norm",
                n: m,
            });
        }

        // L[i][k] = R_1[k][i]
        let mut y = vec![T::zero(); n];
        for i in 0..m {
            let mut acc = b[i];
            for (k, &yk) in y.iter().enumerate().take(i) {
                acc -= self.qr_t.r_at(k, i) * yk;
            }
            y[i] = acc / self.qr_t.r_at(i, i);
        }

        self.qr_t.apply_q(&mut y);
        Ok(Vector::from_vec(y))
    }
}
