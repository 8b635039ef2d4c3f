//! QR decomposition via Householder reflections, with optional column
//! pivoting.
//!
//! Decomposes a matrix `A` (m x n) into `AP = QR` where:
//! - `Q` is an orthogonal matrix (m x m) such that `Q^T Q = I`
//! - `R` is upper trapezoidal (m x n)
//! - `P` is the identity unless column pivoting was requested
//!
//! With pivoting, the column of largest remaining norm is moved to the
//! front at every step, so `|r_00| >= |r_11| >= ...` and the diagonal of `R`
//! reveals the numerical rank.

use crate::Float;
use crate::config::LinalgConfig;
use crate::error::{CoreError, Result};
use crate::matrix::{Matrix, Vector};

/// Result of a QR decomposition via Householder reflections.
///
/// Stores the factorization in compact form: the Householder vectors are
/// stored in the lower triangle of the working matrix, and `R` is stored in
/// the upper triangle.
#[derive(Debug, Clone)]
pub struct QrDecomposition<T: Float> {
    /// Working matrix: upper triangle holds R, columns below the diagonal
    /// hold the Householder vectors.
    qr: Vec<T>,
    /// Diagonal of R stored separately (the Householder reflections
    /// overwrite the diagonal of the working matrix).
    r_diag: Vec<T>,
    /// Column `j` of `AP` is column `perm[j]` of `A`.
    perm: Vec<usize>,
    /// Number of rows.
    m: usize,
    /// Number of columns.
    n: usize,
    /// Relative tolerance used by [`rank`](Self::rank).
    tol: T,
}

#[allow(clippy::many_single_char_names)]
impl<T: Float> QrDecomposition<T> {
    /// Perform QR decomposition on an m x n matrix.
    ///
    /// ```
    /// # use linvex_core::matrix::Matrix;
    /// # use linvex_core::linalg::decomp::QrDecomposition;
    /// let a = Matrix::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2).unwrap();
    /// let qr = QrDecomposition::decompose(&a).unwrap();
    /// let q = qr.q();
    /// // Verify Q is orthogonal: Q^T Q ≈ I
    /// let qtq = q.tr_matmul(&q).unwrap();
    /// assert!(qtq.approx_eq(&Matrix::eye(3), 1e-10));
    /// ```
    pub fn decompose(a: &Matrix<T>) -> Result<Self> {
        Self::factor(a, &LinalgConfig::default(), false)
    }

    /// QR decomposition using `cfg.tol` for the rank decision.
    pub fn decompose_with(a: &Matrix<T>, cfg: &LinalgConfig<T>) -> Result<Self> {
        Self::factor(a, cfg, false)
    }

    /// Rank-revealing QR with column pivoting: `AP = QR`.
    pub fn decompose_pivoted(a: &Matrix<T>) -> Result<Self> {
        Self::factor(a, &LinalgConfig::default(), true)
    }

    /// Column-pivoted QR using `cfg.tol` for the rank decision.
    pub fn decompose_pivoted_with(a: &Matrix<T>, cfg: &LinalgConfig<T>) -> Result<Self> {
        Self::factor(a, cfg, true)
    }

    fn factor(a: &Matrix<T>, cfg: &LinalgConfig<T>, pivot: bool) -> Result<Self> {
        a.require_nonempty("qr")?;
        let (m, n) = a.shape();
        let steps = m.min(n);

        let mut qr: Vec<T> = a.as_slice().to_vec();
        let mut r_diag = vec![T::zero(); steps];
        let mut perm: Vec<usize> = (0..n).collect();

        for k in 0..steps {
            if pivot {
                let mut best = k;
                let mut best_norm = column_norm(&qr, m, n, k, k);
                for j in (k + 1)..n {
                    let s = column_norm(&qr, m, n, k, j);
                    if s > best_norm {
                        best_norm = s;
                        best = j;
                    }
                }
                if best != k {
                    for i in 0..m {
                        qr.swap(i * n + k, i * n + best);
                    }
                    perm.swap(k, best);
                }
            }

            let mut norm = column_norm(&qr, m, n, k, k);
            if norm <= T::min_positive() {
                // Nothing to reflect; leave an inactive Householder vector.
                for i in k..m {
                    qr[i * n + k] = T::zero();
                }
                continue;
            }

            // Choose sign to avoid cancellation
            if qr[k * n + k] > T::zero() {
                norm = -norm;
            }

            // Scale the Householder vector
            for i in k..m {
                qr[i * n + k] /= -norm;
            }
            qr[k * n + k] += T::one();

            // Apply the Householder reflection to remaining columns
            for j in (k + 1)..n {
                let mut s = T::zero();
                for i in k..m {
                    s += qr[i * n + k] * qr[i * n + j];
                }
                s = -s / qr[k * n + k];
                for i in k..m {
                    let v = qr[i * n + k];
                    qr[i * n + j] += s * v;
                }
            }

            r_diag[k] = norm;
        }

        log::trace!("qr: {m}x{n} factored, pivoting={pivot}");

        Ok(Self {
            qr,
            r_diag,
            perm,
            m,
            n,
            tol: cfg.tol,
        })
    }

    /// Shape `(m, n)` of the decomposed matrix.
    pub fn shape(&self) -> (usize, usize) {
        (self.m, self.n)
    }

    /// Numerical rank: the number of `|r_kk| > tol * max|r_kk|`.
    ///
    /// Reliable for the column-pivoted form, where `max|r_kk| = |r_00|`.
    pub fn rank(&self) -> usize {
        self.rank_with(self.tol)
    }

    /// Numerical rank with an explicit relative tolerance.
    pub fn rank_with(&self, tol: T) -> usize {
        let max = self.r_diag.iter().fold(T::zero(), |acc, &d| acc.max(d.abs()));
        if max <= T::zero() {
            return 0;
        }
        self.r_diag.iter().filter(|d| d.abs() > tol * max).count()
    }

    /// Whether the matrix has full rank `min(m, n)`.
    pub fn is_full_rank(&self) -> bool {
        self.rank() == self.m.min(self.n)
    }

    /// Column permutation: column `j` of `AP` is column `permutation()[j]`
    /// of `A`. The identity for an unpivoted decomposition.
    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    /// Permutation matrix `P` (n x n) with `AP = QR`.
    pub fn p(&self) -> Matrix<T> {
        let n = self.n;
        let mut p = Matrix::zeros(n, n);
        for (j, &pj) in self.perm.iter().enumerate() {
            p[(pj, j)] = T::one();
        }
        p
    }

    /// Extract the upper trapezoidal matrix `R` (m x n).
    pub fn r(&self) -> Matrix<T> {
        let (m, n) = (self.m, self.n);
        let mut data = vec![T::zero(); m * n];
        for (i, &d) in self.r_diag.iter().enumerate() {
            data[i * n + i] = d;
            for j in (i + 1)..n {
                data[i * n + j] = self.qr[i * n + j];
            }
        }
        Matrix::from_parts(data, m, n)
    }

    /// Extract the orthogonal matrix `Q` (m x m).
    pub fn q(&self) -> Matrix<T> {
        self.q_columns(self.m)
    }

    /// Extract the "thin" Q matrix (m x min(m, n)).
    pub fn q_thin(&self) -> Matrix<T> {
        self.q_columns(self.r_diag.len())
    }

    fn q_columns(&self, cols: usize) -> Matrix<T> {
        let (m, n) = (self.m, self.n);
        let mut q_data = vec![T::zero(); m * cols];
        for i in 0..cols {
            q_data[i * cols + i] = T::one();
        }

        // Apply Householder reflections in reverse order
        for k in (0..self.r_diag.len()).rev() {
            let vk = self.qr[k * n + k];
            if vk.abs() < T::epsilon() {
                continue;
            }
            for j in 0..cols {
                let mut s = T::zero();
                for i in k..m {
                    s += self.qr[i * n + k] * q_data[i * cols + j];
                }
                s = -s / vk;
                for i in k..m {
                    q_data[i * cols + j] += s * self.qr[i * n + k];
                }
            }
        }

        Matrix::from_parts(q_data, m, cols)
    }

    /// Overwrite `x` (length m) with `Q^T x`.
    pub(crate) fn apply_qt(&self, x: &mut [T]) {
        for k in 0..self.r_diag.len() {
            self.reflect(k, x);
        }
    }

    /// Overwrite `x` (length m) with `Q x`.
    pub(crate) fn apply_q(&self, x: &mut [T]) {
        for k in (0..self.r_diag.len()).rev() {
            self.reflect(k, x);
        }
    }

    fn reflect(&self, k: usize, x: &mut [T]) {
        let n = self.n;
        let vk = self.qr[k * n + k];
        if vk.abs() < T::epsilon() {
            return;
        }
        let mut s = T::zero();
        for (i, &xi) in x.iter().enumerate().skip(k) {
            s += self.qr[i * n + k] * xi;
        }
        s = -s / vk;
        for (i, xi) in x.iter_mut().enumerate().skip(k) {
            *xi += s * self.qr[i * n + k];
        }
    }

    /// Entry `r_ij` of `R` for `i <= j`.
    pub(crate) fn r_at(&self, i: usize, j: usize) -> T {
        if i == j {
            self.r_diag[i]
        } else {
            self.qr[i * self.n + j]
        }
    }

    /// Solve the least-squares problem `min ||Ax - b||_2`.
    ///
    /// For a full-rank system where `m == n`, this is equivalent to solving
    /// `Ax = b`. For overdetermined systems (`m > n`), it returns the
    /// least-squares solution. Rank-deficient matrices are reported as
    /// [`CoreError::SingularMatrix`]; wide systems belong to
    /// [`LqDecomposition`](super::LqDecomposition).
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>> {
        b.check_len(self.m, "qr solve")?;
        if self.m < self.n {
            return Err(CoreError::InvalidArgument {
                reason: "qr solve: more columns than rows, use LqDecomposition::solve_min_norm",
            });
        }
        if self.rank() < self.n {
            return Err(CoreError::SingularMatrix {
                op: "qr solve",
                n: self.n,
            });
        }

        let n = self.n;
        let mut x: Vec<T> = b.as_slice().to_vec();

        // Compute Q^T b by applying Householder reflections
        self.apply_qt(&mut x);

        // Back substitution on the upper triangular part: Rz = Q^T b
        #[allow(clippy::needless_range_loop)]
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                let xj = x[j];
                x[i] -= self.qr[i * n + j] * xj;
            }
            x[i] /= self.r_diag[i];
        }

        // Undo the column permutation: x = P z
        let mut out = vec![T::zero(); n];
        for (j, &pj) in self.perm.iter().enumerate() {
            out[pj] = x[j];
        }
        Ok(Vector::from_vec(out))
    }
}

fn column_norm<T: Float>(qr: &[T], m: usize, n: usize, from: usize, j: usize) -> T {
    (from..m).fold(T::zero(), |acc, i| acc.hypot(qr[i * n + j]))
}

/// Solve the least-squares problem `min ||Ax - b||_2` via QR decomposition.
///
/// For square full-rank systems this is equivalent to `solve`. For
/// overdetermined systems (`m > n`), returns the least-squares solution.
///
/// ```
/// # use linvex_core::matrix::{Matrix, Vector};
/// # use linvex_core::linalg::decomp;
/// // Overdetermined system: 3 equations, 2 unknowns
/// let a = Matrix::from_vec(vec![1.0_f64, 1.0, 1.0, 2.0, 1.0, 3.0], 3, 2).unwrap();
/// let b = Vector::from_vec(vec![6.0_f64, 5.0, 7.0]);
/// let x = decomp::lstsq(&a, &b).unwrap();
/// assert_eq!(x.len(), 2);
/// ```
pub fn lstsq<T: Float>(a: &Matrix<T>, b: &Vector<T>) -> Result<Vector<T>> {
    QrDecomposition::decompose(a)?.solve(b)
}
