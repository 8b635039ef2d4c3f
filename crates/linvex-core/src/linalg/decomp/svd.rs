//! Singular Value Decomposition (SVD).
//!
//! Decomposes a matrix `A` (m x n) into `A = U S V^T` where:
//! - `U` is orthogonal (m x m)
//! - `S` is diagonal with non-negative entries (m x n)
//! - `V` is orthogonal (n x n)
//!
//! Implementation uses the one-sided Jacobi method: plane rotations are
//! applied to the columns of `A` until they are mutually orthogonal. This is
//! the Jacobi eigenvalue method run implicitly on `A^T A` (on `A A^T` for
//! wide matrices, through the transpose), without ever forming the squared
//! matrix, so small singular values keep their relative accuracy.

use crate::Float;
use crate::config::LinalgConfig;
use crate::error::Result;
use crate::matrix::{Matrix, Vector};

/// Result of a Singular Value Decomposition.
#[derive(Debug, Clone)]
pub struct SvdDecomposition<T: Float> {
    /// Left singular vectors (m x m).
    u: Vec<T>,
    /// Singular values in descending order (length min(m,n)).
    s: Vec<T>,
    /// Right singular vectors (n x n), one per column.
    v: Vec<T>,
    /// Number of rows.
    m: usize,
    /// Number of columns.
    n: usize,
    /// Relative rank tolerance.
    tol: T,
    /// Jacobi sweeps performed.
    sweeps: usize,
    /// Whether the columns became orthogonal within the sweep cap.
    converged: bool,
}

/// Output of [`svd_tall`].
struct TallSvd<T> {
    u: Vec<T>,
    s: Vec<T>,
    v: Vec<T>,
    sweeps: usize,
    converged: bool,
}

/// Default number of Jacobi sweeps before giving up.
const MAX_SWEEPS: usize = 100;

#[allow(clippy::many_single_char_names)]
impl<T: Float> SvdDecomposition<T> {
    /// Compute the SVD of a matrix `A` (m x n).
    ///
    /// Returns `A = U diag(s) V^T`.
    ///
    /// ```
    /// # use linvex_core::matrix::Matrix;
    /// # use linvex_core::linalg::decomp::SvdDecomposition;
    /// let a = Matrix::from_vec(vec![3.0_f64, 0.0, 0.0, 4.0], 2, 2).unwrap();
    /// let svd = SvdDecomposition::decompose(&a).unwrap();
    /// let s = svd.singular_values();
    /// // Singular values of diag(3,4) are 4 and 3
    /// assert!((s[0] - 4.0).abs() < 1e-10);
    /// assert!((s[1] - 3.0).abs() < 1e-10);
    /// ```
    pub fn decompose(a: &Matrix<T>) -> Result<Self> {
        Self::decompose_with(a, &LinalgConfig::default())
    }

    /// SVD with an explicit rank tolerance and sweep cap.
    ///
    /// Hitting the sweep cap keeps the current factors and is reported by
    /// [`is_converged`](Self::is_converged).
    pub fn decompose_with(a: &Matrix<T>, cfg: &LinalgConfig<T>) -> Result<Self> {
        a.require_nonempty("svd")?;
        let (m, n) = a.shape();
        let max_sweeps = cfg.max_iter_or(MAX_SWEEPS);

        if m >= n {
            let tall = svd_tall(a.as_slice(), m, n, max_sweeps);
            Ok(Self {
                u: tall.u,
                s: tall.s,
                v: tall.v,
                m,
                n,
                tol: cfg.tol,
                sweeps: tall.sweeps,
                converged: tall.converged,
            })
        } else {
            // A^T = U' S V'^T  =>  A = V' S U'^T
            let at = a.transpose();
            let tall = svd_tall(at.as_slice(), n, m, max_sweeps);
            Ok(Self {
                u: tall.v,
                s: tall.s,
                v: tall.u,
                m,
                n,
                tol: cfg.tol,
                sweeps: tall.sweeps,
                converged: tall.converged,
            })
        }
    }

    /// Whether the Jacobi sweeps converged before the cap.
    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Number of Jacobi sweeps performed.
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// The singular values in descending order.
    pub fn singular_values(&self) -> &[T] {
        &self.s
    }

    /// The singular values as a vector.
    pub fn s(&self) -> Vector<T> {
        Vector::from_slice(&self.s)
    }

    /// The left singular vectors `U` (m x m).
    pub fn u(&self) -> Matrix<T> {
        Matrix::from_parts(self.u.clone(), self.m, self.m)
    }

    /// The right singular vectors `V` (n x n).
    pub fn v(&self) -> Matrix<T> {
        Matrix::from_parts(self.v.clone(), self.n, self.n)
    }

    /// The right singular vectors transposed `V^T` (n x n).
    pub fn vt(&self) -> Matrix<T> {
        self.v().transpose()
    }

    /// Largest singular value.
    pub fn max_singular_value(&self) -> T {
        self.s.first().copied().unwrap_or_else(T::zero)
    }

    /// Numerical rank: the number of `s_i > tol * s_max`.
    pub fn rank(&self) -> usize {
        self.rank_with(self.tol)
    }

    /// Numerical rank with an explicit relative tolerance.
    pub fn rank_with(&self, tol: T) -> usize {
        let cutoff = tol * self.max_singular_value();
        if self.max_singular_value() <= T::zero() {
            return 0;
        }
        self.s.iter().filter(|&&sv| sv > cutoff).count()
    }

    /// Compute the condition number (ratio of largest to smallest singular
    /// value). Infinite when the smallest singular value is zero.
    pub fn condition_number(&self) -> T {
        let max_s = self.max_singular_value();
        let min_s = self.s.last().copied().unwrap_or_else(T::zero);
        if min_s <= T::zero() {
            return T::infinity();
        }
        max_s / min_s
    }

    /// Orthonormal basis of the null space of `A` (n x (n - rank)).
    ///
    /// The columns are the right singular vectors whose singular value is
    /// negligible, plus the trailing columns of `V` when `n > m`. A full
    /// column rank matrix yields an `n x 0` matrix.
    pub fn null_space(&self) -> Matrix<T> {
        let n = self.n;
        let r = self.rank();
        let mut basis = Matrix::zeros(n, n - r);
        for (k, j) in (r..n).enumerate() {
            for i in 0..n {
                basis[(i, k)] = self.v[i * n + j];
            }
        }
        basis
    }

    /// Moore-Penrose pseudoinverse `V S^+ U^T` (n x m), where `S^+` inverts
    /// the singular values above the rank cutoff and zeroes the rest.
    pub fn pinv(&self) -> Matrix<T> {
        let (m, n) = (self.m, self.n);
        let r = self.rank();
        let mut out = Matrix::zeros(n, m);
        let data = out.as_mut_slice();
        for k in 0..r {
            let inv = self.s[k].recip();
            for i in 0..n {
                let vik = self.v[i * n + k] * inv;
                for j in 0..m {
                    data[i * m + j] += vik * self.u[j * m + k];
                }
            }
        }
        out
    }

    /// Minimum-norm least-squares solution `A^+ b`.
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>> {
        b.check_len(self.m, "svd solve")?;
        let (m, n) = (self.m, self.n);
        let mut x = Vector::zeros(n);
        for k in 0..self.rank() {
            let mut coef = T::zero();
            for i in 0..m {
                coef += self.u[i * m + k] * b[i];
            }
            coef /= self.s[k];
            for i in 0..n {
                x[i] += coef * self.v[i * n + k];
            }
        }
        Ok(x)
    }
}

/// One-sided Jacobi SVD for tall/square data (m >= n).
///
/// `U` is m x m, `V` n x n and `s` sorted descending.
#[allow(clippy::many_single_char_names)]
fn svd_tall<T: Float>(a_data: &[T], m: usize, n: usize, max_sweeps: usize) -> TallSvd<T> {
    // Working copy: columns of A that will converge to U * S
    let mut work = a_data.to_vec();
    // V starts as identity
    let mut v = vec![T::zero(); n * n];
    for i in 0..n {
        v[i * n + i] = T::one();
    }

    let tol = T::epsilon() * T::from_f64(100.0);
    let mut converged = false;
    let mut sweeps = 0;

    while sweeps < max_sweeps {
        sweeps += 1;
        let mut rotated = false;

        // Apply Jacobi rotations to pairs of columns (p, q)
        for p in 0..n {
            for q in (p + 1)..n {
                // Gram matrix elements for columns p and q
                let mut app = T::zero();
                let mut aqq = T::zero();
                let mut apq = T::zero();
                for i in 0..m {
                    let wp = work[i * n + p];
                    let wq = work[i * n + q];
                    app += wp * wp;
                    aqq += wq * wq;
                    apq += wp * wq;
                }

                if apq.abs() <= tol * (app * aqq).sqrt() {
                    continue;
                }
                rotated = true;

                // Jacobi rotation angle
                let tau = (aqq - app) / (apq + apq);
                let t = if tau >= T::zero() {
                    T::one() / (tau + (T::one() + tau * tau).sqrt())
                } else {
                    -T::one() / (-tau + (T::one() + tau * tau).sqrt())
                };
                let cs = T::one() / (T::one() + t * t).sqrt();
                let sn = t * cs;

                for i in 0..m {
                    let wp = work[i * n + p];
                    let wq = work[i * n + q];
                    work[i * n + p] = cs * wp - sn * wq;
                    work[i * n + q] = sn * wp + cs * wq;
                }
                for i in 0..n {
                    let vp = v[i * n + p];
                    let vq = v[i * n + q];
                    v[i * n + p] = cs * vp - sn * vq;
                    v[i * n + q] = sn * vp + cs * vq;
                }
            }
        }

        if !rotated {
            converged = true;
            break;
        }
    }

    if converged {
        log::debug!("svd: {m}x{n} converged after {sweeps} sweeps");
    } else {
        log::warn!("svd: {m}x{n} did not converge in {max_sweeps} sweeps");
    }

    // Singular values are the column norms of work
    let s: Vec<T> = (0..n)
        .map(|j| (0..m).fold(T::zero(), |acc, i| acc.hypot(work[i * n + j])))
        .collect();

    // Sort singular values in descending order
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| s[b].partial_cmp(&s[a]).unwrap_or(core::cmp::Ordering::Equal));

    let s_max = order.first().map_or(T::zero(), |&j| s[j]);
    let negligible = T::epsilon() * T::from_usize(m.max(n)) * s_max;

    let mut s_sorted = vec![T::zero(); n];
    let mut u = vec![T::zero(); m * m];
    let mut v_sorted = vec![T::zero(); n * n];
    let mut filled = vec![false; m];

    for (new_j, &old_j) in order.iter().enumerate() {
        let sv = s[old_j];
        s_sorted[new_j] = sv;
        for i in 0..n {
            v_sorted[i * n + new_j] = v[i * n + old_j];
        }
        if sv > negligible {
            for i in 0..m {
                u[i * m + new_j] = work[i * n + old_j] / sv;
            }
            filled[new_j] = true;
        }
    }

    complete_basis(&mut u, m, &mut filled);

    TallSvd {
        u,
        s: s_sorted,
        v: v_sorted,
        sweeps,
        converged,
    }
}

/// Fill the unset columns of the m x m matrix `u` so that all columns form
/// an orthonormal basis.
///
/// Each missing column is the standard basis vector with the largest
/// component outside the span of the columns already set, orthogonalized
/// twice by Gram-Schmidt.
fn complete_basis<T: Float>(u: &mut [T], m: usize, filled: &mut [bool]) {
    for j in 0..m {
        if filled[j] {
            continue;
        }
        let mut best: Option<(T, Vec<T>)> = None;
        for c in 0..m {
            let mut w = vec![T::zero(); m];
            w[c] = T::one();
            for _ in 0..2 {
                for k in (0..m).filter(|&k| filled[k]) {
                    let dot = (0..m).fold(T::zero(), |acc, i| acc + w[i] * u[i * m + k]);
                    for (i, wi) in w.iter_mut().enumerate() {
                        *wi -= dot * u[i * m + k];
                    }
                }
            }
            let norm = w.iter().fold(T::zero(), |acc, &x| acc.hypot(x));
            if best.as_ref().map_or(true, |(b, _)| norm > *b) {
                best = Some((norm, w));
            }
        }
        if let Some((norm, w)) = best {
            for (i, wi) in w.into_iter().enumerate() {
                u[i * m + j] = wi / norm;
            }
            filled[j] = true;
        }
    }
}
