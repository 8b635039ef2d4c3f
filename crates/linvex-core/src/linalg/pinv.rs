//! Moore-Penrose generalized inverse and null spaces.
//!
//! Two independent routes to `A^+`:
//!
//! - [`pinv_penrose`]: the Newton-Schulz iteration `X <- 2X - X A X`
//!   started from `X_0 = A^T / (||A||_1 ||A||_inf)`. It converges
//!   quadratically to `A^+` for any real `A` and needs only matrix
//!   products. Its rank comes from a column-pivoted QR.
//! - [`pinv_svd`]: `V S^+ U^T` from the singular value decomposition, with
//!   singular values below `tol * s_max` treated as zero.
//!
//! The complete solution set of a consistent system is `x_0 + N y` with
//! `x_0 = A^+ b` and the columns of `N` spanning the null space of `A`;
//! [`GeneralSolution`] carries both.

use crate::Float;
use crate::config::{IterResult, LinalgConfig};
use crate::error::{CoreError, Result};
use crate::linalg::decomp::{QrDecomposition, SvdDecomposition};
use crate::matrix::{Matrix, Vector};

/// Default iteration cap for the Penrose iteration.
const PENROSE_MAX_ITER: usize = 200;

/// A pseudoinverse together with the numerical rank it was computed at.
#[derive(Debug, Clone, PartialEq)]
pub struct MpInverse<T: Float> {
    /// `A^+` (n x m for an m x n `A`).
    pub pinv: Matrix<T>,
    /// Numerical rank of `A`.
    pub rank: usize,
}

impl<T: Float> MpInverse<T> {
    /// `A^+ b`: the minimum-norm least-squares solution of `Ax = b`.
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>> {
        self.pinv.matvec(b)
    }

    /// The orthogonal projector `I - A^+ A` onto the null space of `A`.
    pub fn projector(&self, a: &Matrix<T>) -> Result<Matrix<T>> {
        let mut p = self.pinv.matmul(a)?;
        p.scale_in_place(-T::one());
        let n = p.rows();
        for i in 0..n {
            p[(i, i)] += T::one();
        }
        Ok(p)
    }
}

/// The full solution set `{ x_0 + N y }` of a linear system.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralSolution<T: Float> {
    /// Minimum-norm particular solution `x_0`.
    pub particular: Vector<T>,
    /// Orthonormal null-space basis `N` (n x k); `k = 0` when the
    /// solution is unique.
    pub null_basis: Matrix<T>,
}

impl<T: Float> GeneralSolution<T> {
    /// Dimension of the null space (number of free parameters).
    pub fn null_dim(&self) -> usize {
        self.null_basis.cols()
    }

    /// Whether the solution is unique.
    pub fn is_unique(&self) -> bool {
        self.null_dim() == 0
    }

    /// Evaluate `x_0 + N y`.
    pub fn at(&self, y: &Vector<T>) -> Result<Vector<T>> {
        y.check_len(self.null_dim(), "general solution")?;
        if self.is_unique() {
            return Ok(self.particular.clone());
        }
        let ny = self.null_basis.matvec(y)?;
        self.particular.add_checked(&ny)
    }
}

// ======================================================================
// Penrose iteration
// ======================================================================

/// Moore-Penrose inverse by the Penrose (Newton-Schulz) iteration.
///
/// Stops when `||X_{k+1} - X_k||_F <= cfg.tol * ||X_{k+1}||_F`. The cap
/// (default 200) is a soft failure.
///
/// ```
/// # use linvex_core::matrix::Matrix;
/// # use linvex_core::linalg::pinv::pinv_penrose;
/// let a = Matrix::from_vec(vec![1.0_f64, 2.0, 2.0, 4.0], 2, 2).unwrap();
/// let res = pinv_penrose(&a).unwrap();
/// assert!(res.converged);
/// assert_eq!(res.value.rank, 1);
/// // A A^+ A = A
/// let p = &res.value.pinv;
/// let apa = a.matmul(p).unwrap().matmul(&a).unwrap();
/// assert!(apa.approx_eq(&a, 1e-10));
/// ```
pub fn pinv_penrose<T: Float>(a: &Matrix<T>) -> Result<IterResult<MpInverse<T>>> {
    pinv_penrose_with(a, &LinalgConfig::default())
}

/// Penrose iteration with an explicit tolerance and cap.
///
/// The iteration runs on `A / max|a_ij|` so the starting scale neither
/// overflows nor underflows. The rank is read off a column-pivoted QR at
/// `cfg.tol`; when it falls short of `min(m, n)` the iteration inverts the
/// rank-truncated factorization, so directions below the tolerance are
/// treated as zero just as [`pinv_svd`] does.
pub fn pinv_penrose_with<T: Float>(
    a: &Matrix<T>,
    cfg: &LinalgConfig<T>,
) -> Result<IterResult<MpInverse<T>>> {
    a.require_nonempty("pinv_penrose")?;
    let (m, n) = a.shape();
    let max_iter = cfg.max_iter_or(PENROSE_MAX_ITER);

    if !a.as_slice().iter().all(|&v| v.is_finite()) {
        return Err(CoreError::InvalidArgument {
            reason: "pinv_penrose requires finite entries",
        });
    }
    let c = a.max_abs();
    if c <= T::zero() {
        log::debug!("pinv_penrose: {m}x{n} zero matrix");
        let pinv = MpInverse {
            pinv: Matrix::zeros(n, m),
            rank: 0,
        };
        return Ok(IterResult::new(pinv, 0, 0.0, true));
    }

    let mut b = a.clone();
    b.scale_in_place(c.recip());
    let qr = QrDecomposition::decompose_pivoted_with(&b, cfg)?;
    let rank = qr.rank_with(cfg.tol);
    if rank < m.min(n) {
        b = truncate(&qr, rank);
    }

    // alpha < 2 / s_max^2 because s_max^2 <= ||B||_1 ||B||_inf
    let mut x = b.transpose();
    x.scale_in_place((b.norm_1() * b.norm_inf()).recip());

    let mut change = T::infinity();
    let mut converged = false;
    let mut iterations = max_iter;
    for iter in 1..=max_iter {
        // X_{k+1} = 2X - X (B X)
        let bx = b.matmul(&x)?;
        let xbx = x.matmul(&bx)?;
        let mut next = x.clone();
        next.scale_in_place(T::from_f64(2.0));
        next.add_scaled_in_place(-T::one(), &xbx)?;

        let diff = next.sub_checked(&x)?.norm_fro();
        let size = next.norm_fro();
        change = diff / size.max(T::min_positive());
        x = next;
        log::trace!("pinv_penrose: iteration {iter}, relative change {change}");

        if !change.is_finite() {
            return Err(CoreError::Diverged {
                op: "pinv_penrose",
                iteration: iter,
            });
        }
        if change <= cfg.tol {
            converged = true;
            iterations = iter;
            break;
        }
    }

    // (A / c)^+ = c A^+
    x.scale_in_place(c.recip());
    if converged {
        log::debug!("pinv_penrose: {m}x{n} converged after {iterations} iterations, rank {rank}");
    } else {
        log::warn!("pinv_penrose: {m}x{n} did not converge in {max_iter} iterations, relative change {change}");
    }
    Ok(IterResult::new(
        MpInverse { pinv: x, rank },
        iterations,
        change.to_f64(),
        converged,
    ))
}

/// `Q_r R_r P^T`: the pivoted QR factorization cut back to `rank` terms.
fn truncate<T: Float>(qr: &QrDecomposition<T>, rank: usize) -> Matrix<T> {
    let (m, n) = qr.shape();
    let q = qr.q_thin();
    let r = qr.r();
    let perm = qr.permutation();
    let mut out = Matrix::zeros(m, n);
    for i in 0..m {
        for (j, &col) in perm.iter().enumerate() {
            let mut acc = T::zero();
            for k in 0..rank.min(j + 1) {
                acc += q[(i, k)] * r[(k, j)];
            }
            out[(i, col)] = acc;
        }
    }
    out
}

// ======================================================================
// SVD route
// ======================================================================

/// Moore-Penrose inverse from the SVD.
pub fn pinv_svd<T: Float>(a: &Matrix<T>) -> Result<MpInverse<T>> {
    pinv_svd_with(a, &LinalgConfig::default())
}

/// SVD pseudoinverse with an explicit rank tolerance.
pub fn pinv_svd_with<T: Float>(a: &Matrix<T>, cfg: &LinalgConfig<T>) -> Result<MpInverse<T>> {
    let svd = SvdDecomposition::decompose_with(a, cfg)?;
    Ok(MpInverse {
        pinv: svd.pinv(),
        rank: svd.rank(),
    })
}

/// Orthonormal basis of the null space of `A` (n x (n - rank)), from the
/// right singular vectors.
///
/// ```
/// # use linvex_core::matrix::Matrix;
/// # use linvex_core::linalg::pinv::null_space;
/// let a = Matrix::from_vec(vec![1.0_f64, 1.0, 2.0, 2.0], 2, 2).unwrap();
/// let n = null_space(&a).unwrap();
/// assert_eq!(n.shape(), (2, 1));
/// assert!(a.matmul(&n).unwrap().max_abs() < 1e-12);
/// ```
pub fn null_space<T: Float>(a: &Matrix<T>) -> Result<Matrix<T>> {
    null_space_with(a, &LinalgConfig::default())
}

/// Null space with an explicit rank tolerance.
pub fn null_space_with<T: Float>(a: &Matrix<T>, cfg: &LinalgConfig<T>) -> Result<Matrix<T>> {
    Ok(SvdDecomposition::decompose_with(a, cfg)?.null_space())
}

/// Penrose inverse together with a null-space basis taken from the range of
/// the projector `I - A^+ A`.
///
/// The basis is read off a column-pivoted QR of the projector: its first
/// `n - rank` orthonormal columns span the projector's range. Convergence of
/// the underlying Penrose iteration is reported through the returned
/// [`IterResult`].
pub fn mp_inverse_null<T: Float>(
    a: &Matrix<T>,
) -> Result<IterResult<(MpInverse<T>, Matrix<T>)>> {
    mp_inverse_null_with(a, &LinalgConfig::default())
}

/// [`mp_inverse_null`] with an explicit configuration.
pub fn mp_inverse_null_with<T: Float>(
    a: &Matrix<T>,
    cfg: &LinalgConfig<T>,
) -> Result<IterResult<(MpInverse<T>, Matrix<T>)>> {
    let res = pinv_penrose_with(a, cfg)?;
    let n = a.cols();
    let k = n.saturating_sub(res.value.rank);

    let basis = if k == 0 {
        Matrix::zeros(n, 0)
    } else {
        let projector = res.value.projector(a)?;
        let q = QrDecomposition::decompose_pivoted_with(&projector, cfg)?.q_thin();
        Matrix::from_fn(n, k, |i, j| q[(i, j)])
    };
    Ok(res.map(|inv| (inv, basis)))
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn mat(data: &[f64], rows: usize, cols: usize) -> Matrix<f64> {
        Matrix::from_vec(data.to_vec(), rows, cols).unwrap()
    }

    /// The four Penrose conditions.
    fn check_penrose(a: &Matrix<f64>, p: &Matrix<f64>, tol: f64) {
        let ap = a.matmul(p).unwrap();
        let pa = p.matmul(a).unwrap();
        assert!(ap.matmul(a).unwrap().approx_eq(a, tol), "A A+ A != A");
        assert!(pa.matmul(p).unwrap().approx_eq(p, tol), "A+ A A+ != A+");
        assert!(ap.is_symmetric(tol), "A A+ not symmetric");
        assert!(pa.is_symmetric(tol), "A+ A not symmetric");
    }

    #[test]
    fn test_penrose_invertible_matches_inverse() {
        let a = mat(&[4.0, 7.0, 2.0, 6.0], 2, 2);
        let res = pinv_penrose(&a).unwrap();
        assert!(res.is_converged());
        assert_eq!(res.value.rank, 2);
        assert!(res.value.pinv.approx_eq(&a.inv().unwrap(), 1e-10));
    }

    #[test]
    fn test_penrose_rectangular_rank_deficient() {
        // Third row = first + second
        let a = mat(&[1.0, 2.0, 3.0, 4.0, 0.0, 1.0, 2.0, 1.0, 1.0, 3.0, 5.0, 5.0], 3, 4);
        let res = pinv_penrose(&a).unwrap();
        assert!(res.converged);
        assert_eq!(res.value.rank, 2);
        assert_eq!(res.value.pinv.shape(), (4, 3));
        check_penrose(&a, &res.value.pinv, 1e-9);
    }

    #[test]
    fn test_penrose_agrees_with_svd() {
        let a = mat(&[2.0, -1.0, 0.5, 1.0, 3.0, -2.0, 0.0, 1.0, 1.0, 4.0], 5, 2);
        let penrose = pinv_penrose(&a).unwrap().into_converged("pinv").unwrap();
        let svd = pinv_svd(&a).unwrap();
        assert_eq!(penrose.rank, svd.rank);
        assert!(penrose.pinv.approx_eq(&svd.pinv, 1e-9));
    }

    #[test]
    fn test_penrose_extreme_scales() {
        for scale in [1e200, 1e-170, 1e-200] {
            let a = mat(&[2.0 * scale, 0.0, 0.0, scale], 2, 2);
            let res = pinv_penrose(&a).unwrap();
            assert!(res.converged, "scale {scale}");
            assert_eq!(res.value.rank, 2);
            let unscaled = res.value.pinv.map(|v| v * scale);
            assert!(unscaled.approx_eq(&mat(&[0.5, 0.0, 0.0, 1.0], 2, 2), 1e-10));
        }
    }

    #[test]
    fn test_penrose_rank_uses_tolerance() {
        // U diag(1, 1e-3, 1e-11) V^T with orthogonal U and V
        let u = mat(&[1.0, 2.0, 2.0, 2.0, 1.0, -2.0, 2.0, -2.0, 1.0], 3, 3).map(|v| v / 3.0);
        let v = mat(&[0.6, 0.8, 0.0, -0.8, 0.6, 0.0, 0.0, 0.0, 1.0], 3, 3);
        let s = Matrix::from_diag(&Vector::from_vec(vec![1.0, 1e-3, 1e-11]));
        let a = u.matmul(&s).unwrap().matmul(&v.transpose()).unwrap();

        let penrose = pinv_penrose(&a).unwrap().into_converged("pinv").unwrap();
        let svd = pinv_svd(&a).unwrap();
        assert_eq!(svd.rank, 2);
        assert_eq!(penrose.rank, svd.rank);
        assert!(penrose.pinv.approx_eq(&svd.pinv, 1e-4));
        let apa = a.matmul(&penrose.pinv).unwrap().matmul(&a).unwrap();
        assert!(apa.approx_eq(&a, 1e-6));

        // A looser tolerance drops the middle direction in both routes
        let loose = LinalgConfig::default().with_tol(1e-1);
        assert_eq!(pinv_penrose_with(&a, &loose).unwrap().value.rank, 1);
        assert_eq!(pinv_svd_with(&a, &loose).unwrap().rank, 1);
    }

    #[test]
    fn test_penrose_non_finite_input() {
        for bad in [f64::INFINITY, f64::NAN] {
            let a = mat(&[1.0, bad, 0.0, 1.0], 2, 2);
            assert!(matches!(
                pinv_penrose(&a),
                Err(CoreError::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn test_penrose_zero_matrix() {
        let res = pinv_penrose(&Matrix::<f64>::zeros(2, 3)).unwrap();
        assert!(res.converged);
        assert_eq!(res.value.rank, 0);
        assert_eq!(res.value.pinv.shape(), (3, 2));
        assert!(res.value.pinv.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_penrose_cap_is_soft() {
        let a = mat(&[1.0, 0.0, 0.0, 1e-3], 2, 2);
        let cfg = LinalgConfig::default().with_max_iter(2);
        let res = pinv_penrose_with(&a, &cfg).unwrap();
        assert!(!res.converged);
        assert_eq!(res.iterations, 2);
    }

    #[test]
    fn test_pinv_svd_penrose_conditions() {
        let a = mat(&[1.0, 2.0, 2.0, 4.0, 3.0, 6.0], 3, 2);
        let inv = pinv_svd(&a).unwrap();
        assert_eq!(inv.rank, 1);
        check_penrose(&a, &inv.pinv, 1e-10);
    }

    #[test]
    fn test_null_space() {
        let a = mat(&[1.0, 2.0, 3.0, 2.0, 4.0, 6.0], 2, 3);
        let n = null_space(&a).unwrap();
        assert_eq!(n.shape(), (3, 2));
        assert!(a.matmul(&n).unwrap().max_abs() < 1e-10);
        let ntn = n.tr_matmul(&n).unwrap();
        assert!(ntn.approx_eq(&Matrix::eye(2), 1e-10));
    }

    #[test]
    fn test_null_space_full_rank() {
        let n = null_space(&Matrix::<f64>::eye(3)).unwrap();
        assert_eq!(n.shape(), (3, 0));
    }

    #[test]
    fn test_mp_inverse_null() {
        let a = mat(&[1.0, 1.0, 0.0, 0.0, 1.0, 1.0], 2, 3);
        let (inv, basis) = mp_inverse_null(&a).unwrap().into_converged("mp").unwrap();
        assert_eq!(inv.rank, 2);
        assert_eq!(basis.shape(), (3, 1));
        assert!(a.matmul(&basis).unwrap().max_abs() < 1e-9);
        let norm = basis.column(0).unwrap().norm();
        assert!((norm - 1.0).abs() < 1e-10);

        let projector = inv.projector(&a).unwrap();
        let p2 = projector.matmul(&projector).unwrap();
        assert!(p2.approx_eq(&projector, 1e-10));
    }

    #[test]
    fn test_general_solution_at() {
        let sol = GeneralSolution {
            particular: Vector::from_vec(vec![1.0, 1.0]),
            null_basis: mat(&[1.0, -1.0], 2, 1),
        };
        assert_eq!(sol.null_dim(), 1);
        let x = sol.at(&Vector::from_vec(vec![2.0])).unwrap();
        assert_eq!(x.as_slice(), &[3.0, -1.0]);
        assert!(sol.at(&Vector::zeros(2)).is_err());

        let unique = GeneralSolution {
            particular: Vector::from_vec(vec![5.0]),
            null_basis: Matrix::zeros(1, 0),
        };
        assert!(unique.is_unique());
        assert_eq!(unique.at(&Vector::zeros(0)).unwrap().as_slice(), &[5.0]);
    }
}
