//! Least-squares, minimum-norm and pseudoinverse solvers for rectangular
//! or rank-deficient systems.
//!
//! Weights are passed as vectors of positive diagonal entries `W = diag(w)`.

use crate::Float;
use crate::config::LinalgConfig;
use crate::error::{CoreError, Result};
use crate::linalg::decomp::{LuDecomposition, SvdDecomposition};
use crate::linalg::pinv::GeneralSolution;
use crate::matrix::{Matrix, Vector};

use super::check_weights;

/// `A^T diag(w) A` (n x n); `w = None` means the identity.
#[allow(clippy::needless_range_loop)]
fn weighted_gram<T: Float>(a: &Matrix<T>, w: Option<&Vector<T>>) -> Matrix<T> {
    let (m, n) = a.shape();
    let data = a.as_slice();
    let mut g = Matrix::zeros(n, n);
    for i in 0..m {
        let wi = w.map_or(T::one(), |w| w[i]);
        let row = &data[i * n..(i + 1) * n];
        for k in 0..n {
            let s = wi * row[k];
            if s == T::zero() {
                continue;
            }
            for l in k..n {
                g[(k, l)] += s * row[l];
            }
        }
    }
    for k in 0..n {
        for l in 0..k {
            g[(k, l)] = g[(l, k)];
        }
    }
    g
}

/// `A diag(w)^-1 A^T` (m x m).
fn inverse_weighted_outer<T: Float>(a: &Matrix<T>, w: &Vector<T>) -> Matrix<T> {
    let (m, n) = a.shape();
    let data = a.as_slice();
    Matrix::from_fn(m, m, |i, j| {
        (0..n).fold(T::zero(), |acc, k| {
            acc + data[i * n + k] * data[j * n + k] / w[k]
        })
    })
}

fn require_tall<T: Float>(a: &Matrix<T>, op: &'static str) -> Result<()> {
    if a.rows() < a.cols() {
        log::debug!("{op}: {}x{} has fewer rows than columns", a.rows(), a.cols());
        return Err(CoreError::InvalidArgument {
            reason: "least squares needs at least as many rows as columns",
        });
    }
    Ok(())
}

fn require_wide<T: Float>(a: &Matrix<T>, op: &'static str) -> Result<()> {
    if a.rows() > a.cols() {
        log::debug!("{op}: {}x{} has more rows than columns", a.rows(), a.cols());
        return Err(CoreError::InvalidArgument {
            reason: "minimum-norm solve needs at least as many columns as rows",
        });
    }
    Ok(())
}

// ======================================================================
// Normal equations and weighted variants
// ======================================================================

/// Least-squares solution of an overdetermined full-column-rank system
/// from the normal equations `A^T A x = A^T b`.
///
/// Squares the condition number; prefer [`QrDecomposition::solve`] or
/// [`solve_mp`] for ill-conditioned `A`.
///
/// [`QrDecomposition::solve`]: crate::linalg::decomp::QrDecomposition::solve
///
/// ```
/// # use linvex_core::matrix::{Matrix, Vector};
/// # use linvex_core::linalg::solve::solve_normal_equations;
/// // Fit y = c0 + c1 t through (0, 1), (1, 3), (2, 5)
/// let a = Matrix::from_vec(vec![1.0_f64, 0.0, 1.0, 1.0, 1.0, 2.0], 3, 2).unwrap();
/// let b = Vector::from_vec(vec![1.0, 3.0, 5.0]);
/// let c = solve_normal_equations(&a, &b).unwrap();
/// assert!((c[0] - 1.0).abs() < 1e-10);
/// assert!((c[1] - 2.0).abs() < 1e-10);
/// ```
pub fn solve_normal_equations<T: Float>(a: &Matrix<T>, b: &Vector<T>) -> Result<Vector<T>> {
    solve_normal_equations_with(a, b, &LinalgConfig::default())
}

/// Normal equations with an explicit singularity threshold.
pub fn solve_normal_equations_with<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    cfg: &LinalgConfig<T>,
) -> Result<Vector<T>> {
    b.check_len(a.rows(), "solve_normal_equations")?;
    require_tall(a, "solve_normal_equations")?;
    let gram = weighted_gram(a, None);
    let atb = a.tr_matvec(b)?;
    LuDecomposition::decompose_with(&gram, cfg)?.solve(&atb)
}

/// Weighted least squares: minimize `(b - Ax)^T W (b - Ax)`, solved as
/// `x = (A^T W A)^-1 A^T W b`. `w` has one positive weight per row.
pub fn solve_error_min<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    w: &Vector<T>,
) -> Result<Vector<T>> {
    solve_error_min_with(a, b, w, &LinalgConfig::default())
}

/// Weighted least squares with an explicit singularity threshold.
pub fn solve_error_min_with<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    w: &Vector<T>,
    cfg: &LinalgConfig<T>,
) -> Result<Vector<T>> {
    let m = a.rows();
    b.check_len(m, "solve_error_min")?;
    check_weights(w, m, "solve_error_min")?;
    require_tall(a, "solve_error_min")?;

    let gram = weighted_gram(a, Some(w));
    let wb: Vector<T> = b.iter().zip(w.iter()).map(|(&bi, &wi)| bi * wi).collect();
    let rhs = a.tr_matvec(&wb)?;
    LuDecomposition::decompose_with(&gram, cfg)?.solve(&rhs)
}

/// Weighted minimum norm: minimize `x^T W x` subject to `Ax = b`, solved as
/// `x = W^-1 A^T (A W^-1 A^T)^-1 b`. `w` has one positive weight per column;
/// `A` must have full row rank.
///
/// ```
/// # use linvex_core::matrix::{Matrix, Vector};
/// # use linvex_core::linalg::solve::solve_norm_min;
/// // x0 + x1 = 2 with x1 twice as expensive as x0
/// let a = Matrix::from_vec(vec![1.0_f64, 1.0], 1, 2).unwrap();
/// let b = Vector::from_vec(vec![2.0]);
/// let w = Vector::from_vec(vec![1.0, 2.0]);
/// let x = solve_norm_min(&a, &b, &w).unwrap();
/// assert!((x[0] - 4.0 / 3.0).abs() < 1e-12);
/// assert!((x[1] - 2.0 / 3.0).abs() < 1e-12);
/// ```
pub fn solve_norm_min<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    w: &Vector<T>,
) -> Result<Vector<T>> {
    solve_norm_min_with(a, b, w, &LinalgConfig::default())
}

/// Weighted minimum norm with an explicit singularity threshold.
pub fn solve_norm_min_with<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    w: &Vector<T>,
    cfg: &LinalgConfig<T>,
) -> Result<Vector<T>> {
    let (m, n) = a.shape();
    b.check_len(m, "solve_norm_min")?;
    check_weights(w, n, "solve_norm_min")?;
    require_wide(a, "solve_norm_min")?;

    let outer = inverse_weighted_outer(a, w);
    let y = LuDecomposition::decompose_with(&outer, cfg)?.solve(b)?;
    let aty = a.tr_matvec(&y)?;
    Ok(aty.iter().zip(w.iter()).map(|(&v, &wi)| v / wi).collect())
}

/// Reference tracking: minimize `(x - r)^T W (x - r)` subject to `Ax = b`,
/// i.e. the feasible point closest to `r` in the `W` norm:
/// `x = r + W^-1 A^T (A W^-1 A^T)^-1 (b - A r)`.
pub fn solve_ref_min<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    r: &Vector<T>,
    w: &Vector<T>,
) -> Result<Vector<T>> {
    solve_ref_min_with(a, b, r, w, &LinalgConfig::default())
}

/// Reference tracking with an explicit singularity threshold.
pub fn solve_ref_min_with<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    r: &Vector<T>,
    w: &Vector<T>,
    cfg: &LinalgConfig<T>,
) -> Result<Vector<T>> {
    r.check_len(a.cols(), "solve_ref_min")?;
    b.check_len(a.rows(), "solve_ref_min")?;
    let gap = b.sub_checked(&a.matvec(r)?)?;
    let dx = solve_norm_min_with(a, &gap, w, cfg)?;
    r.add_checked(&dx)
}

// ======================================================================
// Pseudoinverse solvers
// ======================================================================

/// Minimum-norm least-squares solution through the SVD pseudoinverse, for
/// any shape and rank.
///
/// With `row_weights` the residual is measured as `(b - Ax)^T W_r (b - Ax)`;
/// with `col_weights` the minimum-norm choice among least-squares solutions
/// uses `x^T W_c x`. `None` means unit weights.
pub fn solve_mp<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    row_weights: Option<&Vector<T>>,
    col_weights: Option<&Vector<T>>,
) -> Result<Vector<T>> {
    solve_mp_with(a, b, row_weights, col_weights, &LinalgConfig::default())
}

/// Weighted pseudoinverse solve with an explicit rank tolerance.
pub fn solve_mp_with<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    row_weights: Option<&Vector<T>>,
    col_weights: Option<&Vector<T>>,
    cfg: &LinalgConfig<T>,
) -> Result<Vector<T>> {
    let (m, n) = a.shape();
    b.check_len(m, "solve_mp")?;
    if row_weights.is_none() && col_weights.is_none() {
        return SvdDecomposition::decompose_with(a, cfg)?.solve(b);
    }

    let sqrt_weights = |w: Option<&Vector<T>>, len: usize| -> Result<Vector<T>> {
        match w {
            Some(w) => {
                check_weights(w, len, "solve_mp")?;
                Ok(w.iter().map(|&wi| wi.sqrt()).collect())
            }
            None => Ok(Vector::full(len, T::one())),
        }
    };
    let dr = sqrt_weights(row_weights, m)?;
    let dc = sqrt_weights(col_weights, n)?;

    // A~ = D_r A D_c^-1, x = D_c^-1 A~^+ D_r b
    let scaled = Matrix::from_fn(m, n, |i, j| dr[i] * a[(i, j)] / dc[j]);
    let rhs: Vector<T> = b.iter().zip(dr.iter()).map(|(&bi, &di)| bi * di).collect();
    let y = SvdDecomposition::decompose_with(&scaled, cfg)?.solve(&rhs)?;
    Ok(y.iter().zip(dc.iter()).map(|(&yi, &di)| yi / di).collect())
}

/// `x = A^+ b + (I - A^+ A) aux`: the least-squares solution whose
/// null-space component is that of `aux`.
pub fn solve_mp_aux<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    aux: &Vector<T>,
) -> Result<Vector<T>> {
    solve_mp_aux_with(a, b, aux, &LinalgConfig::default())
}

/// [`solve_mp_aux`] with an explicit rank tolerance.
pub fn solve_mp_aux_with<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    aux: &Vector<T>,
    cfg: &LinalgConfig<T>,
) -> Result<Vector<T>> {
    b.check_len(a.rows(), "solve_mp_aux")?;
    aux.check_len(a.cols(), "solve_mp_aux")?;
    let svd = SvdDecomposition::decompose_with(a, cfg)?;
    let x0 = svd.solve(b)?;
    // (I - A^+ A) aux = aux - A^+ (A aux)
    let row_part = svd.solve(&a.matvec(aux)?)?;
    let free = aux.sub_checked(&row_part)?;
    x0.add_checked(&free)
}

/// The complete solution set `x_0 + N y`: `x_0 = A^+ b` and an orthonormal
/// null-space basis `N` from the SVD.
///
/// ```
/// # use linvex_core::matrix::{Matrix, Vector};
/// # use linvex_core::linalg::solve::solve_mp_null;
/// let a = Matrix::from_vec(vec![1.0_f64, 1.0], 1, 2).unwrap();
/// let b = Vector::from_vec(vec![2.0]);
/// let sol = solve_mp_null(&a, &b).unwrap();
/// assert_eq!(sol.null_dim(), 1);
/// let x = sol.at(&Vector::from_vec(vec![3.0])).unwrap();
/// assert!((x[0] + x[1] - 2.0).abs() < 1e-12);
/// ```
pub fn solve_mp_null<T: Float>(a: &Matrix<T>, b: &Vector<T>) -> Result<GeneralSolution<T>> {
    solve_mp_null_with(a, b, &LinalgConfig::default())
}

/// [`solve_mp_null`] with an explicit rank tolerance.
pub fn solve_mp_null_with<T: Float>(
    a: &Matrix<T>,
    b: &Vector<T>,
    cfg: &LinalgConfig<T>,
) -> Result<GeneralSolution<T>> {
    b.check_len(a.rows(), "solve_mp_null")?;
    let svd = SvdDecomposition::decompose_with(a, cfg)?;
    let particular = svd.solve(b)?;
    let null_basis = svd.null_space();
    log::debug!(
        "solve_mp_null: {}x{} rank {}, {} free parameters",
        a.rows(),
        a.cols(),
        svd.rank(),
        null_basis.cols()
    );
    Ok(GeneralSolution {
        particular,
        null_basis,
    })
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn mat(data: &[f64], rows: usize, cols: usize) -> Matrix<f64> {
        Matrix::from_vec(data.to_vec(), rows, cols).unwrap()
    }

    fn approx_eq(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| (x - y).abs() < tol)
    }

    fn tall() -> (Matrix<f64>, Vector<f64>) {
        let a = mat(&[1.0, 1.0, 1.0, 2.0, 1.0, 3.0, 1.0, 4.0], 4, 2);
        let b = Vector::from_vec(vec![6.0, 5.0, 7.0, 10.0]);
        (a, b)
    }

    #[test]
    fn test_normal_equations_match_qr() {
        let (a, b) = tall();
        let x = solve_normal_equations(&a, &b).unwrap();
        let expected = crate::linalg::decomp::lstsq(&a, &b).unwrap();
        assert!(approx_eq(x.as_slice(), expected.as_slice(), 1e-10));
        // Known fit: 3.5 + 1.4 t
        assert!(approx_eq(x.as_slice(), &[3.5, 1.4], 1e-10));
    }

    #[test]
    fn test_normal_equations_rejects_wide() {
        let a = mat(&[1.0, 2.0, 3.0], 1, 3);
        let b = Vector::from_vec(vec![1.0]);
        assert!(matches!(
            solve_normal_equations(&a, &b),
            Err(CoreError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_error_min_unit_weights() {
        let (a, b) = tall();
        let w = Vector::full(4, 1.0);
        let x = solve_error_min(&a, &b, &w).unwrap();
        assert!(approx_eq(x.as_slice(), &[3.5, 1.4], 1e-10));
    }

    #[test]
    fn test_error_min_heavy_weight_pins_row() {
        let (a, b) = tall();
        let w = Vector::from_vec(vec![1e8, 1.0, 1.0, 1e8]);
        let x = solve_error_min(&a, &b, &w).unwrap();
        // Rows 0 and 3 are matched almost exactly
        let ax = a.matvec(&x).unwrap();
        assert!((ax[0] - 6.0).abs() < 1e-6);
        assert!((ax[3] - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_error_min_bad_weights() {
        let (a, b) = tall();
        let w = Vector::from_vec(vec![1.0, -1.0, 1.0, 1.0]);
        assert!(solve_error_min(&a, &b, &w).is_err());
    }

    #[test]
    fn test_norm_min_unit_weights_is_pinv() {
        let a = mat(&[1.0, 2.0, 0.0, 1.0, 0.0, 1.0, 1.0, 3.0], 2, 4);
        let b = Vector::from_vec(vec![2.0, 5.0]);
        let x = solve_norm_min(&a, &b, &Vector::full(4, 1.0)).unwrap();
        let expected = solve_mp(&a, &b, None, None).unwrap();
        assert!(approx_eq(x.as_slice(), expected.as_slice(), 1e-10));
        assert!(approx_eq(a.matvec(&x).unwrap().as_slice(), b.as_slice(), 1e-10));
    }

    #[test]
    fn test_ref_min() {
        // Closest point to r on the line x0 + x1 = 2
        let a = mat(&[1.0, 1.0], 1, 2);
        let b = Vector::from_vec(vec![2.0]);
        let r = Vector::from_vec(vec![3.0, 1.0]);
        let x = solve_ref_min(&a, &b, &r, &Vector::full(2, 1.0)).unwrap();
        assert!(approx_eq(x.as_slice(), &[2.0, 0.0], 1e-12));

        // A reference already on the constraint is returned unchanged
        let on = Vector::from_vec(vec![0.5, 1.5]);
        let x = solve_ref_min(&a, &b, &on, &Vector::from_vec(vec![1.0, 3.0])).unwrap();
        assert!(approx_eq(x.as_slice(), on.as_slice(), 1e-12));
    }

    #[test]
    fn test_mp_rank_deficient() {
        // Columns 0 and 1 are identical: the minimum-norm solution splits evenly
        let a = mat(&[1.0, 1.0, 2.0, 2.0, 3.0, 3.0], 3, 2);
        let b = Vector::from_vec(vec![2.0, 4.0, 6.0]);
        let x = solve_mp(&a, &b, None, None).unwrap();
        assert!(approx_eq(x.as_slice(), &[1.0, 1.0], 1e-10));
    }

    #[test]
    fn test_mp_column_weights_shift_solution() {
        let a = mat(&[1.0, 1.0], 1, 2);
        let b = Vector::from_vec(vec![2.0]);
        let w = Vector::from_vec(vec![1.0, 2.0]);
        let x = solve_mp(&a, &b, None, Some(&w)).unwrap();
        let expected = solve_norm_min(&a, &b, &w).unwrap();
        assert!(approx_eq(x.as_slice(), expected.as_slice(), 1e-10));
    }

    #[test]
    fn test_mp_row_weights_match_error_min() {
        let (a, b) = tall();
        let w = Vector::from_vec(vec![4.0, 1.0, 0.25, 2.0]);
        let x = solve_mp(&a, &b, Some(&w), None).unwrap();
        let expected = solve_error_min(&a, &b, &w).unwrap();
        assert!(approx_eq(x.as_slice(), expected.as_slice(), 1e-9));
    }

    #[test]
    fn test_mp_aux() {
        let a = mat(&[1.0, 1.0], 1, 2);
        let b = Vector::from_vec(vec![2.0]);
        // aux lies entirely in the null space direction [1, -1]
        let aux = Vector::from_vec(vec![1.0, -1.0]);
        let x = solve_mp_aux(&a, &b, &aux).unwrap();
        assert!(approx_eq(x.as_slice(), &[2.0, 0.0], 1e-12));
        // The row-space part of aux is discarded
        let aux = Vector::from_vec(vec![5.0, 5.0]);
        let x = solve_mp_aux(&a, &b, &aux).unwrap();
        assert!(approx_eq(x.as_slice(), &[1.0, 1.0], 1e-12));
    }

    #[test]
    fn test_mp_null_general_solution() {
        // Rank 1: second row is twice the first
        let a = mat(&[1.0, 2.0, -1.0, 2.0, 4.0, -2.0], 2, 3);
        let b = Vector::from_vec(vec![3.0, 6.0]);
        let sol = solve_mp_null(&a, &b).unwrap();
        assert_eq!(sol.null_dim(), 2);
        for y in [[0.0, 0.0], [1.0, -2.0], [10.0, 3.5]] {
            let x = sol.at(&Vector::from_slice(&y)).unwrap();
            assert!(approx_eq(a.matvec(&x).unwrap().as_slice(), b.as_slice(), 1e-10));
        }
    }
}
