//! Sturm-sequence bisection for symmetric matrices.
//!
//! The matrix is first reduced to tridiagonal form `T = P^T A P` by the
//! Hessenberg reduction. Each eigenvalue of `T` is then isolated
//! independently by bisection on the Gershgorin interval, using the Sturm
//! count of eigenvalues below a shift. Eigenvectors come from inverse
//! iteration on `T`, reorthogonalized inside clusters of close eigenvalues,
//! and are mapped back through `P`.

use crate::Float;
use crate::config::LinalgConfig;
use crate::error::Result;
use crate::linalg::decomp::HessenbergDecomposition;
use crate::matrix::Matrix;

use super::{SymmetricEigen, require_symmetric};

/// Upper bound on bisection steps; the interval reaches machine precision
/// long before this.
const MAX_BISECTIONS: usize = 256;

/// Inverse iteration steps per eigenvector.
const INVERSE_ITERATIONS: usize = 3;

/// Symmetric tridiagonal matrix: diagonal `d`, off-diagonal `e`.
struct Tridiagonal<T: Float> {
    d: Vec<T>,
    e: Vec<T>,
    /// Smallest pivot allowed in the Sturm recurrence.
    pivmin: T,
    /// Bound on `||T||`.
    norm: T,
}

impl<T: Float> Tridiagonal<T> {
    fn from_hessenberg(h: &[T], n: usize) -> Self {
        let d: Vec<T> = (0..n).map(|i| h[i * n + i]).collect();
        let two = T::from_f64(2.0);
        let e: Vec<T> = (0..n.saturating_sub(1))
            .map(|i| (h[(i + 1) * n + i] + h[i * n + i + 1]) / two)
            .collect();
        let max_e2 = e.iter().fold(T::one(), |acc, &x| acc.max(x * x));
        let norm = (0..n).fold(T::zero(), |acc, i| {
            let left = if i > 0 { e[i - 1].abs() } else { T::zero() };
            let right = if i + 1 < n { e[i].abs() } else { T::zero() };
            acc.max(d[i].abs() + left + right)
        });
        Self {
            d,
            e,
            pivmin: T::min_positive() * max_e2,
            norm,
        }
    }

    fn dim(&self) -> usize {
        self.d.len()
    }

    /// Number of eigenvalues strictly below `x`.
    fn count_below(&self, x: T) -> usize {
        let mut count = 0;
        let mut q = T::one();
        for i in 0..self.dim() {
            q = if i == 0 {
                self.d[0] - x
            } else {
                self.d[i] - x - self.e[i - 1] * self.e[i - 1] / q
            };
            if q.abs() < self.pivmin {
                q = -self.pivmin;
            }
            if q < T::zero() {
                count += 1;
            }
        }
        count
    }

    /// Gershgorin interval containing every eigenvalue.
    fn gershgorin(&self) -> (T, T) {
        let n = self.dim();
        let mut lo = T::infinity();
        let mut hi = -T::infinity();
        for i in 0..n {
            let left = if i > 0 { self.e[i - 1].abs() } else { T::zero() };
            let right = if i + 1 < n { self.e[i].abs() } else { T::zero() };
            lo = lo.min(self.d[i] - left - right);
            hi = hi.max(self.d[i] + left + right);
        }
        let pad = T::epsilon() * T::from_f64(4.0) * self.norm + self.pivmin;
        (lo - pad, hi + pad)
    }

    /// The `k`-th smallest eigenvalue (0-based).
    fn eigenvalue(&self, k: usize, bounds: (T, T)) -> T {
        let (mut lo, mut hi) = bounds;
        let two = T::from_f64(2.0);
        for _ in 0..MAX_BISECTIONS {
            let width = hi - lo;
            let tol = two * T::epsilon() * lo.abs().max(hi.abs()) + self.pivmin;
            if width <= tol {
                break;
            }
            let mid = lo + width / two;
            if mid <= lo || mid >= hi {
                break;
            }
            if self.count_below(mid) > k {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        lo + (hi - lo) / two
    }

    /// Overwrite `x` with `(T - lambda I)^{-1} x`, repeatedly normalized.
    ///
    /// Gaussian elimination with partial pivoting on the band; pivots that
    /// vanish are replaced by a tiny multiple of `||T||`.
    #[allow(clippy::many_single_char_names)]
    fn inverse_iterate(&self, lambda: T, x: &mut [T], previous: &[Vec<T>]) {
        let n = self.dim();
        let pert = if self.norm > T::zero() {
            T::epsilon() * self.norm
        } else {
            T::epsilon()
        };

        let mut dl: Vec<T> = self.e.clone();
        let mut dd: Vec<T> = self.d.iter().map(|&di| di - lambda).collect();
        let mut du: Vec<T> = self.e.clone();
        let mut du2 = vec![T::zero(); n.saturating_sub(2)];
        let mut swapped = vec![false; n.saturating_sub(1)];

        for i in 0..n.saturating_sub(1) {
            if dd[i].abs() >= dl[i].abs() {
                if dd[i].abs() < pert {
                    dd[i] = pert;
                }
                let fact = dl[i] / dd[i];
                dl[i] = fact;
                dd[i + 1] -= fact * du[i];
            } else {
                let fact = dd[i] / dl[i];
                dd[i] = dl[i];
                dl[i] = fact;
                let temp = du[i];
                du[i] = dd[i + 1];
                dd[i + 1] = temp - fact * dd[i + 1];
                if i + 2 < n {
                    du2[i] = du[i + 1];
                    du[i + 1] = -fact * du[i + 1];
                }
                swapped[i] = true;
            }
        }
        if dd[n - 1].abs() < pert {
            dd[n - 1] = pert;
        }

        for _ in 0..INVERSE_ITERATIONS {
            // Forward: apply L^{-1} with the recorded row swaps
            for i in 0..n.saturating_sub(1) {
                if swapped[i] {
                    let temp = x[i];
                    x[i] = x[i + 1];
                    x[i + 1] = temp - dl[i] * x[i];
                } else {
                    x[i + 1] -= dl[i] * x[i];
                }
            }
            // Backward: U has two superdiagonals
            for i in (0..n).rev() {
                let mut acc = x[i];
                if i + 1 < n {
                    acc -= du[i] * x[i + 1];
                }
                if i + 2 < n {
                    acc -= du2[i] * x[i + 2];
                }
                x[i] = acc / dd[i];
            }

            orthogonalize(x, previous);
            normalize(x);
        }
    }
}

fn orthogonalize<T: Float>(x: &mut [T], basis: &[Vec<T>]) {
    for b in basis {
        let dot = x.iter().zip(b).fold(T::zero(), |acc, (&xi, &bi)| acc + xi * bi);
        for (xi, &bi) in x.iter_mut().zip(b) {
            *xi -= dot * bi;
        }
    }
}

fn normalize<T: Float>(x: &mut [T]) -> T {
    let norm = x.iter().fold(T::zero(), |acc, &v| acc.hypot(v));
    if norm > T::zero() {
        for v in x.iter_mut() {
            *v /= norm;
        }
    }
    norm
}

/// Deterministic start vector for inverse iteration, different for every
/// eigenvalue index so that vectors in a cluster start apart.
fn start_vector<T: Float>(n: usize, k: usize) -> Vec<T> {
    let mut state = (k as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ 0x2545_F491_4F6C_DD1D;
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            // Map the top 53 bits to [0.5, 1.5)
            #[allow(clippy::cast_precision_loss)]
            let u = (state >> 11) as f64 / (1u64 << 53) as f64;
            T::from_f64(0.5 + u)
        })
        .collect()
}

impl<T: Float> SymmetricEigen<T> {
    /// Eigendecomposition of a symmetric matrix by tridiagonal bisection.
    ///
    /// Eigenvalues are bisected to machine precision and `cfg.tol` only
    /// bounds the symmetry check. Neighbouring eigenvalues closer than
    /// `1e-3 ||T||` form a cluster whose eigenvectors are explicitly
    /// orthogonalized.
    ///
    /// ```
    /// # use linvex_core::matrix::Matrix;
    /// # use linvex_core::linalg::eigen::SymmetricEigen;
    /// let a = Matrix::from_vec(vec![2.0_f64, 1.0, 1.0, 2.0], 2, 2).unwrap();
    /// let eig = SymmetricEigen::bisection(&a).unwrap();
    /// assert!((eig.eigenvalues()[0] - 3.0).abs() < 1e-12);
    /// assert!((eig.eigenvalues()[1] - 1.0).abs() < 1e-12);
    /// ```
    pub fn bisection(a: &Matrix<T>) -> Result<Self> {
        Self::bisection_with(a, &LinalgConfig::default())
    }

    /// Bisection eigendecomposition with an explicit configuration.
    pub fn bisection_with(a: &Matrix<T>, cfg: &LinalgConfig<T>) -> Result<Self> {
        let n = require_symmetric(a, "bisection", cfg)?;
        let (h, p) = HessenbergDecomposition::decompose(a)?.into_parts();
        let tri = Tridiagonal::from_hessenberg(&h, n);

        let bounds = tri.gershgorin();
        let values: Vec<T> = (0..n).map(|k| tri.eigenvalue(k, bounds)).collect();

        // Gap below which eigenvectors are orthogonalized against each other
        let cluster_gap = T::from_f64(1e-3) * tri.norm + T::from_f64(4.0) * tri.pivmin;

        let mut tri_vectors: Vec<Vec<T>> = Vec::with_capacity(n);
        let mut cluster_start = 0;
        for k in 0..n {
            if k > 0 && values[k] - values[k - 1] > cluster_gap {
                cluster_start = k;
            }
            let mut y = start_vector(n, k);
            tri.inverse_iterate(values[k], &mut y, &tri_vectors[cluster_start..k]);
            tri_vectors.push(y);
        }
        log::debug!(
            "bisection: {n}x{n}, eigenvalues in [{}, {}]",
            values.first().copied().unwrap_or_else(T::zero),
            values.last().copied().unwrap_or_else(T::zero)
        );

        // Back-transform: v = P y
        let mut vectors = vec![T::zero(); n * n];
        for (k, y) in tri_vectors.iter().enumerate() {
            for i in 0..n {
                let row = &p[i * n..(i + 1) * n];
                vectors[i * n + k] = row
                    .iter()
                    .zip(y)
                    .fold(T::zero(), |acc, (&pij, &yj)| acc + pij * yj);
            }
        }

        Ok(Self::from_unsorted(&values, &vectors, n))
    }
}
