//! Eigendecomposition of a general real square matrix.
//!
//! The matrix is first reduced to upper Hessenberg form, then driven to real
//! Schur form by the Francis double-shift QR algorithm. Real eigenvalues sit
//! on the diagonal of the quasi-triangular result; complex conjugate pairs
//! appear as 2x2 blocks. Eigenvectors are found by back substitution in the
//! Schur form and mapped back through the accumulated orthogonal transforms.

use num_complex::Complex;

use crate::Float;
use crate::config::LinalgConfig;
use crate::error::{CoreError, Result};
use crate::linalg::decomp::HessenbergDecomposition;
use crate::matrix::Matrix;

/// Eigenvalues and eigenvectors of a general real matrix.
///
/// Complex eigenvalues come in adjacent conjugate pairs, positive
/// imaginary part first. Internally the eigenvectors are kept in the real
/// block form `A V = V D`, where `D` is block diagonal with 1x1 blocks for
/// real eigenvalues and `[[re, im], [-im, re]]` blocks for complex pairs.
#[derive(Debug, Clone)]
pub struct GeneralEigen<T: Float> {
    values: Vec<Complex<T>>,
    /// Real block-form eigenvector matrix (n x n), row-major.
    vectors: Vec<T>,
    n: usize,
}

impl<T: Float> GeneralEigen<T> {
    /// Compute all eigenvalues and eigenvectors of a square matrix.
    ///
    /// Fails with [`CoreError::NoConvergence`] when a single eigenvalue takes
    /// more than `30 n` QR sweeps (override with `cfg.max_iter`).
    ///
    /// ```
    /// # use linvex_core::matrix::Matrix;
    /// # use linvex_core::linalg::eigen::GeneralEigen;
    /// // Rotation by 90 degrees: eigenvalues +i and -i
    /// let a = Matrix::from_vec(vec![0.0_f64, -1.0, 1.0, 0.0], 2, 2).unwrap();
    /// let eig = GeneralEigen::decompose(&a).unwrap();
    /// let vals = eig.eigenvalues();
    /// assert!(vals[0].re.abs() < 1e-12 && (vals[0].im - 1.0).abs() < 1e-12);
    /// assert!(vals[1].re.abs() < 1e-12 && (vals[1].im + 1.0).abs() < 1e-12);
    /// ```
    pub fn decompose(a: &Matrix<T>) -> Result<Self> {
        Self::decompose_with(a, &LinalgConfig::default())
    }

    /// General eigendecomposition with an explicit configuration.
    pub fn decompose_with(a: &Matrix<T>, cfg: &LinalgConfig<T>) -> Result<Self> {
        let n = a.require_square("general eigen")?;
        let (h, v) = HessenbergDecomposition::decompose(a)?.into_parts();
        let max_iter = cfg.max_iter_or(30 * n);

        let mut schur = Schur::new(h, v, n);
        let sweeps = schur.reduce(max_iter)?;
        schur.back_substitute();
        log::debug!("general eigen: {n}x{n} reduced to Schur form in {sweeps} QR sweeps");

        let values = schur
            .d
            .iter()
            .zip(&schur.e)
            .map(|(&re, &im)| Complex::new(re, im))
            .collect();
        Ok(Self {
            values,
            vectors: schur.v,
            n,
        })
    }

    /// The eigenvalues, in Schur-form order.
    pub fn eigenvalues(&self) -> &[Complex<T>] {
        &self.values
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Whether every eigenvalue is real.
    pub fn is_real(&self) -> bool {
        self.values.iter().all(|z| z.im == T::zero())
    }

    /// The unit (2-norm) eigenvector belonging to `eigenvalues()[i]`.
    pub fn eigenvector(&self, i: usize) -> Result<Vec<Complex<T>>> {
        let n = self.n;
        if i >= n {
            return Err(CoreError::IndexOutOfBounds {
                index: vec![i],
                shape: vec![n],
            });
        }
        let col = |j: usize| (0..n).map(move |r| self.vectors[r * n + j]);
        let im = self.values[i].im;
        let mut out: Vec<Complex<T>> = if im > T::zero() {
            col(i)
                .zip(col(i + 1))
                .map(|(a, b)| Complex::new(a, b))
                .collect()
        } else if im < T::zero() {
            col(i - 1)
                .zip(col(i))
                .map(|(a, b)| Complex::new(a, -b))
                .collect()
        } else {
            col(i).map(|re| Complex::new(re, T::zero())).collect()
        };

        let norm = out
            .iter()
            .fold(T::zero(), |acc, z| acc.hypot(z.re).hypot(z.im));
        if norm > T::zero() {
            for z in &mut out {
                z.re /= norm;
                z.im /= norm;
            }
        }
        Ok(out)
    }

    /// All unit eigenvectors, one per eigenvalue.
    pub fn eigenvectors(&self) -> Vec<Vec<Complex<T>>> {
        (0..self.n)
            .filter_map(|i| self.eigenvector(i).ok())
            .collect()
    }

    /// The real block-form eigenvector matrix `V` with `A V = V D`.
    pub fn real_eigenvectors(&self) -> Matrix<T> {
        Matrix::from_parts(self.vectors.clone(), self.n, self.n)
    }

    /// The real block-diagonal eigenvalue matrix `D` with `A V = V D`.
    pub fn block_diagonal(&self) -> Matrix<T> {
        let n = self.n;
        let mut d = Matrix::zeros(n, n);
        for (i, z) in self.values.iter().enumerate() {
            d[(i, i)] = z.re;
            if z.im > T::zero() {
                d[(i, i + 1)] = z.im;
            } else if z.im < T::zero() {
                d[(i, i - 1)] = z.im;
            }
        }
        d
    }
}

// ======================================================================
// Francis double-shift QR on the Hessenberg form
// ======================================================================

/// Working state: Hessenberg `h` becoming quasi-triangular, accumulated
/// transform `v`, and the real/imaginary parts of the eigenvalues.
struct Schur<T: Float> {
    h: Vec<T>,
    v: Vec<T>,
    d: Vec<T>,
    e: Vec<T>,
    /// 1-norm of the initial Hessenberg matrix.
    norm: T,
    n: usize,
}

/// Complex division `(xr + i xi) / (yr + i yi)` without intermediate
/// overflow (Smith's algorithm).
fn cdiv<T: Float>(xr: T, xi: T, yr: T, yi: T) -> (T, T) {
    if yr.abs() > yi.abs() {
        let r = yi / yr;
        let den = yr + r * yi;
        ((xr + r * xi) / den, (xi - r * xr) / den)
    } else {
        let r = yr / yi;
        let den = yi + r * yr;
        ((r * xr + xi) / den, (r * xi - xr) / den)
    }
}

#[allow(clippy::many_single_char_names, clippy::float_cmp)]
impl<T: Float> Schur<T> {
    fn new(h: Vec<T>, v: Vec<T>, n: usize) -> Self {
        let mut norm = T::zero();
        for i in 0..n {
            for j in i.saturating_sub(1)..n {
                norm += h[i * n + j].abs();
            }
        }
        Self {
            h,
            v,
            d: vec![T::zero(); n],
            e: vec![T::zero(); n],
            norm,
            n,
        }
    }

    /// Deflate eigenvalues from the bottom of `h` until none remain.
    /// Returns the total number of QR sweeps.
    fn reduce(&mut self, max_iter: usize) -> Result<usize> {
        let nn = self.n;
        let at = |i: usize, j: usize| i * nn + j;
        let eps = T::epsilon();
        let two = T::from_f64(2.0);
        let norm = self.norm;
        let h = &mut self.h;
        let v = &mut self.v;
        let d = &mut self.d;
        let e = &mut self.e;

        let mut exshift = T::zero();
        let (mut p, mut q, mut r, mut s, mut w, mut x, mut y, mut z);
        let mut iter = 0;
        let mut sweeps = 0;
        let mut remaining = nn;

        while remaining > 0 {
            let n = remaining - 1;

            // Look for a single small subdiagonal element
            let mut l = n;
            while l > 0 {
                s = h[at(l - 1, l - 1)].abs() + h[at(l, l)].abs();
                if s == T::zero() {
                    s = norm;
                }
                if h[at(l, l - 1)].abs() < eps * s {
                    break;
                }
                l -= 1;
            }

            if l == n {
                // One root found
                h[at(n, n)] += exshift;
                d[n] = h[at(n, n)];
                e[n] = T::zero();
                remaining -= 1;
                iter = 0;
            } else if l + 1 == n {
                // Two roots found
                w = h[at(n, n - 1)] * h[at(n - 1, n)];
                p = (h[at(n - 1, n - 1)] - h[at(n, n)]) / two;
                q = p * p + w;
                z = q.abs().sqrt();
                h[at(n, n)] += exshift;
                h[at(n - 1, n - 1)] += exshift;
                x = h[at(n, n)];

                if q >= T::zero() {
                    // Real pair
                    z = if p >= T::zero() { p + z } else { p - z };
                    d[n - 1] = x + z;
                    d[n] = d[n - 1];
                    if z != T::zero() {
                        d[n] = x - w / z;
                    }
                    e[n - 1] = T::zero();
                    e[n] = T::zero();
                    x = h[at(n, n - 1)];
                    s = x.abs() + z.abs();
                    p = x / s;
                    q = z / s;
                    r = p.hypot(q);
                    p /= r;
                    q /= r;

                    // Row modification
                    for j in (n - 1)..nn {
                        z = h[at(n - 1, j)];
                        h[at(n - 1, j)] = q * z + p * h[at(n, j)];
                        h[at(n, j)] = q * h[at(n, j)] - p * z;
                    }
                    // Column modification
                    for i in 0..=n {
                        z = h[at(i, n - 1)];
                        h[at(i, n - 1)] = q * z + p * h[at(i, n)];
                        h[at(i, n)] = q * h[at(i, n)] - p * z;
                    }
                    // Accumulate transformations
                    for i in 0..nn {
                        z = v[at(i, n - 1)];
                        v[at(i, n - 1)] = q * z + p * v[at(i, n)];
                        v[at(i, n)] = q * v[at(i, n)] - p * z;
                    }
                } else {
                    // Complex pair
                    d[n - 1] = x + p;
                    d[n] = x + p;
                    e[n - 1] = z;
                    e[n] = -z;
                }
                remaining -= 2;
                iter = 0;
            } else {
                if iter >= max_iter {
                    log::warn!("general eigen: {nn}x{nn} eigenvalue {n} not isolated after {iter} QR sweeps");
                    return Err(CoreError::NoConvergence {
                        op: "general eigen",
                        iterations: sweeps,
                    });
                }

                // Form shift
                x = h[at(n, n)];
                y = h[at(n - 1, n - 1)];
                w = h[at(n, n - 1)] * h[at(n - 1, n)];

                // Exceptional shifts break cycles
                if iter == 10 {
                    exshift += x;
                    for i in 0..=n {
                        h[at(i, i)] -= x;
                    }
                    s = h[at(n, n - 1)].abs() + h[at(n - 1, n - 2)].abs();
                    x = T::from_f64(0.75) * s;
                    y = x;
                    w = T::from_f64(-0.4375) * s * s;
                }
                if iter == 30 {
                    s = (y - x) / two;
                    s = s * s + w;
                    if s > T::zero() {
                        s = s.sqrt();
                        if y < x {
                            s = -s;
                        }
                        s = x - w / ((y - x) / two + s);
                        for i in 0..=n {
                            h[at(i, i)] -= s;
                        }
                        exshift += s;
                        x = T::from_f64(0.964);
                        y = x;
                        w = x;
                    }
                }

                iter += 1;
                sweeps += 1;
                log::trace!("general eigen: sweep {sweeps} on rows {l}..={n}");

                // Look for two consecutive small subdiagonal elements
                let mut m = n - 2;
                loop {
                    z = h[at(m, m)];
                    r = x - z;
                    s = y - z;
                    p = (r * s - w) / h[at(m + 1, m)] + h[at(m, m + 1)];
                    q = h[at(m + 1, m + 1)] - z - r - s;
                    r = h[at(m + 2, m + 1)];
                    s = p.abs() + q.abs() + r.abs();
                    p /= s;
                    q /= s;
                    r /= s;
                    if m == l {
                        break;
                    }
                    let lhs = h[at(m, m - 1)].abs() * (q.abs() + r.abs());
                    let rhs = eps
                        * (p.abs()
                            * (h[at(m - 1, m - 1)].abs() + z.abs() + h[at(m + 1, m + 1)].abs()));
                    if lhs < rhs {
                        break;
                    }
                    m -= 1;
                }

                for i in (m + 2)..=n {
                    h[at(i, i - 2)] = T::zero();
                    if i > m + 2 {
                        h[at(i, i - 3)] = T::zero();
                    }
                }

                // Double QR step on rows l..=n and columns m..=n
                for k in m..n {
                    let notlast = k + 1 != n;
                    if k != m {
                        p = h[at(k, k - 1)];
                        q = h[at(k + 1, k - 1)];
                        r = if notlast { h[at(k + 2, k - 1)] } else { T::zero() };
                        x = p.abs() + q.abs() + r.abs();
                        if x == T::zero() {
                            continue;
                        }
                        p /= x;
                        q /= x;
                        r /= x;
                    }

                    s = (p * p + q * q + r * r).sqrt();
                    if p < T::zero() {
                        s = -s;
                    }
                    if s == T::zero() {
                        continue;
                    }
                    if k != m {
                        h[at(k, k - 1)] = -s * x;
                    } else if l != m {
                        h[at(k, k - 1)] = -h[at(k, k - 1)];
                    }
                    p += s;
                    x = p / s;
                    y = q / s;
                    z = r / s;
                    q /= p;
                    r /= p;

                    // Row modification
                    for j in k..nn {
                        p = h[at(k, j)] + q * h[at(k + 1, j)];
                        if notlast {
                            p += r * h[at(k + 2, j)];
                            h[at(k + 2, j)] -= p * z;
                        }
                        h[at(k, j)] -= p * x;
                        h[at(k + 1, j)] -= p * y;
                    }
                    // Column modification
                    for i in 0..=n.min(k + 3) {
                        p = x * h[at(i, k)] + y * h[at(i, k + 1)];
                        if notlast {
                            p += z * h[at(i, k + 2)];
                            h[at(i, k + 2)] -= p * r;
                        }
                        h[at(i, k)] -= p;
                        h[at(i, k + 1)] -= p * q;
                    }
                    // Accumulate transformations
                    for i in 0..nn {
                        p = x * v[at(i, k)] + y * v[at(i, k + 1)];
                        if notlast {
                            p += z * v[at(i, k + 2)];
                            v[at(i, k + 2)] -= p * r;
                        }
                        v[at(i, k)] -= p;
                        v[at(i, k + 1)] -= p * q;
                    }
                }
            }
        }
        Ok(sweeps)
    }

    /// Eigenvectors of the quasi-triangular form by back substitution, then
    /// mapped back through `v`.
    fn back_substitute(&mut self) {
        let nn = self.n;
        let at = |i: usize, j: usize| i * nn + j;
        let eps = T::epsilon();
        let norm = self.norm;
        if norm == T::zero() {
            return;
        }
        let h = &mut self.h;
        let d = &self.d;
        let e = &self.e;

        let (mut r, mut s, mut z) = (T::zero(), T::zero(), T::zero());
        let (mut t, mut w, mut x, mut y);

        for n in (0..nn).rev() {
            let p = d[n];
            let q = e[n];

            if q == T::zero() {
                // Real vector
                let mut l = n;
                h[at(n, n)] = T::one();
                for i in (0..n).rev() {
                    w = h[at(i, i)] - p;
                    r = T::zero();
                    for j in l..=n {
                        r += h[at(i, j)] * h[at(j, n)];
                    }
                    if e[i] < T::zero() {
                        z = w;
                        s = r;
                        continue;
                    }
                    l = i;
                    if e[i] == T::zero() {
                        h[at(i, n)] = if w != T::zero() {
                            -r / w
                        } else {
                            -r / (eps * norm)
                        };
                    } else {
                        // Solve the real 2x2 system
                        x = h[at(i, i + 1)];
                        y = h[at(i + 1, i)];
                        let qq = (d[i] - p) * (d[i] - p) + e[i] * e[i];
                        t = (x * s - z * r) / qq;
                        h[at(i, n)] = t;
                        h[at(i + 1, n)] = if x.abs() > z.abs() {
                            (-r - w * t) / x
                        } else {
                            (-s - y * t) / z
                        };
                    }

                    // Overflow control
                    t = h[at(i, n)].abs();
                    if (eps * t) * t > T::one() {
                        for j in i..=n {
                            h[at(j, n)] /= t;
                        }
                    }
                }
            } else if q < T::zero() {
                // Complex vector, real part in column n - 1, imaginary in n
                let mut l = n - 1;

                // Last component imaginary so the trailing block is triangular
                if h[at(n, n - 1)].abs() > h[at(n - 1, n)].abs() {
                    h[at(n - 1, n - 1)] = q / h[at(n, n - 1)];
                    h[at(n - 1, n)] = -(h[at(n, n)] - p) / h[at(n, n - 1)];
                } else {
                    let (cr, ci) = cdiv(T::zero(), -h[at(n - 1, n)], h[at(n - 1, n - 1)] - p, q);
                    h[at(n - 1, n - 1)] = cr;
                    h[at(n - 1, n)] = ci;
                }
                h[at(n, n - 1)] = T::zero();
                h[at(n, n)] = T::one();

                for i in (0..n - 1).rev() {
                    let mut ra = T::zero();
                    let mut sa = T::zero();
                    for j in l..=n {
                        ra += h[at(i, j)] * h[at(j, n - 1)];
                        sa += h[at(i, j)] * h[at(j, n)];
                    }
                    w = h[at(i, i)] - p;

                    if e[i] < T::zero() {
                        z = w;
                        r = ra;
                        s = sa;
                        continue;
                    }
                    l = i;
                    if e[i] == T::zero() {
                        let (cr, ci) = cdiv(-ra, -sa, w, q);
                        h[at(i, n - 1)] = cr;
                        h[at(i, n)] = ci;
                    } else {
                        // Solve the complex 2x2 system
                        x = h[at(i, i + 1)];
                        y = h[at(i + 1, i)];
                        let mut vr = (d[i] - p) * (d[i] - p) + e[i] * e[i] - q * q;
                        let vi = (d[i] - p) * T::from_f64(2.0) * q;
                        if vr == T::zero() && vi == T::zero() {
                            vr = eps * norm * (w.abs() + q.abs() + x.abs() + y.abs() + z.abs());
                        }
                        let (cr, ci) = cdiv(
                            x * r - z * ra + q * sa,
                            x * s - z * sa - q * ra,
                            vr,
                            vi,
                        );
                        h[at(i, n - 1)] = cr;
                        h[at(i, n)] = ci;
                        if x.abs() > z.abs() + q.abs() {
                            h[at(i + 1, n - 1)] =
                                (-ra - w * h[at(i, n - 1)] + q * h[at(i, n)]) / x;
                            h[at(i + 1, n)] = (-sa - w * h[at(i, n)] - q * h[at(i, n - 1)]) / x;
                        } else {
                            let (cr, ci) =
                                cdiv(-r - y * h[at(i, n - 1)], -s - y * h[at(i, n)], z, q);
                            h[at(i + 1, n - 1)] = cr;
                            h[at(i + 1, n)] = ci;
                        }
                    }

                    // Overflow control
                    t = h[at(i, n - 1)].abs().max(h[at(i, n)].abs());
                    if (eps * t) * t > T::one() {
                        for j in i..=n {
                            h[at(j, n - 1)] /= t;
                            h[at(j, n)] /= t;
                        }
                    }
                }
            }
        }

        // Back transformation: V <- V * (upper triangle of h)
        let v = &mut self.v;
        for j in (0..nn).rev() {
            for i in 0..nn {
                let mut acc = T::zero();
                for k in 0..=j {
                    acc += v[at(i, k)] * h[at(k, j)];
                }
                v[at(i, j)] = acc;
            }
        }
    }
}
