//! Hessenberg reduction by orthogonal similarity.
//!
//! Reduces a square matrix `A` to upper Hessenberg form `H = P^T A P`
//! (zero below the first subdiagonal) with Householder reflections, and
//! accumulates the orthogonal `P`. A symmetric input yields a symmetric
//! tridiagonal `H`.

use crate::Float;
use crate::error::Result;
use crate::matrix::Matrix;

/// Result of a Hessenberg reduction `H = P^T A P`.
#[derive(Debug, Clone)]
pub struct HessenbergDecomposition<T: Float> {
    /// Upper Hessenberg matrix (n x n), row-major.
    h: Vec<T>,
    /// Accumulated orthogonal transform (n x n), row-major.
    p: Vec<T>,
    n: usize,
}

#[allow(clippy::many_single_char_names)]
impl<T: Float> HessenbergDecomposition<T> {
    /// Reduce a square matrix to upper Hessenberg form.
    ///
    /// ```
    /// # use linvex_core::matrix::Matrix;
    /// # use linvex_core::linalg::decomp::HessenbergDecomposition;
    /// let a = Matrix::from_vec(
    ///     vec![4.0_f64, 1.0, 2.0, 3.0, 2.0, 5.0, 1.0, 1.0, 1.0, 2.0, 3.0, 4.0, 2.0, 1.0, 1.0, 6.0],
    ///     4, 4,
    /// ).unwrap();
    /// let hess = HessenbergDecomposition::decompose(&a).unwrap();
    /// let h = hess.h();
    /// assert_eq!(h[(2, 0)], 0.0);
    /// assert_eq!(h[(3, 1)], 0.0);
    /// ```
    pub fn decompose(a: &Matrix<T>) -> Result<Self> {
        let n = a.require_square("hessenberg")?;
        let mut h = a.as_slice().to_vec();
        let mut ort = vec![T::zero(); n];
        let mut applied = vec![false; n];

        let high = n - 1;
        for m in 1..high {
            // Scale column to avoid under/overflow
            let scale = (m..=high).fold(T::zero(), |acc, i| acc + h[i * n + m - 1].abs());
            if scale <= T::zero() {
                continue;
            }

            // Householder vector
            let mut hh = T::zero();
            for i in (m..=high).rev() {
                ort[i] = h[i * n + m - 1] / scale;
                hh += ort[i] * ort[i];
            }
            let mut g = hh.sqrt();
            if ort[m] > T::zero() {
                g = -g;
            }
            hh -= ort[m] * g;
            ort[m] -= g;

            // H = (I - u u^T / hh) H (I - u u^T / hh)
            for j in m..n {
                let mut f = T::zero();
                for i in (m..=high).rev() {
                    f += ort[i] * h[i * n + j];
                }
                f /= hh;
                for i in m..=high {
                    h[i * n + j] -= f * ort[i];
                }
            }
            for i in 0..=high {
                let mut f = T::zero();
                for j in (m..=high).rev() {
                    f += ort[j] * h[i * n + j];
                }
                f /= hh;
                for j in m..=high {
                    h[i * n + j] -= f * ort[j];
                }
            }

            ort[m] *= scale;
            h[m * n + m - 1] = scale * g;
            applied[m] = true;
        }

        // Accumulate the transformations
        let mut p = vec![T::zero(); n * n];
        for i in 0..n {
            p[i * n + i] = T::one();
        }
        for m in (1..high).rev() {
            if !applied[m] {
                continue;
            }
            for i in (m + 1)..=high {
                ort[i] = h[i * n + m - 1];
            }
            for j in m..=high {
                let mut g = T::zero();
                for i in m..=high {
                    g += ort[i] * p[i * n + j];
                }
                // Double division avoids possible underflow
                g = (g / ort[m]) / h[m * n + m - 1];
                for i in m..=high {
                    p[i * n + j] += g * ort[i];
                }
            }
        }

        // The reflectors were kept below the subdiagonal until now
        for i in 2..n {
            for j in 0..(i - 1) {
                h[i * n + j] = T::zero();
            }
        }

        Ok(Self { h, p, n })
    }

    /// The upper Hessenberg matrix `H`.
    pub fn h(&self) -> Matrix<T> {
        Matrix::from_parts(self.h.clone(), self.n, self.n)
    }

    /// The orthogonal transform `P` with `H = P^T A P`.
    pub fn p(&self) -> Matrix<T> {
        Matrix::from_parts(self.p.clone(), self.n, self.n)
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Consume into raw row-major `(H, P)` buffers.
    pub(crate) fn into_parts(self) -> (Vec<T>, Vec<T>) {
        (self.h, self.p)
    }
}
