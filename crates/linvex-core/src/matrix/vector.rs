//! Dense 1-D vectors.

use core::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

use crate::error::{CoreError, Result};
use crate::{Float, Scalar};

/// A dense vector of scalars. May be empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vector<T: Scalar> {
    data: Vec<T>,
}

impl<T: Scalar> Vector<T> {
    /// Wrap an owned buffer.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Copy a slice.
    pub fn from_slice(data: &[T]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// A vector of `n` zeros.
    pub fn zeros(n: usize) -> Self {
        Self {
            data: vec![T::zero(); n],
        }
    }

    /// A vector of `n` copies of `value`.
    pub fn full(n: usize, value: T) -> Self {
        Self {
            data: vec![value; n],
        }
    }

    /// The `i`-th standard basis vector of length `n`.
    pub fn basis(n: usize, i: usize) -> Self {
        let mut v = Self::zeros(n);
        if i < n {
            v.data[i] = T::one();
        }
        v
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.data.iter_mut()
    }

    /// Bounds-checked element read.
    pub fn get(&self, i: usize) -> Result<T> {
        self.data
            .get(i)
            .copied()
            .ok_or_else(|| CoreError::IndexOutOfBounds {
                index: vec![i],
                shape: vec![self.len()],
            })
    }

    /// Bounds-checked element write.
    pub fn set(&mut self, i: usize, value: T) -> Result<()> {
        let len = self.len();
        match self.data.get_mut(i) {
            Some(x) => {
                *x = value;
                Ok(())
            }
            None => Err(CoreError::IndexOutOfBounds {
                index: vec![i],
                shape: vec![len],
            }),
        }
    }

    pub(crate) fn check_len(&self, expected: usize, op: &'static str) -> Result<()> {
        if self.len() != expected {
            return Err(CoreError::DimensionMismatch {
                op,
                expected: vec![expected],
                got: vec![self.len()],
            });
        }
        Ok(())
    }

    /// Inner product.
    pub fn dot(&self, other: &Vector<T>) -> Result<T> {
        other.check_len(self.len(), "dot")?;
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b))
    }

    /// `self += alpha * x`.
    pub fn axpy(&mut self, alpha: T, x: &Vector<T>) -> Result<()> {
        x.check_len(self.len(), "axpy")?;
        for (yi, &xi) in self.data.iter_mut().zip(x.data.iter()) {
            *yi += alpha * xi;
        }
        Ok(())
    }

    /// Element-wise sum, returning `Err` on length mismatch.
    pub fn add_checked(&self, other: &Vector<T>) -> Result<Vector<T>> {
        other.check_len(self.len(), "vector add")?;
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| a + b)
            .collect())
    }

    /// Element-wise difference, returning `Err` on length mismatch.
    pub fn sub_checked(&self, other: &Vector<T>) -> Result<Vector<T>> {
        other.check_len(self.len(), "vector sub")?;
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| a - b)
            .collect())
    }

    /// Multiply every element by `alpha` in place.
    pub fn scale_in_place(&mut self, alpha: T) {
        for x in &mut self.data {
            *x *= alpha;
        }
    }
}

impl<T: Float> Vector<T> {
    /// Euclidean norm.
    pub fn norm(&self) -> T {
        self.data
            .iter()
            .fold(T::zero(), |acc, &x| acc.hypot(x))
    }

    /// Largest absolute element (0 for an empty vector).
    pub fn norm_inf(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &x| acc.max(x.abs()))
    }

    /// Scale to unit Euclidean norm; returns the original norm.
    ///
    /// A zero vector is left unchanged.
    pub fn normalize(&mut self) -> T {
        let n = self.norm();
        if n > T::zero() {
            self.scale_in_place(n.recip());
        }
        n
    }

    /// Whether every element is within `tol` of `other`'s.
    pub fn approx_eq(&self, other: &Vector<T>, tol: T) -> bool {
        self.len() == other.len()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(&a, &b)| (a - b).abs() <= tol)
    }
}

impl<T: Scalar> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<T: Scalar> From<Vec<T>> for Vector<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T: Scalar> Index<usize> for Vector<T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T: Scalar> IndexMut<usize> for Vector<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}

macro_rules! impl_vector_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<T: Scalar> $trait for &Vector<T> {
            type Output = Vector<T>;

            fn $method(self, rhs: &Vector<T>) -> Vector<T> {
                assert_eq!(
                    self.len(), rhs.len(),
                    "length mismatch in vector {}: {} vs {}",
                    stringify!($method), self.len(), rhs.len(),
                );
                self.data.iter().zip(rhs.data.iter()).map(|(&a, &b)| a $op b).collect()
            }
        }

        impl<T: Scalar> $trait for Vector<T> {
            type Output = Vector<T>;

            fn $method(self, rhs: Vector<T>) -> Vector<T> {
                &self $op &rhs
            }
        }
    };
}

impl_vector_binop!(Add, add, +);
impl_vector_binop!(Sub, sub, -);

impl<T: Scalar> Mul<T> for &Vector<T> {
    type Output = Vector<T>;

    fn mul(self, rhs: T) -> Vector<T> {
        self.data.iter().map(|&a| a * rhs).collect()
    }
}

impl<T: Scalar> Mul<T> for Vector<T> {
    type Output = Vector<T>;

    fn mul(mut self, rhs: T) -> Vector<T> {
        self.scale_in_place(rhs);
        self
    }
}

impl<T: Float> Neg for Vector<T> {
    type Output = Vector<T>;

    fn neg(self) -> Vector<T> {
        self.data.into_iter().map(|a| -a).collect()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_and_zeros() {
        let e = Vector::<f64>::basis(3, 1);
        assert_eq!(e.as_slice(), &[0.0, 1.0, 0.0]);
        assert!(Vector::<f64>::zeros(0).is_empty());
    }

    #[test]
    fn test_get_set_checked() {
        let mut v = Vector::from_vec(vec![1.0, 2.0]);
        assert_eq!(v.get(1).unwrap(), 2.0);
        assert!(v.get(2).is_err());
        v.set(0, 5.0).unwrap();
        assert_eq!(v[0], 5.0);
        assert!(v.set(3, 1.0).is_err());
    }

    #[test]
    fn test_dot_norm() {
        let x = Vector::from_vec(vec![3.0_f64, 4.0]);
        assert_eq!(x.norm(), 5.0);
        assert_eq!(x.dot(&x).unwrap(), 25.0);
        assert_eq!(x.norm_inf(), 4.0);
        assert!(x.dot(&Vector::zeros(3)).is_err());
    }

    #[test]
    fn test_normalize() {
        let mut x = Vector::from_vec(vec![0.0_f64, 2.0]);
        assert_eq!(x.normalize(), 2.0);
        assert_eq!(x.as_slice(), &[0.0, 1.0]);
        let mut z = Vector::<f64>::zeros(2);
        assert_eq!(z.normalize(), 0.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = Vector::from_vec(vec![1.0, 2.0]);
        let b = Vector::from_vec(vec![10.0, 20.0]);
        assert_eq!((&a + &b).as_slice(), &[11.0, 22.0]);
        assert_eq!((&b - &a).as_slice(), &[9.0, 18.0]);
        assert_eq!((&a * 3.0).as_slice(), &[3.0, 6.0]);
        assert_eq!((-a.clone()).as_slice(), &[-1.0, -2.0]);
        let mut y = b.clone();
        y.axpy(2.0, &a).unwrap();
        assert_eq!(y.as_slice(), &[12.0, 24.0]);
        assert!(a.add_checked(&Vector::zeros(3)).is_err());
    }

    #[test]
    fn test_approx_eq() {
        let a = Vector::from_vec(vec![1.0, 2.0]);
        let b = Vector::from_vec(vec![1.0 + 1e-12, 2.0]);
        assert!(a.approx_eq(&b, 1e-10));
        assert!(!a.approx_eq(&b, 1e-14));
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn test_add_panics_on_mismatch() {
        let _ = Vector::from_vec(vec![1.0]) + Vector::from_vec(vec![1.0, 2.0]);
    }
}
