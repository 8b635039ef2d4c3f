//! Tolerances, iteration caps and the soft-convergence result wrapper.
//!
//! Every routine has a plain form that uses [`LinalgConfig::default`] and a
//! `*_with` form that takes an explicit configuration, so no tolerance is
//! ever hidden in global state.

use crate::Float;
use crate::error::{CoreError, Result};

/// Default convergence / rank tolerance.
pub const DEFAULT_TOL: f64 = 1e-8;

/// Default relative singularity threshold for pivots.
pub const DEFAULT_PIVOT_TOL: f64 = 1e-12;

/// Numerical configuration shared by every routine in the crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinalgConfig<T: Float> {
    /// Convergence and rank tolerance (default: `1e-8`).
    ///
    /// Always applied relative to a norm: a singular value counts towards
    /// the rank when `s > tol * s_max`, an iteration stops when the change
    /// is below `tol` times the size of the estimate.
    pub tol: T,
    /// Relative singularity threshold (default: `1e-12`).
    ///
    /// Elimination fails when `|pivot| <= pivot_tol * max|a_ij|`.
    pub pivot_tol: T,
    /// Iteration cap. `None` or `Some(0)` selects the routine's own default.
    pub max_iter: Option<usize>,
}

impl<T: Float> Default for LinalgConfig<T> {
    fn default() -> Self {
        Self {
            tol: T::from_f64(DEFAULT_TOL),
            pivot_tol: T::from_f64(DEFAULT_PIVOT_TOL),
            max_iter: None,
        }
    }
}

impl<T: Float> LinalgConfig<T> {
    /// Replace the convergence tolerance.
    #[must_use]
    pub fn with_tol(mut self, tol: T) -> Self {
        self.tol = tol;
        self
    }

    /// Replace the singularity threshold.
    #[must_use]
    pub fn with_pivot_tol(mut self, pivot_tol: T) -> Self {
        self.pivot_tol = pivot_tol;
        self
    }

    /// Cap the number of iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }

    /// Resolve the iteration cap against a routine-specific default.
    pub fn max_iter_or(&self, default: usize) -> usize {
        match self.max_iter {
            Some(0) | None => default,
            Some(n) => n,
        }
    }

    /// Absolute singularity threshold for a matrix whose largest entry is
    /// `scale`.
    pub(crate) fn pivot_threshold(&self, scale: T) -> T {
        if scale > T::zero() {
            self.pivot_tol * scale
        } else {
            T::min_positive()
        }
    }
}

/// Outcome of an iterative routine.
///
/// Hitting the iteration cap is a soft failure: the best estimate is kept in
/// `value` and `converged` is `false`.
#[derive(Debug, Clone, PartialEq)]
pub struct IterResult<X> {
    /// Final estimate.
    pub value: X,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Final convergence measure (residual norm or relative change).
    pub residual: f64,
    /// Whether the tolerance was met within the cap.
    pub converged: bool,
}

impl<X> IterResult<X> {
    pub(crate) fn new(value: X, iterations: usize, residual: f64, converged: bool) -> Self {
        Self {
            value,
            iterations,
            residual,
            converged,
        }
    }

    /// Whether the routine met its tolerance.
    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Take the estimate regardless of convergence.
    pub fn into_value(self) -> X {
        self.value
    }

    /// Take the estimate only if the routine converged.
    pub fn into_converged(self, op: &'static str) -> Result<X> {
        if self.converged {
            Ok(self.value)
        } else {
            Err(CoreError::NoConvergence {
                op,
                iterations: self.iterations,
            })
        }
    }

    /// Transform the estimate, keeping the convergence record.
    pub fn map<Y, F: FnOnce(X) -> Y>(self, f: F) -> IterResult<Y> {
        IterResult {
            value: f(self.value),
            iterations: self.iterations,
            residual: self.residual,
            converged: self.converged,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = LinalgConfig::<f64>::default();
        assert_eq!(cfg.tol, 1e-8);
        assert_eq!(cfg.pivot_tol, 1e-12);
        assert_eq!(cfg.max_iter, None);
    }

    #[test]
    fn test_max_iter_zero_means_default() {
        let cfg = LinalgConfig::<f64>::default().with_max_iter(0);
        assert_eq!(cfg.max_iter_or(250), 250);
        let cfg = cfg.with_max_iter(7);
        assert_eq!(cfg.max_iter_or(250), 7);
    }

    #[test]
    fn test_builder() {
        let cfg = LinalgConfig::<f64>::default()
            .with_tol(1e-4)
            .with_pivot_tol(1e-6);
        assert_eq!(cfg.tol, 1e-4);
        assert_eq!(cfg.pivot_tol, 1e-6);
        assert_eq!(cfg.pivot_threshold(10.0), 1e-5);
    }

    #[test]
    fn test_iter_result_strict() {
        let soft = IterResult::new(1.5_f64, 10, 0.1, false);
        assert!(!soft.is_converged());
        assert_eq!(
            soft.clone().into_converged("power"),
            Err(CoreError::NoConvergence {
                op: "power",
                iterations: 10
            })
        );
        assert_eq!(soft.into_value(), 1.5);

        let ok = IterResult::new(2.0_f64, 3, 0.0, true).map(|x| x * 2.0);
        assert_eq!(ok.into_converged("power"), Ok(4.0));
    }
}
