//! `linvex-core`: dense numerical linear algebra.
//!
//! Provides dense matrices and vectors, BLAS-style kernels, LU / QR / LQ /
//! Hessenberg / SVD decompositions, symmetric and general eigensolvers,
//! direct, iterative and least-squares solvers, and Moore-Penrose inverses.
//!
//! # Design
//!
//! - Generic over `f32` / `f64` via the [`Scalar`] / [`Float`] traits.
//! - Every fallible routine returns [`Result`]; iterative routines return an
//!   [`IterResult`] that keeps the best estimate when the iteration cap is
//!   reached.
//! - Tolerances and caps travel in an explicit [`LinalgConfig`]; there is no
//!   global numeric state.
//! - Diagnostics go through the [`log`] facade. No logger is installed.

pub mod config;
pub mod dtype;
pub mod error;
pub mod linalg;
pub mod matrix;

// Re-export key types at crate root for convenience.
pub use config::{IterResult, LinalgConfig};
pub use dtype::{Float, Scalar};
pub use error::{CoreError, Result};
pub use matrix::{Matrix, Vector};

/// Items intended for glob-import: `use linvex_core::prelude::*;`
pub mod prelude {
    pub use crate::config::{IterResult, LinalgConfig};
    pub use crate::dtype::{Float, Scalar};
    pub use crate::error::{CoreError, Result};
    pub use crate::linalg::decomp::{
        HessenbergDecomposition, LqDecomposition, LuDecomposition, QrDecomposition,
        SvdDecomposition,
    };
    pub use crate::linalg::eigen::{GeneralEigen, SymmetricEigen};
    pub use crate::linalg::pinv::{GeneralSolution, MpInverse};
    pub use crate::matrix::{Matrix, Vector};
}
