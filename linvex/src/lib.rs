//! # Linvex
//!
//! Dense numerical linear algebra in pure Rust.
//!
//! One `use linvex::prelude::*;` gives you matrices and vectors, the LU / QR /
//! LQ / Hessenberg / SVD decompositions, symmetric and general eigensolvers
//! and Moore-Penrose inverses. Free-standing solvers live under
//! [`core::linalg`](crate::core::linalg).
//!
//! ```
//! use linvex::prelude::*;
//!
//! let a = Matrix::from_vec(vec![4.0_f64, 1.0, 1.0, 3.0], 2, 2).unwrap();
//! let eig = SymmetricEigen::jacobi(&a).unwrap().value;
//! assert!(eig.eigenvalues()[0] > eig.eigenvalues()[1]);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Enables |
//! |---------|---------|
//! | `core` *(default)* | Matrices, decompositions, eigensolvers, solvers |

pub use linvex_core as core;

/// Glob-import convenience: `use linvex::prelude::*;`
pub mod prelude {
    pub use linvex_core::prelude::*;
}
