//! Matrix decompositions.
//!
//! | Decomposition | Module         | Factorization           |
//! |---------------|----------------|-------------------------|
//! | LU            | [`lu`]         | `PA = LU`               |
//! | QR            | [`qr`]         | `AP = QR`               |
//! | LQ            | [`lq`]         | `A = LQ`                |
//! | Hessenberg    | [`hessenberg`] | `H = P^T A P`           |
//! | SVD           | [`svd`]        | `A = U diag(s) V^T`     |

pub mod hessenberg;
pub mod lq;
pub mod lu;
pub mod qr;
pub mod svd;

pub use hessenberg::HessenbergDecomposition;
pub use lq::LqDecomposition;
pub use lu::LuDecomposition;
pub use qr::{QrDecomposition, lstsq};
pub use svd::SvdDecomposition;
