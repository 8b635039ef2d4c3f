use thiserror::Error;

/// All errors returned by `linvex-core`.
///
/// Shape and allocation errors are raised before any computation starts.
/// Singularity and non-convergence are reported as values the caller can
/// react to, for example by retrying with an SVD-based method.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Operand shapes do not match the layout an operation requires.
    #[error("{op}: dimension mismatch, expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        op: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// The operation requires a square matrix.
    #[error("{op}: expected a square matrix, got {rows}x{cols}")]
    NotSquare {
        op: &'static str,
        rows: usize,
        cols: usize,
    },

    /// A shape specification is invalid.
    #[error("invalid shape {shape:?}: {reason}")]
    InvalidShape {
        shape: Vec<usize>,
        reason: &'static str,
    },

    /// A checked element access was out of bounds.
    #[error("index {index:?} out of bounds for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    /// A scratch or output buffer could not be allocated.
    #[error("failed to allocate a buffer of {elements} elements")]
    AllocationFailure { elements: usize },

    /// A pivot or diagonal element fell below the singularity threshold.
    #[error("{op}: matrix of order {n} is singular to working precision")]
    SingularMatrix { op: &'static str, n: usize },

    /// An iterative method exhausted its iteration cap.
    #[error("{op}: no convergence after {iterations} iterations")]
    NoConvergence { op: &'static str, iterations: usize },

    /// An iterative method produced non-finite values.
    #[error("{op}: diverged at iteration {iteration}")]
    Diverged { op: &'static str, iteration: usize },

    /// The operation is not supported for the given input.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: &'static str },
}

/// Convenience alias used throughout `linvex-core`.
pub type Result<T> = std::result::Result<T, CoreError>;
