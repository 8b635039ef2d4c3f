//! `Display` formatting for [`Matrix`] and [`Vector`].

use core::fmt;

use crate::Scalar;

use super::{Matrix, Vector};

impl<T: Scalar> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.shape();
        if self.is_empty() {
            return write!(f, "matrix([], shape=({rows}, {cols}))");
        }
        writeln!(f, "matrix([")?;
        for r in 0..rows {
            write!(f, "  [")?;
            for c in 0..cols {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.as_slice()[r * cols + c])?;
            }
            if r < rows - 1 {
                writeln!(f, "],")?;
            } else {
                writeln!(f, "]")?;
            }
        }
        write!(f, "])")
    }
}

impl<T: Scalar> fmt::Display for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vector([")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "])")
    }
}
