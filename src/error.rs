//! Errors surfaced by the grid-sense model.
//!
//! Construction validates configuration up front. Once a `Sense` is built every step
//! operates on vectors whose lengths are fixed by that configuration, so the only
//! runtime failure is a `Shape` mismatch when a layer is driven directly with a vector
//! of the wrong length.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    #[error("`{0}` must be a lowercase identifier that is not a keyword")]
    InvalidName(String),

    #[error("{name} must be positive, got {value}")]
    InvalidParameter { name: &'static str, value: usize },

    #[error("{what} has length {actual}, expected {expected}")]
    Shape {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("no sense named `{0}`")]
    UnknownSense(String),

    #[error("a sense named `{0}` is already registered")]
    DuplicateSense(String),
}

/// Fails with `Error::Shape` unless `actual == expected`.
#[inline]
pub(crate) fn ensure_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::Shape {
            what,
            expected,
            actual,
        })
    }
}
