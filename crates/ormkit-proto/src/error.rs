//! Protocol error types.

use thiserror::Error;

/// Errors raised while building or converting IR values.
#[derive(Debug, Error)]
pub enum Error {
    /// A JSON document could not be mapped onto a [`Value`](crate::Value).
    #[error("unsupported JSON value: {0}")]
    UnsupportedJson(String),

    /// A value had the wrong shape for the requested conversion.
    #[error("expected {expected}, got {actual}")]
    UnexpectedValue {
        /// The shape that was required.
        expected: &'static str,
        /// A rendering of the value that was found.
        actual: String,
    },
}
