//! Unified error type for the post-processing crates.
//!
//! Analysis operations only ever fail with [`PostgridError::Validation`]: every
//! input is an in-memory snapshot, so a failure always means the caller handed
//! over data that breaks an operation's contract. The remaining variants are
//! produced while loading configuration.
//!
//! # Example
//!
//! ```
//! use postgrid_core::{PostgridError, PostgridResult};
//!
//! fn positive(value: f64) -> PostgridResult<f64> {
//!     if value <= 0.0 {
//!         return Err(PostgridError::validation(format!("value must be positive, got {value}")));
//!     }
//!     Ok(value)
//! }
//!
//! assert!(positive(-1.0).is_err());
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostgridError {
    /// Malformed or out-of-contract input: wrong shape, missing column,
    /// out-of-range value or unsupported enumerated value.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration parse/consistency errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PostgridError {
    /// Shorthand for building a [`PostgridError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        PostgridError::Validation(msg.into())
    }

    /// True when the error came from an input contract violation.
    pub fn is_validation(&self) -> bool {
        matches!(self, PostgridError::Validation(_))
    }
}

/// Convenience type alias for Results using PostgridError.
pub type PostgridResult<T> = Result<T, PostgridError>;
