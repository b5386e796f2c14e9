//! Error types for base calculations.

use thiserror::Error;

/// Errors from pure Vedic math.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum BaseError {
    /// Input outside the domain a routine accepts.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A generated structure would exceed its size cap.
    #[error("limit exceeded: {0}")]
    LimitExceeded(&'static str),
}
