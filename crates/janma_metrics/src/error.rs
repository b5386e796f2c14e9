//! Errors for model construction.

use thiserror::Error;

/// Structurally invalid model values.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("event intensity {0} outside [0, 1]")]
    IntensityOutOfRange(f64),
    #[error("{field} is not finite")]
    NonFinite { field: &'static str },
}
