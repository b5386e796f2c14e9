//! Error types for rectification.

use thiserror::Error;

/// Which birth-data rule was violated.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("unparsable date {0:?}, expected YYYY-MM-DD")]
    UnparsableDate(String),
    #[error("unparsable time {0:?}, expected HH:MM or HH:MM:SS")]
    UnparsableTime(String),
    #[error("unparsable timezone {0:?}, expected +HH:MM, -HH:MM, Z or UTC")]
    UnparsableTimezone(String),
    #[error("local time {0} cannot be resolved to an instant")]
    NonexistentLocalTime(String),
    #[error("altitude is not finite")]
    AltitudeNotFinite,
}

/// Failure reported by the chart collaborator for one instant.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ChartError {
    #[error("chart computation unavailable: {0}")]
    Unavailable(String),
    #[error("{body} {field} out of range: {value}")]
    OutOfRange {
        body: String,
        field: &'static str,
        value: f64,
    },
}

/// Errors surfaced to the caller of a rectification.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum RectifyError {
    #[error("invalid birth data: {0}")]
    Validation(#[from] ValidationError),
    #[error("chart computation failed for all {failed} candidates (last: {last_error})")]
    ExternalComputation { failed: usize, last_error: ChartError },
    #[error("search window contains no viable candidate")]
    NoCandidates,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type RectifyResult<T> = Result<T, RectifyError>;
