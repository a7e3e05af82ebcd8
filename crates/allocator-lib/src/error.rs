//! Controller error types.
//!
//! The advisory operations themselves are total. These errors only come out
//! of the opt-in validation paths (`validate`, `try_decide`).

use thiserror::Error;

/// Errors raised when inputs or configuration fail validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    #[error("invalid metrics: {field}={value} ({reason})")]
    InvalidMetrics {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid historical sample at index {index}: {source}")]
    InvalidHistory {
        index: usize,
        #[source]
        source: Box<ControllerError>,
    },

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("invalid cache request: {0}")]
    InvalidCacheRequest(String),
}

pub type ControllerResult<T> = Result<T, ControllerError>;
