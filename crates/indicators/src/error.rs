//! Indicator error types.

use thiserror::Error;

/// Errors raised when indicator preconditions are violated.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// Invalid parameters for the indicator
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Parallel input series differ in length
    #[error("length mismatch: {series} has {actual} values, expected {expected}")]
    LengthMismatch {
        /// Name of the offending series.
        series: &'static str,
        /// Length of the reference series.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
}

impl IndicatorError {
    /// Creates an `InvalidParams` error with a message.
    #[must_use]
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        IndicatorError::InvalidParams(msg.into())
    }

    /// Creates a `LengthMismatch` error.
    #[must_use]
    pub fn length_mismatch(series: &'static str, expected: usize, actual: usize) -> Self {
        IndicatorError::LengthMismatch {
            series,
            expected,
            actual,
        }
    }
}
