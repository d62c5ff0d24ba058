//! Strategy error types

use divmon_indicators::IndicatorError;
use divmon_types::CoreError;
use thiserror::Error;

/// Strategy-specific errors
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Invalid strategy parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Parallel input series differ in length
    #[error("Length mismatch: {series} has {actual} values, expected {expected}")]
    LengthMismatch {
        /// Name of the offending series.
        series: &'static str,
        /// Length of the close series.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// A confirmation is enabled but its series was not supplied
    #[error("Missing indicator: {0}")]
    MissingIndicator(&'static str),

    /// Indicator computation failed
    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),
}

impl StrategyError {
    /// Creates an `InvalidParams` error with a message.
    #[must_use]
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        StrategyError::InvalidParams(msg.into())
    }

    /// Creates a `LengthMismatch` error.
    #[must_use]
    pub fn length_mismatch(series: &'static str, expected: usize, actual: usize) -> Self {
        StrategyError::LengthMismatch {
            series,
            expected,
            actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StrategyError::MissingIndicator("macd");
        assert_eq!(err.to_string(), "Missing indicator: macd");
    }

    #[test]
    fn test_error_length_mismatch() {
        let err = StrategyError::length_mismatch("rsi", 8, 7);
        assert_eq!(
            err.to_string(),
            "Length mismatch: rsi has 7 values, expected 8"
        );
    }

    #[test]
    fn test_error_from_indicator() {
        let err: StrategyError = IndicatorError::invalid_params("period must be > 0").into();
        assert!(matches!(err, StrategyError::Indicator(_)));
    }
}
