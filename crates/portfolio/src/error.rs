//! Error types for the portfolio crate.

use thiserror::Error;

/// Errors that can occur during portfolio simulation.
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// Simulation parameters out of range
    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),
}

impl From<divmon_types::CoreError> for PortfolioError {
    fn from(err: divmon_types::CoreError) -> Self {
        PortfolioError::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PortfolioError::InvalidConfig("buy_pct must be within [0, 1]".to_string());
        assert_eq!(
            err.to_string(),
            "invalid simulation config: buy_pct must be within [0, 1]"
        );
    }
}
