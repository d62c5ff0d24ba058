//! Backtest error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during backtest orchestration.
#[derive(Debug, Error)]
pub enum BacktestError {
    /// JSON config parse error
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    /// Result serialization error
    #[error("result serialization error: {0}")]
    ResultSerialize(String),

    /// Aggregation or validation error
    #[error("data error: {0}")]
    Data(#[from] divmon_data::DataError),

    /// Portfolio error
    #[error("portfolio error: {0}")]
    Portfolio(#[from] divmon_portfolio::PortfolioError),

    /// Strategy error
    #[error("strategy error: {0}")]
    Strategy(#[from] divmon_strategy::StrategyError),

    /// Runtime error
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl From<divmon_types::CoreError> for BacktestError {
    fn from(err: divmon_types::CoreError) -> Self {
        match err {
            divmon_types::CoreError::Json(e) => BacktestError::ConfigParse(e.to_string()),
            other => BacktestError::ConfigValidation(other.to_string()),
        }
    }
}

impl BacktestError {
    /// Returns true if this is a config parse/validation error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BacktestError::ConfigParse(_) | BacktestError::ConfigValidation(_)
        )
    }

    /// Returns the error category for the output contract.
    /// Categories: `config`, `market_data`, `execution`, `strategy`, `runtime`
    #[must_use]
    pub fn error_category(&self) -> &'static str {
        match self {
            BacktestError::ConfigParse(_) | BacktestError::ConfigValidation(_) => "config",
            BacktestError::Data(_) => "market_data",
            BacktestError::Portfolio(_) => "execution",
            BacktestError::Strategy(_) => "strategy",
            BacktestError::ResultSerialize(_) | BacktestError::Runtime(_) => "runtime",
        }
    }
}

/// Error payload for failed runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResult {
    /// One of the [`BacktestError::error_category`] values
    pub category: String,
    /// Human-readable message
    pub message: String,
}

impl From<BacktestError> for ErrorResult {
    fn from(err: BacktestError) -> Self {
        Self {
            category: err.error_category().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_config() {
        let err = BacktestError::ConfigParse("invalid json".to_string());
        assert_eq!(err.error_category(), "config");
        assert!(err.is_config_error());

        let err = BacktestError::ConfigValidation("missing field".to_string());
        assert_eq!(err.error_category(), "config");
        assert!(err.is_config_error());
    }

    #[test]
    fn test_error_category_market_data() {
        let err = BacktestError::Data(divmon_data::DataError::EmptyData);
        assert_eq!(err.error_category(), "market_data");
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_error_category_strategy() {
        let err = BacktestError::Strategy(divmon_strategy::StrategyError::MissingIndicator("macd"));
        assert_eq!(err.error_category(), "strategy");
    }

    #[test]
    fn test_error_category_runtime() {
        let err = BacktestError::ResultSerialize("json error".to_string());
        assert_eq!(err.error_category(), "runtime");
        assert!(!err.is_config_error());

        let err = BacktestError::Runtime("unexpected error".to_string());
        assert_eq!(err.error_category(), "runtime");
    }

    #[test]
    fn test_core_error_maps_to_config() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BacktestError = divmon_types::CoreError::Json(json_err).into();
        assert!(matches!(err, BacktestError::ConfigParse(_)));

        let err: BacktestError = divmon_types::CoreError::Timezone("Mars/Olympus".to_string()).into();
        assert!(matches!(err, BacktestError::ConfigValidation(ref msg) if msg.contains("Mars")));
    }

    #[test]
    fn test_error_result_conversion() {
        let err = BacktestError::Runtime("test error".to_string());
        let result: ErrorResult = err.into();
        assert_eq!(result.category, "runtime");
        assert!(result.message.contains("test error"));
    }
}
