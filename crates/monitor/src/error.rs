//! Monitor error types.

use thiserror::Error;

/// Alert delivery failure. The signal stays unmarked so a later
/// evaluation can retry it.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Sink rejected or could not reach its destination
    #[error("alert delivery failed: {0}")]
    Delivery(String),

    /// Payload could not be encoded
    #[error("alert payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl AlertError {
    /// Creates a delivery error.
    #[must_use]
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }
}

/// Market data provider failure.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection dropped or could not be established
    #[error("provider connection error: {0}")]
    Connection(String),

    /// Request rejected by the provider
    #[error("provider request error: {0}")]
    Request(String),
}

impl ProviderError {
    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }
}

/// Candle or sent-signal persistence failure.
#[derive(Debug, Error)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

/// Errors surfaced by the live monitor and backtest session.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] divmon_types::CoreError),

    /// Aggregation failure
    #[error(transparent)]
    Data(#[from] divmon_data::DataError),

    /// Evaluation failure
    #[error(transparent)]
    Strategy(#[from] divmon_strategy::StrategyError),

    /// Replay failure
    #[error(transparent)]
    Backtest(#[from] divmon_backtest::BacktestError),

    /// Provider failure outside the reconnect loop
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Alert delivery failure
    #[error(transparent)]
    Alert(#[from] AlertError),

    /// Persistence failure
    #[error(transparent)]
    Store(#[from] StoreError),
}
