use thiserror::Error;

/// Core error types for the divergence monitor
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown or unsupported time zone name
    #[error("Invalid timezone: {0}")]
    Timezone(String),

    /// Unsupported timeframe string
    #[error("Invalid timeframe: {0}")]
    Timeframe(String),

    /// Required environment variable missing or malformed
    #[error("Environment error: {0}")]
    Env(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
