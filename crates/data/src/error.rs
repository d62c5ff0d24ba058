//! Data-layer error types.

use thiserror::Error;

/// Errors that can occur while aggregating or validating candle data.
#[derive(Debug, Error)]
pub enum DataError {
    /// A bar for a different symbol was pushed into an aggregator.
    #[error("Symbol mismatch: aggregator for {expected}, got bar for {got}")]
    SymbolMismatch {
        /// Symbol the aggregator was created for.
        expected: String,
        /// Symbol carried by the rejected bar.
        got: String,
    },

    /// No candles to validate.
    #[error("Empty data")]
    EmptyData,

    /// Data violated a candle invariant.
    #[error("Corrupt data: {0}")]
    CorruptData(String),
}

impl DataError {
    /// Creates a symbol mismatch error
    #[must_use]
    pub fn symbol_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::SymbolMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}
