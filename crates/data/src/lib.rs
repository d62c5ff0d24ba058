//! Divmon Data
//!
//! Bar-to-candle aggregation and candle validation.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

/// Streaming bar-to-candle aggregation.
pub mod aggregator;
/// Data-layer error types.
pub mod error;
/// Candle validation helpers.
pub mod validation;

/// Re-export: aggregator state machine and helpers.
pub use aggregator::{
    AggregationContext, AggregatorState, CandleAggregator, aggregate_bars, bucket_start, update,
};
/// Re-export: data-layer error type.
pub use error::DataError;
/// Re-export: candle validation.
pub use validation::validate_candles;
