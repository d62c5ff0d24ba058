//! Divmon Indicators
//!
//! Indicator recurrences used by the divergence engine.
//!
//! # Available Indicators
//! - RSI: Relative Strength Index (Wilder smoothing)
//! - EMA: Exponential Moving Average
//! - MACD: line, signal, histogram
//! - KDJ: RSV, K, D, J
//!
//! Outputs are `Option<f64>` per input index; `None` marks slots before the
//! indicator's lookback is satisfied.

#![deny(clippy::all)]

pub mod error;
pub mod impl_;
pub mod series;
pub mod traits;

// Re-export main types
pub use error::IndicatorError;
pub use series::IndicatorSeries;
pub use traits::{Indicator, MultiOutputIndicator, PriceInput, Series};

// Re-export indicator implementations
pub use impl_::{
    ema::EMA,
    kdj::{KDJ, KdjResult},
    macd::{MACD, MacdResult},
    rsi::RSI,
};
