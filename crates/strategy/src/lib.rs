//! Divmon Strategy
//!
//! Divergence layer of the monitor: pivot extraction, price/RSI divergence
//! matching with MACD/KDJ confirmation, and the signal identity used for
//! deduplication.
//!
//! # Example
//! ```ignore
//! use divmon_strategy::{evaluate, signal_key};
//! use divmon_types::EvaluationConfig;
//!
//! if let Some(signal) = evaluate("SMCI", "10m", &candles, &EvaluationConfig::default())? {
//!     let id = signal_key(&signal);
//!     // gate on `id`, then alert...
//! }
//! ```

#![deny(clippy::all)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]

pub mod divergence;
pub mod error;
pub mod evaluate;
pub mod identity;
pub mod pivots;

// Re-export main types
pub use divergence::{DivergenceEngine, DivergenceInput, KdjView, MacdView};
pub use error::StrategyError;
pub use evaluate::{PreparedHistory, evaluate};
pub use identity::{format_pivot_timestamp, signal_id, signal_key};
pub use pivots::{pivot_highs, pivot_lows};
