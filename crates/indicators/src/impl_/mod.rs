//! Indicator implementations
//!
//! Contains all concrete indicator implementations.

pub mod ema;
pub mod kdj;
pub mod macd;
pub mod rsi;
