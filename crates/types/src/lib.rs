//! Divmon Types
//!
//! Core data structures for the divergence monitor.
//! This crate provides types for bars, candles, timeframes, divergence
//! signals and configuration.

#![deny(clippy::all)]

pub mod candle;
pub mod config;
pub mod error;
pub mod signal;
pub mod timeframe;

// Re-export main types for convenience
pub use candle::{Bar, Candle};
pub use config::{
    BacktestConfig, DivergenceConfig, EvaluationConfig, IndicatorConfig, LoggingConfig,
    MonitorConfig, ReconnectConfig, SimulationConfig, parse_timezone,
};
pub use error::CoreError;
pub use signal::{Confirmation, DivergenceSignal, SignalEvent, SignalKind, Strength};
pub use timeframe::{ParseTimeframeError, Timeframe};
