//! Divmon Backtest
//!
//! Walk-forward replay of the divergence strategy over historical candles.
//! Each symbol is replayed twice, once with the configured confirmations and
//! once RSI-only, and both variants are scored with the portfolio simulator
//! and forward-return accuracy.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

pub mod engine;
pub mod error;
pub mod result_builder;
pub mod runner;
pub mod walk_forward;
pub mod warmup;

pub use engine::{BacktestEngine, BacktestReport, replay};
pub use error::{BacktestError, ErrorResult};
pub use result_builder::{BacktestSummary, SignalCounts};
pub use runner::{aggregate_history, run_backtest_from_json};
pub use walk_forward::{AcceptedSignal, WalkForward};
