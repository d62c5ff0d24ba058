//! # Divmon Portfolio
//!
//! Directional portfolio simulation over replayed divergence signals.
//!
//! Each symbol starts with the same cash. Bullish events buy a fraction of
//! cash at the pivot candle's close, bearish events sell a fraction of the
//! held shares. Events at the same pivot timestamp are applied sell-first.
//!
//! ## Example
//!
//! ```ignore
//! use divmon_portfolio::simulate_portfolio;
//! use divmon_types::SimulationConfig;
//!
//! let results = simulate_portfolio(&candles_by_symbol, &events_by_symbol, &SimulationConfig::default())?;
//! for (symbol, result) in &results {
//!     println!("{symbol}: {:.2}%", result.return_pct());
//! }
//! ```

#![deny(clippy::all)]

pub mod error;
pub mod simulator;

// Re-exports for convenience
pub use error::PortfolioError;
pub use simulator::{Fill, PortfolioResult, PortfolioState, simulate_portfolio, simulate_symbol};
