//! Backtest summary assembly helpers.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use divmon_metrics::{PortfolioSummary, round_portfolio_summary, summarize_portfolio};
use divmon_portfolio::PortfolioResult;
use divmon_types::{Candle, SignalKind, Strength};
use serde::{Deserialize, Serialize};

use crate::walk_forward::AcceptedSignal;

/// Accepted signal counts by kind and strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalCounts {
    /// All accepted signals
    pub total: usize,
    /// Bullish signals
    pub bullish: usize,
    /// Bearish signals
    pub bearish: usize,
    /// Strong bullish signals
    pub bullish_strong: usize,
    /// Normal bullish signals
    pub bullish_normal: usize,
    /// Strong bearish signals
    pub bearish_strong: usize,
    /// Normal bearish signals
    pub bearish_normal: usize,
}

impl SignalCounts {
    /// Counts signals across all symbols.
    #[must_use]
    pub fn from_signals(signals: &BTreeMap<String, Vec<AcceptedSignal>>) -> Self {
        let mut counts = Self::default();
        for accepted in signals.values().flatten() {
            counts.total += 1;
            let signal = &accepted.signal;
            match (signal.kind, signal.strength) {
                (SignalKind::Bullish, Strength::Strong) => {
                    counts.bullish += 1;
                    counts.bullish_strong += 1;
                }
                (SignalKind::Bullish, Strength::Normal) => {
                    counts.bullish += 1;
                    counts.bullish_normal += 1;
                }
                (SignalKind::Bearish, Strength::Strong) => {
                    counts.bearish += 1;
                    counts.bearish_strong += 1;
                }
                (SignalKind::Bearish, Strength::Normal) => {
                    counts.bearish += 1;
                    counts.bearish_normal += 1;
                }
            }
        }
        counts
    }
}

/// Top-level figures of one replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// Symbols with at least one candle
    pub symbols: usize,
    /// Candles replayed across symbols
    pub candles_processed: usize,
    /// Earliest candle start across symbols
    pub first_candle: Option<DateTime<FixedOffset>>,
    /// Latest candle start across symbols
    pub last_candle: Option<DateTime<FixedOffset>>,
    /// Confirmed strategy signal counts
    pub signals: SignalCounts,
    /// RSI-only strategy signal counts
    pub rsi_only_signals: SignalCounts,
    /// Confirmed strategy portfolio totals
    pub portfolio: PortfolioSummary,
    /// RSI-only strategy portfolio totals
    pub rsi_only_portfolio: PortfolioSummary,
}

/// Builds the replay summary.
#[must_use]
pub(crate) fn build_summary(
    candles_by_symbol: &BTreeMap<String, Vec<Candle>>,
    signals: &BTreeMap<String, Vec<AcceptedSignal>>,
    rsi_only_signals: &BTreeMap<String, Vec<AcceptedSignal>>,
    portfolio: &BTreeMap<String, PortfolioResult>,
    rsi_only_portfolio: &BTreeMap<String, PortfolioResult>,
) -> BacktestSummary {
    let non_empty = candles_by_symbol.values().filter(|c| !c.is_empty());
    let first_candle = non_empty
        .clone()
        .filter_map(|c| c.first().map(|c| c.timestamp))
        .min();
    let last_candle = non_empty
        .clone()
        .filter_map(|c| c.last().map(|c| c.timestamp))
        .max();

    BacktestSummary {
        symbols: non_empty.clone().count(),
        candles_processed: non_empty.map(Vec::len).sum(),
        first_candle,
        last_candle,
        signals: SignalCounts::from_signals(signals),
        rsi_only_signals: SignalCounts::from_signals(rsi_only_signals),
        portfolio: round_portfolio_summary(summarize_portfolio(portfolio)),
        rsi_only_portfolio: round_portfolio_summary(summarize_portfolio(rsi_only_portfolio)),
    }
}
