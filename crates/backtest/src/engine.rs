//! Backtest engine: replays both strategy variants and scores them.

use std::collections::BTreeMap;

use divmon_data::validate_candles;
use divmon_metrics::{AccuracyReport, compute_accuracy, round_accuracy};
use divmon_portfolio::{PortfolioResult, simulate_portfolio};
use divmon_types::{BacktestConfig, Candle, EvaluationConfig, SignalEvent};
use serde::{Deserialize, Serialize};

use crate::error::BacktestError;
use crate::result_builder::{BacktestSummary, build_summary};
use crate::walk_forward::{AcceptedSignal, WalkForward};

/// Full replay output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Counts, candle span and portfolio totals
    pub summary: BacktestSummary,
    /// Confirmed strategy signals per symbol
    pub signals: BTreeMap<String, Vec<AcceptedSignal>>,
    /// RSI-only strategy signals per symbol
    pub rsi_only_signals: BTreeMap<String, Vec<AcceptedSignal>>,
    /// Confirmed strategy portfolio per symbol
    pub portfolio: BTreeMap<String, PortfolioResult>,
    /// RSI-only strategy portfolio per symbol
    pub rsi_only_portfolio: BTreeMap<String, PortfolioResult>,
    /// Confirmed strategy forward-return accuracy
    pub accuracy: AccuracyReport,
    /// RSI-only strategy forward-return accuracy
    pub rsi_only_accuracy: AccuracyReport,
}

/// Backtest engine for one validated configuration.
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    config: BacktestConfig,
    timeframe: String,
}

impl BacktestEngine {
    /// Creates an engine after validating `config`.
    ///
    /// # Errors
    /// Returns [`BacktestError::ConfigValidation`] for invalid values.
    pub fn new(config: BacktestConfig) -> Result<Self, BacktestError> {
        config.validate()?;
        let timeframe = config.timeframe.label();
        Ok(Self { config, timeframe })
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Replays every symbol with the confirmed and the RSI-only strategy.
    ///
    /// # Errors
    /// - [`BacktestError::Data`] when a candle series is malformed.
    /// - [`BacktestError::Strategy`] / [`BacktestError::Portfolio`] from the
    ///   underlying layers.
    pub fn run(
        &self,
        candles_by_symbol: &BTreeMap<String, Vec<Candle>>,
    ) -> Result<BacktestReport, BacktestError> {
        for candles in candles_by_symbol.values().filter(|c| !c.is_empty()) {
            validate_candles(candles)?;
        }

        let confirmed = &self.config.evaluation;
        let rsi_only = confirmed.rsi_only();

        let signals = self.replay_variant(candles_by_symbol, confirmed)?;
        let rsi_only_signals = self.replay_variant(candles_by_symbol, &rsi_only)?;

        let events = to_events(&signals);
        let rsi_only_events = to_events(&rsi_only_signals);

        let simulation = &self.config.simulation;
        let portfolio = simulate_portfolio(candles_by_symbol, &events, simulation)?;
        let rsi_only_portfolio = simulate_portfolio(candles_by_symbol, &rsi_only_events, simulation)?;

        let horizons = &self.config.accuracy_horizons;
        let accuracy = round_accuracy(compute_accuracy(candles_by_symbol, &events, horizons));
        let rsi_only_accuracy =
            round_accuracy(compute_accuracy(candles_by_symbol, &rsi_only_events, horizons));

        let summary = build_summary(
            candles_by_symbol,
            &signals,
            &rsi_only_signals,
            &portfolio,
            &rsi_only_portfolio,
        );
        tracing::info!(
            symbols = summary.symbols,
            candles = summary.candles_processed,
            signals = summary.signals.total,
            rsi_only_signals = summary.rsi_only_signals.total,
            "Backtest replay complete"
        );

        Ok(BacktestReport {
            summary,
            signals,
            rsi_only_signals,
            portfolio,
            rsi_only_portfolio,
            accuracy,
            rsi_only_accuracy,
        })
    }

    fn replay_variant(
        &self,
        candles_by_symbol: &BTreeMap<String, Vec<Candle>>,
        evaluation: &EvaluationConfig,
    ) -> Result<BTreeMap<String, Vec<AcceptedSignal>>, BacktestError> {
        let mut walk = WalkForward::new(evaluation)?;
        let mut signals = BTreeMap::new();
        for (symbol, candles) in candles_by_symbol {
            let accepted = walk.run_symbol(symbol, &self.timeframe, candles)?;
            signals.insert(symbol.clone(), accepted);
        }
        Ok(signals)
    }
}

fn to_events(
    signals: &BTreeMap<String, Vec<AcceptedSignal>>,
) -> BTreeMap<String, Vec<SignalEvent>> {
    signals
        .iter()
        .map(|(symbol, accepted)| {
            let events = accepted.iter().map(|a| a.signal.to_event()).collect();
            (symbol.clone(), events)
        })
        .collect()
}

/// Replays `candles_by_symbol` under `config`.
///
/// # Errors
/// See [`BacktestEngine::new`] and [`BacktestEngine::run`].
pub fn replay(
    candles_by_symbol: &BTreeMap<String, Vec<Candle>>,
    config: &BacktestConfig,
) -> Result<BacktestReport, BacktestError> {
    BacktestEngine::new(config.clone())?.run(candles_by_symbol)
}
