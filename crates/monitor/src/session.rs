//! Historical backtest session.
//!
//! Fetches one-minute bars for a range, aggregates and persists candles,
//! replays both strategies, publishes confirmed signals through the gate
//! and logs the summary.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use divmon_backtest::{BacktestReport, aggregate_history, replay};
use divmon_types::{BacktestConfig, Timeframe};

use crate::collaborators::{AlertSink, CandleRepository, MarketDataProvider};
use crate::error::MonitorError;
use crate::gate::{GateOutcome, SignalGate};

/// Outcome of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    /// Replay report; `None` when the provider returned no bars
    pub report: Option<BacktestReport>,
    /// Alerts delivered during this session
    pub published: usize,
    /// Signals already sent earlier
    pub duplicates: usize,
    /// Signals whose delivery failed (left unmarked)
    pub failed: usize,
}

/// Backtest over provider history.
pub struct BacktestSession {
    config: BacktestConfig,
    symbols: Vec<String>,
    repository: Arc<dyn CandleRepository>,
    gate: Arc<SignalGate>,
    sink: Arc<dyn AlertSink>,
}

impl std::fmt::Debug for BacktestSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BacktestSession")
            .field("symbols", &self.symbols)
            .field("timeframe", &self.config.timeframe)
            .finish_non_exhaustive()
    }
}

impl BacktestSession {
    /// Creates a session after validating `config`.
    ///
    /// # Errors
    /// Returns [`MonitorError::Config`] for an invalid configuration.
    pub fn new(
        config: BacktestConfig,
        symbols: Vec<String>,
        repository: Arc<dyn CandleRepository>,
        gate: Arc<SignalGate>,
        sink: Arc<dyn AlertSink>,
    ) -> Result<Self, MonitorError> {
        config.validate()?;
        Ok(Self {
            config,
            symbols,
            repository,
            gate,
            sink,
        })
    }

    /// Runs the session over `[start, end)`.
    ///
    /// Delivery failures are logged and counted; they do not abort the
    /// session.
    ///
    /// # Errors
    /// Provider, aggregation, persistence or replay failures.
    pub async fn run(
        &self,
        provider: &dyn MarketDataProvider,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<SessionOutcome, MonitorError> {
        let mut outcome = SessionOutcome {
            report: None,
            published: 0,
            duplicates: 0,
            failed: 0,
        };

        let bars = provider
            .get_range(&self.symbols, Timeframe::ONE_MINUTE, start, end)
            .await?;
        let bars: BTreeMap<_, _> = bars.into_iter().filter(|(_, b)| !b.is_empty()).collect();
        if bars.is_empty() {
            tracing::info!("No market data returned for the selected range.");
            return Ok(outcome);
        }

        let candles_by_symbol = aggregate_history(&bars, &self.config)?;
        for candles in candles_by_symbol.values().filter(|c| !c.is_empty()) {
            self.repository.upsert_candles(candles)?;
        }

        let report = replay(&candles_by_symbol, &self.config)?;
        for accepted in report.signals.values().flatten() {
            match self.gate.publish(&accepted.signal, self.sink.as_ref()) {
                Ok(GateOutcome::Sent(_)) => outcome.published += 1,
                Ok(GateOutcome::Duplicate(_)) => outcome.duplicates += 1,
                Err(MonitorError::Alert(err)) => {
                    tracing::warn!(symbol = %accepted.signal.symbol, "Alert failed: {err}");
                    outcome.failed += 1;
                }
                Err(err) => return Err(err),
            }
        }

        log_summary(&report);
        outcome.report = Some(report);
        Ok(outcome)
    }
}

/// Logs the replay summary, accuracy tables and simulations.
pub fn log_summary(report: &BacktestReport) {
    let summary = &report.summary;
    tracing::info!("Backtest summary");
    tracing::info!("Candles processed: {}", summary.candles_processed);
    tracing::info!("Bullish signals: {}", summary.signals.bullish);
    tracing::info!("  - Strong: {}", summary.signals.bullish_strong);
    tracing::info!("  - Normal: {}", summary.signals.bullish_normal);
    tracing::info!("Bearish signals: {}", summary.signals.bearish);
    tracing::info!("  - Strong: {}", summary.signals.bearish_strong);
    tracing::info!("  - Normal: {}", summary.signals.bearish_normal);
    if let (Some(first), Some(last)) = (summary.first_candle, summary.last_candle) {
        tracing::info!("First timestamp: {}", first.to_rfc3339());
        tracing::info!("Last timestamp: {}", last.to_rfc3339());
    }

    for (label, accuracy) in [
        ("confirmed (RSI + MACD/KDJ)", &report.accuracy),
        ("RSI-only (no confirmations)", &report.rsi_only_accuracy),
    ] {
        tracing::info!("Accuracy metrics ({label}, returns are directionally adjusted)");
        for (kind, buckets) in &accuracy.stats {
            for (bucket, horizons) in buckets {
                for (horizon, stats) in horizons {
                    tracing::info!(
                        "  {kind} {bucket} h={horizon} count={} hit_rate={:.1}% avg={:.3}% median={:.3}%",
                        stats.count,
                        stats.hit_rate * 100.0,
                        stats.mean_return * 100.0,
                        stats.median_return * 100.0
                    );
                }
            }
        }
    }

    for (label, results) in [
        ("confirmed", &report.portfolio),
        ("RSI-only", &report.rsi_only_portfolio),
    ] {
        for (symbol, result) in results {
            tracing::info!(
                "Simulation ({label}) {symbol}: start=${:.2} end=${:.2} return={:.2}% buys={} sells={} cash=${:.2} shares={:.4}",
                result.starting_cash,
                result.ending_value,
                result.return_pct(),
                result.state.buy_count,
                result.state.sell_count,
                result.state.cash,
                result.state.shares
            );
        }
    }
}
