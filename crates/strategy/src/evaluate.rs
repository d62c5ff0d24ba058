//! Evaluation entry point over a candle history.

use chrono::{DateTime, FixedOffset};
use divmon_indicators::IndicatorSeries;
use divmon_types::{Candle, DivergenceConfig, DivergenceSignal, EvaluationConfig, IndicatorConfig};

use crate::divergence::{DivergenceEngine, DivergenceInput, KdjView, MacdView};
use crate::error::StrategyError;

/// Candle history with its indicators computed once.
///
/// Because every indicator is causal, [`PreparedHistory::input`] over the
/// first `len` candles equals a fresh computation over those candles.
#[derive(Debug, Clone)]
pub struct PreparedHistory {
    closes: Vec<f64>,
    timestamps: Vec<DateTime<FixedOffset>>,
    series: IndicatorSeries,
}

impl PreparedHistory {
    /// Extracts price columns and computes all indicators.
    ///
    /// # Errors
    /// Returns [`StrategyError::Indicator`] on invalid indicator periods.
    pub fn new(candles: &[Candle], config: &IndicatorConfig) -> Result<Self, StrategyError> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
        let timestamps = candles.iter().map(|c| c.timestamp).collect();
        let series = IndicatorSeries::compute(&closes, &highs, &lows, config)?;
        Ok(Self {
            closes,
            timestamps,
            series,
        })
    }

    /// Number of candles
    #[must_use]
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Returns true for an empty history.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Computed indicators
    #[must_use]
    pub fn series(&self) -> &IndicatorSeries {
        &self.series
    }

    /// Divergence input over the first `len` candles, with the
    /// confirmation series the configuration enables.
    ///
    /// # Panics
    /// Panics if `len` exceeds [`PreparedHistory::len`].
    #[must_use]
    pub fn input(&self, len: usize, config: &DivergenceConfig) -> DivergenceInput<'_> {
        let mut input = DivergenceInput::new(
            &self.closes[..len],
            &self.timestamps[..len],
            &self.series.rsi[..len],
        );
        if config.use_macd {
            input = input.with_macd(MacdView::prefix(&self.series.macd, len));
        }
        if config.use_kdj {
            input = input.with_kdj(KdjView::prefix(&self.series.kdj, len));
        }
        input
    }
}

/// Evaluates the full candle history and returns at most one signal.
///
/// Histories shorter than `config.min_history` produce `Ok(None)`.
///
/// # Errors
/// - [`StrategyError::Config`] for an invalid divergence configuration.
/// - [`StrategyError::Indicator`] for invalid indicator periods.
pub fn evaluate(
    symbol: &str,
    timeframe: &str,
    candles: &[Candle],
    config: &EvaluationConfig,
) -> Result<Option<DivergenceSignal>, StrategyError> {
    let engine = DivergenceEngine::new(config.divergence.clone())?;
    if candles.len() < config.min_history {
        tracing::debug!(
            symbol,
            candles = candles.len(),
            min_history = config.min_history,
            "Not enough history to evaluate"
        );
        return Ok(None);
    }

    let history = PreparedHistory::new(candles, &config.indicators)?;
    let input = history.input(history.len(), engine.config());
    let signal = engine.detect(symbol, timeframe, &input)?;
    if let Some(signal) = &signal {
        tracing::debug!(
            symbol,
            kind = %signal.kind,
            strength = %signal.strength,
            pivot = signal.later_pivot,
            "Divergence detected"
        );
    }
    Ok(signal)
}
