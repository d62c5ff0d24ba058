//! Walk-forward replay of the divergence strategy.
//!
//! At every candle index `n` the strategy sees exactly the candles a live
//! monitor would have seen when candle `n` closed. A detected pair is
//! accepted only at `n == later_pivot + pivot_right`, the first candle at
//! which the later pivot is confirmable live. Each symbol keeps a set of
//! accepted signal ids so a pivot is never counted twice.

use std::collections::{BTreeMap, HashSet};

use divmon_strategy::{DivergenceEngine, PreparedHistory, signal_key};
use divmon_types::{Candle, DivergenceSignal, EvaluationConfig, IndicatorConfig};
use serde::{Deserialize, Serialize};

use crate::error::BacktestError;
use crate::warmup::{first_evaluation_index, log_warmup};

/// A signal accepted by the replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedSignal {
    /// Dedup key
    pub id: String,
    /// Candle index at which the signal became visible
    pub candle_index: usize,
    /// Detected signal
    pub signal: DivergenceSignal,
}

/// Replays one strategy configuration over candle histories.
#[derive(Debug)]
pub struct WalkForward {
    engine: DivergenceEngine,
    indicators: IndicatorConfig,
    min_history: usize,
    seen: BTreeMap<String, HashSet<String>>,
}

impl WalkForward {
    /// Creates a replay for one evaluation configuration.
    ///
    /// # Errors
    /// Returns [`BacktestError::Strategy`] for an invalid configuration.
    pub fn new(config: &EvaluationConfig) -> Result<Self, BacktestError> {
        config.indicators.validate()?;
        Ok(Self {
            engine: DivergenceEngine::new(config.divergence.clone())?,
            indicators: config.indicators.clone(),
            min_history: config.min_history,
            seen: BTreeMap::new(),
        })
    }

    /// Number of ids already accepted for `symbol`.
    #[must_use]
    pub fn seen_count(&self, symbol: &str) -> usize {
        self.seen.get(symbol).map_or(0, HashSet::len)
    }

    /// Replays one symbol and returns newly accepted signals in candle order.
    ///
    /// # Errors
    /// Propagates [`BacktestError::Strategy`] from indicator or divergence
    /// preconditions.
    pub fn run_symbol(
        &mut self,
        symbol: &str,
        timeframe: &str,
        candles: &[Candle],
    ) -> Result<Vec<AcceptedSignal>, BacktestError> {
        if log_warmup(symbol, candles.len(), self.min_history) == 0 {
            return Ok(Vec::new());
        }

        let history = PreparedHistory::new(candles, &self.indicators)?;
        let divergence = self.engine.config();
        let pivot_right = divergence.pivot_right;
        let seen = self.seen.entry(symbol.to_string()).or_default();
        let mut accepted = Vec::new();

        for n in first_evaluation_index(self.min_history)..candles.len() {
            let input = history.input(n + 1, divergence);
            let Some(signal) = self.engine.detect(symbol, timeframe, &input)? else {
                continue;
            };
            if n != signal.later_pivot + pivot_right {
                continue;
            }
            let id = signal_key(&signal);
            if !seen.insert(id.clone()) {
                tracing::debug!(symbol, candle_index = n, "Skipping already accepted signal");
                continue;
            }
            accepted.push(AcceptedSignal {
                id,
                candle_index: n,
                signal,
            });
        }

        Ok(accepted)
    }
}
