//! Moving Average Convergence Divergence (MACD)

use crate::error::IndicatorError;
use crate::impl_::ema::EMA;
use crate::traits::{MultiOutputIndicator, PriceInput, Series};

/// MACD line, signal line and histogram, aligned with the input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MacdResult {
    /// EMA(fast) - EMA(slow)
    pub line: Series,
    /// EMA(line, signal)
    pub signal: Series,
    /// line - signal
    pub histogram: Series,
}

/// MACD(fast, slow, signal)
///
/// Both EMAs are seeded with the first close, so the line is defined from
/// index 0. Undefined line entries are treated as 0 before the signal EMA.
#[derive(Debug, Clone)]
pub struct MACD {
    fast: EMA,
    slow: EMA,
    signal: EMA,
}

impl MACD {
    /// Creates a new MACD indicator.
    ///
    /// # Errors
    /// Returns [`IndicatorError::InvalidParams`] when a period is zero or
    /// `fast >= slow`.
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self, IndicatorError> {
        if fast >= slow {
            return Err(IndicatorError::invalid_params(format!(
                "MACD fast period ({fast}) must be < slow period ({slow})"
            )));
        }
        Ok(Self {
            fast: EMA::new(fast)?,
            slow: EMA::new(slow)?,
            signal: EMA::new(signal)?,
        })
    }

    /// Computes MACD over a close series.
    #[must_use]
    pub fn compute_closes(&self, closes: &[f64]) -> MacdResult {
        let fast = self.fast.smooth(closes);
        let slow = self.slow.smooth(closes);
        let line: Series = fast
            .iter()
            .zip(&slow)
            .map(|(f, s)| Some(f - s))
            .collect();

        let filled: Vec<f64> = line.iter().map(|v| v.unwrap_or(0.0)).collect();
        let signal: Series = self.signal.smooth(&filled).into_iter().map(Some).collect();

        let histogram = line
            .iter()
            .zip(&signal)
            .map(|(l, s)| Some((*l)? - (*s)?))
            .collect();

        MacdResult {
            line,
            signal,
            histogram,
        }
    }
}

impl MultiOutputIndicator for MACD {
    type Output = MacdResult;

    fn compute_all(&self, input: &PriceInput<'_>) -> Result<MacdResult, IndicatorError> {
        Ok(self.compute_closes(input.close()))
    }

    fn name(&self) -> &str {
        "MACD"
    }

    fn warmup_periods(&self) -> usize {
        0
    }
}
