//! Aligned indicator outputs for one candle history.

use divmon_types::IndicatorConfig;

use crate::error::IndicatorError;
use crate::impl_::kdj::{KDJ, KdjResult};
use crate::impl_::macd::{MACD, MacdResult};
use crate::impl_::rsi::RSI;
use crate::traits::{Indicator, MultiOutputIndicator, PriceInput, Series};

/// RSI, MACD and KDJ computed over the same close/high/low history.
///
/// Every series has the input's length; index `i` belongs to bar `i`.
/// All recurrences are causal, so the first `n` entries of a full
/// computation equal a computation over the first `n` bars.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorSeries {
    /// RSI values
    pub rsi: Series,
    /// MACD outputs
    pub macd: MacdResult,
    /// KDJ outputs
    pub kdj: KdjResult,
}

impl IndicatorSeries {
    /// Computes every indicator for the given price history.
    ///
    /// # Errors
    /// - [`IndicatorError::InvalidParams`] on invalid periods.
    /// - [`IndicatorError::LengthMismatch`] when inputs differ in length.
    pub fn compute(
        closes: &[f64],
        highs: &[f64],
        lows: &[f64],
        config: &IndicatorConfig,
    ) -> Result<Self, IndicatorError> {
        let input = PriceInput::new(closes, highs, lows)?;
        let rsi = RSI::new(config.rsi_period)?;
        let macd = MACD::new(config.macd_fast, config.macd_slow, config.macd_signal)?;
        let kdj = KDJ::new(config.kdj_period, config.kdj_k_smooth, config.kdj_d_smooth)?;

        Ok(Self {
            rsi: rsi.compute(closes),
            macd: macd.compute_all(&input)?,
            kdj: kdj.compute_all(&input)?,
        })
    }

    /// Number of aligned entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    /// Returns true when computed over an empty history.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }
}
