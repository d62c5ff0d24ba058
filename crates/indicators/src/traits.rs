//! Indicator traits and input types.

use crate::error::IndicatorError;

/// One value per input index; `None` before the indicator is defined.
pub type Series = Vec<Option<f64>>;

/// Single-input indicator over a value series (e.g. closes).
pub trait Indicator: Send + Sync {
    /// Computes the indicator for all values.
    ///
    /// Returns a series with the same length as `values`.
    /// Entries at indices < `warmup_periods()` are `None`.
    fn compute(&self, values: &[f64]) -> Series;

    /// Name of the indicator (e.g., "RSI", "EMA").
    fn name(&self) -> &str;

    /// Index of the first defined output.
    fn warmup_periods(&self) -> usize;
}

/// Trait for multi-output indicators like MACD and KDJ.
///
/// These indicators produce several aligned series that are computed
/// together.
pub trait MultiOutputIndicator: Send + Sync {
    /// Type of the output structure
    type Output;

    /// Computes all outputs at once.
    ///
    /// # Errors
    /// Implementations reject inputs they cannot align.
    fn compute_all(&self, input: &PriceInput<'_>) -> Result<Self::Output, IndicatorError>;

    /// Name of the indicator.
    fn name(&self) -> &str;

    /// Index of the first defined output.
    fn warmup_periods(&self) -> usize;
}

/// Parallel close/high/low slices of equal length.
#[derive(Debug, Clone, Copy)]
pub struct PriceInput<'a> {
    close: &'a [f64],
    high: &'a [f64],
    low: &'a [f64],
}

impl<'a> PriceInput<'a> {
    /// Wraps the three series after checking their lengths.
    ///
    /// # Errors
    /// Returns [`IndicatorError::LengthMismatch`] when `high` or `low`
    /// differs in length from `close`.
    pub fn new(close: &'a [f64], high: &'a [f64], low: &'a [f64]) -> Result<Self, IndicatorError> {
        if high.len() != close.len() {
            return Err(IndicatorError::length_mismatch("high", close.len(), high.len()));
        }
        if low.len() != close.len() {
            return Err(IndicatorError::length_mismatch("low", close.len(), low.len()));
        }
        Ok(Self { close, high, low })
    }

    /// Close prices
    #[must_use]
    pub fn close(&self) -> &'a [f64] {
        self.close
    }

    /// High prices
    #[must_use]
    pub fn high(&self) -> &'a [f64] {
        self.high
    }

    /// Low prices
    #[must_use]
    pub fn low(&self) -> &'a [f64] {
        self.low
    }

    /// Number of bars
    #[must_use]
    pub fn len(&self) -> usize {
        self.close.len()
    }

    /// Returns true when there are no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}
