//! Exponential Moving Average (EMA) indicator

use crate::error::IndicatorError;
use crate::traits::{Indicator, Series};

/// Exponential Moving Average
///
/// Multiplier = 2 / (period + 1), seeded with the first raw value
/// (no simple-average seed). Defined from index 0.
#[derive(Debug, Clone)]
pub struct EMA {
    period: usize,
}

impl EMA {
    /// Creates a new EMA indicator with the given period.
    ///
    /// # Errors
    /// Returns [`IndicatorError::InvalidParams`] when `period` is zero.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::invalid_params("EMA period must be > 0"));
        }
        Ok(Self { period })
    }

    /// Number of periods
    #[must_use]
    pub fn period(&self) -> usize {
        self.period
    }

    /// Calculates the EMA multiplier (smoothing factor).
    #[allow(clippy::cast_precision_loss)]
    fn multiplier(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }

    /// Smooths a fully defined series.
    pub(crate) fn smooth(&self, values: &[f64]) -> Vec<f64> {
        let alpha = self.multiplier();
        let mut result = Vec::with_capacity(values.len());
        let mut prev: Option<f64> = None;
        for &value in values {
            let next = match prev {
                None => value,
                Some(p) => alpha * value + (1.0 - alpha) * p,
            };
            result.push(next);
            prev = Some(next);
        }
        result
    }
}

impl Indicator for EMA {
    fn compute(&self, values: &[f64]) -> Series {
        self.smooth(values).into_iter().map(Some).collect()
    }

    fn name(&self) -> &str {
        "EMA"
    }

    fn warmup_periods(&self) -> usize {
        0
    }
}
