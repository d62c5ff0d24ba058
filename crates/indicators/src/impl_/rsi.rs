//! Relative Strength Index (RSI) with Wilder smoothing

use crate::error::IndicatorError;
use crate::traits::{Indicator, Series};

/// Relative Strength Index (Wilder)
///
/// Average gain and loss are seeded from the first `period` deltas, then
/// smoothed as `avg = (avg * (n-1) + x) / n`. The first value sits at index
/// `period`; with fewer than `period + 1` inputs nothing is defined.
#[derive(Debug, Clone)]
pub struct RSI {
    period: usize,
}

impl RSI {
    /// Creates a new RSI indicator with the given period.
    ///
    /// # Errors
    /// Returns [`IndicatorError::InvalidParams`] when `period` is zero.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::invalid_params("RSI period must be > 0"));
        }
        Ok(Self { period })
    }

    /// Number of periods
    #[must_use]
    pub fn period(&self) -> usize {
        self.period
    }

    #[inline]
    fn value(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    }
}

impl Indicator for RSI {
    #[allow(clippy::cast_precision_loss)]
    fn compute(&self, values: &[f64]) -> Series {
        let len = values.len();
        let mut result = vec![None; len];
        if len <= self.period {
            return result;
        }

        let n = self.period as f64;
        let (mut gain_sum, mut loss_sum) = (0.0, 0.0);
        for i in 1..=self.period {
            let delta = values[i] - values[i - 1];
            gain_sum += delta.max(0.0);
            loss_sum += (-delta).max(0.0);
        }
        let mut avg_gain = gain_sum / n;
        let mut avg_loss = loss_sum / n;
        result[self.period] = Some(Self::value(avg_gain, avg_loss));

        for i in (self.period + 1)..len {
            let delta = values[i] - values[i - 1];
            avg_gain = (avg_gain * (n - 1.0) + delta.max(0.0)) / n;
            avg_loss = (avg_loss * (n - 1.0) + (-delta).max(0.0)) / n;
            result[i] = Some(Self::value(avg_gain, avg_loss));
        }

        result
    }

    fn name(&self) -> &str {
        "RSI"
    }

    fn warmup_periods(&self) -> usize {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rsi_undefined_before_period() {
        let rsi = RSI::new(3).unwrap();
        let result = rsi.compute(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(result[..3], [None, None, None]);
        assert_eq!(result[3], Some(100.0));
        assert_eq!(result[4], Some(100.0));
    }

    #[test]
    fn test_rsi_too_short_is_all_none() {
        let rsi = RSI::new(14).unwrap();
        let result = rsi.compute(&[1.0; 14]);
        assert_eq!(result.len(), 14);
        assert!(result.iter().all(Option::is_none));
    }

    #[test]
    fn test_rsi_wilder_values() {
        // deltas: +1, -1, +2, -1
        let rsi = RSI::new(2).unwrap();
        let result = rsi.compute(&[10.0, 11.0, 10.0, 12.0, 11.0]);

        // seed: gain 0.5, loss 0.5 -> 50
        assert!((result[2].unwrap() - 50.0).abs() < 1e-10);
        // gain (0.5 + 2) / 2 = 1.25, loss 0.25 -> 100 - 100 / 6
        assert!((result[3].unwrap() - (100.0 - 100.0 / 6.0)).abs() < 1e-10);
        // gain 0.625, loss 0.625 -> 50
        assert!((result[4].unwrap() - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_falling_series_is_zero() {
        let rsi = RSI::new(3).unwrap();
        let result = rsi.compute(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        assert!(result[3].unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_rsi_flat_series_is_hundred() {
        let rsi = RSI::new(3).unwrap();
        assert_eq!(rsi.compute(&[7.0; 6])[5], Some(100.0));
    }

    #[test]
    fn test_rsi_period_zero_rejected() {
        assert!(RSI::new(0).is_err());
    }

    proptest! {
        #[test]
        fn prop_rsi_bounded(
            values in prop::collection::vec(0.01f64..1000.0, 0..200),
            period in 1usize..30,
        ) {
            let result = RSI::new(period).unwrap().compute(&values);
            prop_assert_eq!(result.len(), values.len());
            for (i, value) in result.iter().enumerate() {
                match value {
                    Some(v) => {
                        prop_assert!(i >= period);
                        prop_assert!((0.0..=100.0).contains(v));
                    }
                    None => prop_assert!(i < period),
                }
            }
        }
    }
}
