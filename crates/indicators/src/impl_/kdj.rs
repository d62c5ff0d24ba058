//! KDJ stochastic oscillator

use crate::error::IndicatorError;
use crate::traits::{MultiOutputIndicator, PriceInput, Series};

/// Seed for K and D before the first defined RSV.
const KD_SEED: f64 = 50.0;

/// RSV, K, D and J series aligned with the input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KdjResult {
    /// Raw stochastic value
    pub rsv: Series,
    /// Smoothed RSV
    pub k: Series,
    /// Smoothed K
    pub d: Series,
    /// 3K - 2D
    pub j: Series,
}

/// KDJ(period, k_smooth, d_smooth)
///
/// `RSV = (close - lowest_low) / (highest_high - lowest_low) * 100` over the
/// last `period` bars, 50 when the range is zero. K and D are seeded at 50.
/// Indices before `period - 1` are undefined.
#[derive(Debug, Clone)]
pub struct KDJ {
    period: usize,
    k_smooth: usize,
    d_smooth: usize,
}

impl KDJ {
    /// Creates a new KDJ indicator.
    ///
    /// # Errors
    /// Returns [`IndicatorError::InvalidParams`] when a period is zero.
    pub fn new(period: usize, k_smooth: usize, d_smooth: usize) -> Result<Self, IndicatorError> {
        if period == 0 || k_smooth == 0 || d_smooth == 0 {
            return Err(IndicatorError::invalid_params(format!(
                "KDJ periods must be > 0 (period={period}, k_smooth={k_smooth}, d_smooth={d_smooth})"
            )));
        }
        Ok(Self {
            period,
            k_smooth,
            d_smooth,
        })
    }

    fn rsv(close: f64, high: &[f64], low: &[f64]) -> f64 {
        let highest = high.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lowest = low.iter().copied().fold(f64::INFINITY, f64::min);
        let range = highest - lowest;
        if range == 0.0 {
            50.0
        } else {
            (close - lowest) / range * 100.0
        }
    }
}

impl MultiOutputIndicator for KDJ {
    type Output = KdjResult;

    #[allow(clippy::cast_precision_loss)]
    fn compute_all(&self, input: &PriceInput<'_>) -> Result<KdjResult, IndicatorError> {
        let len = input.len();
        let mut result = KdjResult {
            rsv: vec![None; len],
            k: vec![None; len],
            d: vec![None; len],
            j: vec![None; len],
        };

        let k_alpha = 1.0 / self.k_smooth as f64;
        let d_alpha = 1.0 / self.d_smooth as f64;
        let (mut k, mut d) = (KD_SEED, KD_SEED);

        for i in (self.period - 1)..len {
            let window = (i + 1 - self.period)..=i;
            let rsv = Self::rsv(
                input.close()[i],
                &input.high()[window.clone()],
                &input.low()[window],
            );
            k = (1.0 - k_alpha) * k + k_alpha * rsv;
            d = (1.0 - d_alpha) * d + d_alpha * k;
            result.rsv[i] = Some(rsv);
            result.k[i] = Some(k);
            result.d[i] = Some(d);
            result.j[i] = Some(3.0 * k - 2.0 * d);
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "KDJ"
    }

    fn warmup_periods(&self) -> usize {
        self.period - 1
    }
}
