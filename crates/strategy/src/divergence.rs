//! Price/RSI divergence matching with MACD and KDJ confirmation.

use chrono::{DateTime, FixedOffset};
use divmon_indicators::{KdjResult, MacdResult};
use divmon_types::{Confirmation, DivergenceConfig, DivergenceSignal, SignalKind, Strength};

use crate::error::StrategyError;
use crate::pivots::{pivot_highs, pivot_lows};

/// KDJ level below which rising K/D confirm a bullish divergence.
const KDJ_OVERSOLD: f64 = 30.0;
/// KDJ level above which falling K/D confirm a bearish divergence.
const KDJ_OVERBOUGHT: f64 = 70.0;

/// Borrowed MACD series.
#[derive(Debug, Clone, Copy)]
pub struct MacdView<'a> {
    /// MACD line
    pub line: &'a [Option<f64>],
    /// Signal line
    pub signal: &'a [Option<f64>],
    /// Histogram
    pub histogram: &'a [Option<f64>],
}

impl<'a> MacdView<'a> {
    /// First `len` entries of a computed MACD.
    ///
    /// # Panics
    /// Panics if `len` exceeds the computed length.
    #[must_use]
    pub fn prefix(macd: &'a MacdResult, len: usize) -> Self {
        Self {
            line: &macd.line[..len],
            signal: &macd.signal[..len],
            histogram: &macd.histogram[..len],
        }
    }
}

/// Borrowed KDJ series.
#[derive(Debug, Clone, Copy)]
pub struct KdjView<'a> {
    /// K line
    pub k: &'a [Option<f64>],
    /// D line
    pub d: &'a [Option<f64>],
}

impl<'a> KdjView<'a> {
    /// First `len` entries of a computed KDJ.
    ///
    /// # Panics
    /// Panics if `len` exceeds the computed length.
    #[must_use]
    pub fn prefix(kdj: &'a KdjResult, len: usize) -> Self {
        Self {
            k: &kdj.k[..len],
            d: &kdj.d[..len],
        }
    }
}

/// Aligned series for one divergence evaluation.
#[derive(Debug, Clone, Copy)]
pub struct DivergenceInput<'a> {
    /// Close prices
    pub closes: &'a [f64],
    /// Candle bucket starts
    pub timestamps: &'a [DateTime<FixedOffset>],
    /// RSI
    pub rsi: &'a [Option<f64>],
    /// MACD, required when `use_macd` is set
    pub macd: Option<MacdView<'a>>,
    /// KDJ, required when `use_kdj` is set
    pub kdj: Option<KdjView<'a>>,
}

impl<'a> DivergenceInput<'a> {
    /// Creates an input without confirmation series.
    #[must_use]
    pub fn new(
        closes: &'a [f64],
        timestamps: &'a [DateTime<FixedOffset>],
        rsi: &'a [Option<f64>],
    ) -> Self {
        Self {
            closes,
            timestamps,
            rsi,
            macd: None,
            kdj: None,
        }
    }

    /// Attaches MACD series.
    #[must_use]
    pub fn with_macd(mut self, macd: MacdView<'a>) -> Self {
        self.macd = Some(macd);
        self
    }

    /// Attaches KDJ series.
    #[must_use]
    pub fn with_kdj(mut self, kdj: KdjView<'a>) -> Self {
        self.kdj = Some(kdj);
        self
    }

    fn validate(&self, config: &DivergenceConfig) -> Result<(), StrategyError> {
        let expected = self.closes.len();
        let check = |series: &'static str, actual: usize| {
            if actual == expected {
                Ok(())
            } else {
                Err(StrategyError::length_mismatch(series, expected, actual))
            }
        };

        check("timestamps", self.timestamps.len())?;
        check("rsi", self.rsi.len())?;
        if let Some(macd) = &self.macd {
            check("macd_line", macd.line.len())?;
            check("macd_signal", macd.signal.len())?;
            check("macd_histogram", macd.histogram.len())?;
        }
        if let Some(kdj) = &self.kdj {
            check("kdj_k", kdj.k.len())?;
            check("kdj_d", kdj.d.len())?;
        }

        if config.use_macd && self.macd.is_none() {
            return Err(StrategyError::MissingIndicator("macd"));
        }
        if config.use_kdj && self.kdj.is_none() {
            return Err(StrategyError::MissingIndicator("kdj"));
        }
        Ok(())
    }
}

/// Detects the most recent price/RSI divergence.
#[derive(Debug, Clone)]
pub struct DivergenceEngine {
    config: DivergenceConfig,
}

impl DivergenceEngine {
    /// Creates an engine after validating the configuration.
    ///
    /// # Errors
    /// Returns [`StrategyError::Config`] for invalid windows or thresholds.
    pub fn new(config: DivergenceConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &DivergenceConfig {
        &self.config
    }

    /// Runs one evaluation over `input`.
    ///
    /// The bullish check runs first; if it fires (after confirmation
    /// gating) the bearish check is skipped. At most one signal is returned.
    ///
    /// # Errors
    /// - [`StrategyError::LengthMismatch`] when series are not aligned.
    /// - [`StrategyError::MissingIndicator`] when an enabled confirmation
    ///   has no series.
    pub fn detect(
        &self,
        symbol: &str,
        timeframe: &str,
        input: &DivergenceInput<'_>,
    ) -> Result<Option<DivergenceSignal>, StrategyError> {
        input.validate(&self.config)?;
        let cfg = &self.config;

        let lows = pivot_lows(input.closes, cfg.pivot_left, cfg.pivot_right)?;
        if let Some((earlier, later)) = select_pair(&lows, cfg.min_sep_bars, cfg.max_sep_bars)
            && let Some(signal) =
                self.check(SignalKind::Bullish, symbol, timeframe, input, earlier, later)
        {
            return Ok(Some(signal));
        }

        let highs = pivot_highs(input.closes, cfg.pivot_left, cfg.pivot_right)?;
        if let Some((earlier, later)) = select_pair(&highs, cfg.min_sep_bars, cfg.max_sep_bars) {
            return Ok(self.check(SignalKind::Bearish, symbol, timeframe, input, earlier, later));
        }

        Ok(None)
    }

    fn check(
        &self,
        kind: SignalKind,
        symbol: &str,
        timeframe: &str,
        input: &DivergenceInput<'_>,
        earlier: usize,
        later: usize,
    ) -> Option<DivergenceSignal> {
        let (rsi_e, rsi_l) = (input.rsi[earlier]?, input.rsi[later]?);
        let (close_e, close_l) = (input.closes[earlier], input.closes[later]);
        let delta = self.config.min_rsi_delta;

        let diverges = match kind {
            SignalKind::Bullish => close_l < close_e && rsi_l >= rsi_e + delta,
            SignalKind::Bearish => close_l > close_e && rsi_l <= rsi_e - delta,
        };
        if !diverges {
            return None;
        }

        let confirmations = self.confirmations(kind, input, later);
        let strength = classify(&self.config, &confirmations)?;

        let (price_move, rsi_move) = match kind {
            SignalKind::Bullish => ("lower low", "higher low"),
            SignalKind::Bearish => ("higher high", "lower high"),
        };
        let label = match kind {
            SignalKind::Bullish => "Bullish",
            SignalKind::Bearish => "Bearish",
        };
        let mut reason = format!(
            "{label} divergence: price {price_move} ({close_e:.2} -> {close_l:.2}) and RSI {rsi_move} ({rsi_e:.2} -> {rsi_l:.2})."
        );
        if !confirmations.is_empty() {
            let names: Vec<&str> = confirmations.iter().map(Confirmation::as_str).collect();
            reason.push_str(&format!(" Confirmations: {}.", names.join(", ")));
        }

        Some(DivergenceSignal {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            kind,
            strength,
            confirmations,
            earlier_pivot: earlier,
            later_pivot: later,
            pivot_timestamp: input.timestamps[later],
            reason,
        })
    }

    /// Confirmations at the last index, in `macd`, `kdj` order.
    fn confirmations(
        &self,
        kind: SignalKind,
        input: &DivergenceInput<'_>,
        later: usize,
    ) -> Vec<Confirmation> {
        let mut confirmations = Vec::new();
        let Some(last) = input.closes.len().checked_sub(1) else {
            return confirmations;
        };
        if last < later || last < 1 {
            return confirmations;
        }

        if self.config.use_macd
            && let Some(macd) = &input.macd
            && macd_confirms(kind, macd, last)
        {
            confirmations.push(Confirmation::Macd);
        }
        if self.config.use_kdj
            && let Some(kdj) = &input.kdj
            && kdj_confirms(kind, kdj, last)
        {
            confirmations.push(Confirmation::Kdj);
        }
        confirmations
    }
}

/// Most recent later pivot, paired with the nearest earlier pivot whose
/// separation lies in `[min_sep, max_sep]`.
fn select_pair(pivots: &[usize], min_sep: usize, max_sep: usize) -> Option<(usize, usize)> {
    for (pos, &later) in pivots.iter().enumerate().rev() {
        for &earlier in pivots[..pos].iter().rev() {
            let separation = later - earlier;
            if (min_sep..=max_sep).contains(&separation) {
                return Some((earlier, later));
            }
        }
    }
    None
}

fn macd_confirms(kind: SignalKind, macd: &MacdView<'_>, last: usize) -> bool {
    let (Some(hist), Some(hist_prev), Some(line), Some(signal)) = (
        macd.histogram[last],
        macd.histogram[last - 1],
        macd.line[last],
        macd.signal[last],
    ) else {
        return false;
    };
    match kind {
        SignalKind::Bullish => hist > hist_prev || line > signal,
        SignalKind::Bearish => hist < hist_prev || line < signal,
    }
}

fn kdj_confirms(kind: SignalKind, kdj: &KdjView<'_>, last: usize) -> bool {
    let (Some(k), Some(k_prev), Some(d), Some(d_prev)) =
        (kdj.k[last], kdj.k[last - 1], kdj.d[last], kdj.d[last - 1])
    else {
        return false;
    };
    match kind {
        SignalKind::Bullish => {
            let cross_up = k_prev <= d_prev && k > d;
            let rising_oversold = k > k_prev && d > d_prev && k < KDJ_OVERSOLD && d < KDJ_OVERSOLD;
            cross_up || rising_oversold
        }
        SignalKind::Bearish => {
            let cross_down = k_prev >= d_prev && k < d;
            let falling_overbought =
                k < k_prev && d < d_prev && k > KDJ_OVERBOUGHT && d > KDJ_OVERBOUGHT;
            cross_down || falling_overbought
        }
    }
}

/// Maps fired confirmations to a strength, or `None` when gated out.
///
/// With `require_both_confirmations`, every *enabled* confirmation must
/// fire; a single enabled confirmation that fires yields `Strong`.
fn classify(config: &DivergenceConfig, confirmations: &[Confirmation]) -> Option<Strength> {
    if !config.confirmations_enabled() {
        return Some(Strength::Normal);
    }

    let has_macd = confirmations.contains(&Confirmation::Macd);
    let has_kdj = confirmations.contains(&Confirmation::Kdj);

    if config.require_both_confirmations {
        let macd_ok = !config.use_macd || has_macd;
        let kdj_ok = !config.use_kdj || has_kdj;
        return (macd_ok && kdj_ok).then_some(Strength::Strong);
    }

    if has_macd && has_kdj {
        Some(Strength::Strong)
    } else if has_macd || has_kdj {
        Some(Strength::Normal)
    } else {
        None
    }
}
