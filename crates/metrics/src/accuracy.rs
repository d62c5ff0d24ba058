//! Directional forward-return accuracy of replayed signals.

use std::collections::BTreeMap;

use divmon_types::{Candle, Confirmation, SignalEvent, SignalKind};
use serde::{Deserialize, Serialize};

/// Confirmation set a signal fired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfirmationBucket {
    /// Every signal regardless of confirmations
    #[serde(rename = "all")]
    All,
    /// MACD and KDJ
    #[serde(rename = "macd+kdj")]
    MacdKdj,
    /// MACD without KDJ
    #[serde(rename = "macd_only")]
    MacdOnly,
    /// KDJ without MACD
    #[serde(rename = "kdj_only")]
    KdjOnly,
    /// No confirmation
    #[serde(rename = "none")]
    Unconfirmed,
}

impl ConfirmationBucket {
    /// Wire name, e.g. `macd+kdj`
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::MacdKdj => "macd+kdj",
            Self::MacdOnly => "macd_only",
            Self::KdjOnly => "kdj_only",
            Self::Unconfirmed => "none",
        }
    }

    /// Bucket for a confirmation list.
    #[must_use]
    pub fn of(confirmations: &[Confirmation]) -> Self {
        let macd = confirmations.contains(&Confirmation::Macd);
        let kdj = confirmations.contains(&Confirmation::Kdj);
        match (macd, kdj) {
            (true, true) => Self::MacdKdj,
            (true, false) => Self::MacdOnly,
            (false, true) => Self::KdjOnly,
            (false, false) => Self::Unconfirmed,
        }
    }
}

impl std::fmt::Display for ConfirmationBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of directional returns in one (kind, bucket, horizon) cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccuracyStats {
    /// Number of returns
    pub count: usize,
    /// Share of returns > 0
    pub hit_rate: f64,
    /// Mean return
    pub mean_return: f64,
    /// Median return
    pub median_return: f64,
}

impl AccuracyStats {
    /// Summarises a return sample. Empty samples give all zeros.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_returns(returns: &[f64]) -> Self {
        if returns.is_empty() {
            return Self::default();
        }
        let count = returns.len();
        let n = count as f64;
        let hits = returns.iter().filter(|r| **r > 0.0).count();

        let mut sorted = returns.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = count / 2;
        let median_return = if count % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Self {
            count,
            hit_rate: hits as f64 / n,
            mean_return: returns.iter().sum::<f64>() / n,
            median_return,
        }
    }
}

/// Accuracy cells keyed kind → bucket → horizon.
pub type AccuracyTable =
    BTreeMap<SignalKind, BTreeMap<ConfirmationBucket, BTreeMap<usize, AccuracyStats>>>;

/// Forward-return accuracy for a set of replayed events.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccuracyReport {
    /// Horizons (in candles) that were evaluated
    pub horizons: Vec<usize>,
    /// Stats per kind, bucket and horizon; empty cells are omitted
    pub stats: AccuracyTable,
}

impl AccuracyReport {
    /// Looks up one cell.
    #[must_use]
    pub fn get(
        &self,
        kind: SignalKind,
        bucket: ConfirmationBucket,
        horizon: usize,
    ) -> Option<&AccuracyStats> {
        self.stats.get(&kind)?.get(&bucket)?.get(&horizon)
    }
}

/// Directional return from `entry` to `exit`: long for bullish, short for
/// bearish.
#[must_use]
pub fn directional_return(kind: SignalKind, entry: f64, exit: f64) -> f64 {
    match kind {
        SignalKind::Bullish => (exit - entry) / entry,
        SignalKind::Bearish => (entry - exit) / entry,
    }
}

/// Computes accuracy over every event whose symbol has candles.
///
/// Entry is the close at the pivot index. A horizon `h` contributes only
/// when `pivot + h` is inside the series. Each return is recorded in the
/// event's confirmation bucket and in [`ConfirmationBucket::All`].
#[must_use]
pub fn compute_accuracy(
    candles_by_symbol: &BTreeMap<String, Vec<Candle>>,
    events_by_symbol: &BTreeMap<String, Vec<SignalEvent>>,
    horizons: &[usize],
) -> AccuracyReport {
    let mut samples: BTreeMap<(SignalKind, ConfirmationBucket, usize), Vec<f64>> = BTreeMap::new();

    for (symbol, events) in events_by_symbol {
        let Some(candles) = candles_by_symbol.get(symbol) else {
            continue;
        };
        for event in events {
            let Some(entry) = candles.get(event.pivot_index).map(|c| c.close) else {
                continue;
            };
            if entry <= 0.0 {
                continue;
            }
            let bucket = ConfirmationBucket::of(&event.confirmations);
            for &horizon in horizons {
                let Some(exit) = candles.get(event.pivot_index + horizon).map(|c| c.close) else {
                    continue;
                };
                let ret = directional_return(event.kind, entry, exit);
                samples
                    .entry((event.kind, bucket, horizon))
                    .or_default()
                    .push(ret);
                samples
                    .entry((event.kind, ConfirmationBucket::All, horizon))
                    .or_default()
                    .push(ret);
            }
        }
    }

    let mut stats = AccuracyTable::new();
    for ((kind, bucket, horizon), returns) in samples {
        stats
            .entry(kind)
            .or_default()
            .entry(bucket)
            .or_default()
            .insert(horizon, AccuracyStats::from_returns(&returns));
    }

    AccuracyReport {
        horizons: horizons.to_vec(),
        stats,
    }
}
