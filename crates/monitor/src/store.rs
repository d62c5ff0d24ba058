//! In-memory candle and sent-signal store.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, FixedOffset, Utc};
use divmon_types::{Candle, SignalKind};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::collaborators::{CandleRepository, SignalStore};
use crate::error::StoreError;

/// One published signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentRecord {
    /// Ticker symbol
    pub symbol: String,
    /// Timeframe label
    pub timeframe: String,
    /// Signal direction
    pub kind: SignalKind,
    /// Wall-clock time of publication
    pub sent_at: DateTime<Utc>,
}

type SeriesKey = (String, String);

#[derive(Debug, Default)]
struct StoreInner {
    candles: BTreeMap<SeriesKey, BTreeMap<DateTime<FixedOffset>, Candle>>,
    sent: BTreeMap<String, SentRecord>,
    claimed: BTreeSet<String>,
}

/// Candle table and sent-signal table behind a single lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored candles for a series.
    #[must_use]
    pub fn candle_count(&self, symbol: &str, timeframe: &str) -> usize {
        let key = (symbol.to_string(), timeframe.to_string());
        self.inner.lock().candles.get(&key).map_or(0, BTreeMap::len)
    }

    /// Number of published signals.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.inner.lock().sent.len()
    }

    /// Record for a published signal id.
    #[must_use]
    pub fn sent_record(&self, id: &str) -> Option<SentRecord> {
        self.inner.lock().sent.get(id).cloned()
    }
}

impl CandleRepository for MemoryStore {
    fn upsert_candles(&self, candles: &[Candle]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        for candle in candles {
            inner
                .candles
                .entry((candle.symbol.clone(), candle.timeframe.clone()))
                .or_default()
                .insert(candle.timestamp, candle.clone());
        }
        Ok(())
    }

    fn get_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, StoreError> {
        let key = (symbol.to_string(), timeframe.to_string());
        let inner = self.inner.lock();
        let Some(series) = inner.candles.get(&key) else {
            return Ok(Vec::new());
        };
        let skip = series.len().saturating_sub(limit);
        Ok(series.values().skip(skip).cloned().collect())
    }
}

impl SignalStore for MemoryStore {
    fn has_sent(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.inner.lock().sent.contains_key(id))
    }

    fn try_reserve(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock();
        if inner.sent.contains_key(id) {
            return Ok(false);
        }
        Ok(inner.claimed.insert(id.to_string()))
    }

    fn release(&self, id: &str) -> Result<(), StoreError> {
        self.inner.lock().claimed.remove(id);
        Ok(())
    }

    fn mark_sent(
        &self,
        id: &str,
        symbol: &str,
        timeframe: &str,
        kind: SignalKind,
    ) -> Result<(), StoreError> {
        let record = SentRecord {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            kind,
            sent_at: Utc::now(),
        };
        let mut inner = self.inner.lock();
        inner.claimed.remove(id);
        inner.sent.entry(id.to_string()).or_insert(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn candle(minute: i64, close: f64) -> Candle {
        let start = FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 5, 9, 30, 0)
            .unwrap();
        Candle {
            symbol: "SMCI".to_string(),
            timeframe: "10m".to_string(),
            timestamp: start + Duration::minutes(minute),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn test_get_candles_returns_most_recent_ascending() {
        let store = MemoryStore::new();
        store
            .upsert_candles(&[candle(20, 3.0), candle(0, 1.0), candle(10, 2.0), candle(30, 4.0)])
            .unwrap();

        let candles = store.get_candles("SMCI", "10m", 2).unwrap();
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        assert_eq!(closes, [3.0, 4.0]);

        assert_eq!(store.get_candles("SMCI", "10m", 100).unwrap().len(), 4);
        assert!(store.get_candles("SMCI", "5m", 100).unwrap().is_empty());
    }

    #[test]
    fn test_upsert_replaces_same_bucket() {
        let store = MemoryStore::new();
        store.upsert_candles(&[candle(0, 1.0)]).unwrap();
        store.upsert_candles(&[candle(0, 9.0)]).unwrap();
        assert_eq!(store.candle_count("SMCI", "10m"), 1);
        assert_eq!(store.get_candles("SMCI", "10m", 1).unwrap()[0].close, 9.0);
    }

    #[test]
    fn test_sent_table() {
        let store = MemoryStore::new();
        assert!(!store.has_sent("abc").unwrap());
        store.mark_sent("abc", "SMCI", "10m", SignalKind::Bullish).unwrap();
        assert!(store.has_sent("abc").unwrap());
        assert_eq!(store.sent_count(), 1);
        assert_eq!(store.sent_record("abc").unwrap().kind, SignalKind::Bullish);
    }

    #[test]
    fn test_reserve_is_exclusive_until_released() {
        let store = MemoryStore::new();
        assert!(store.try_reserve("abc").unwrap());
        assert!(!store.try_reserve("abc").unwrap());

        store.release("abc").unwrap();
        assert!(store.try_reserve("abc").unwrap());

        store.mark_sent("abc", "SMCI", "10m", SignalKind::Bearish).unwrap();
        assert!(!store.try_reserve("abc").unwrap());
        store.release("abc").unwrap();
        assert!(!store.try_reserve("abc").unwrap());
        assert_eq!(store.sent_count(), 1);
    }
}
