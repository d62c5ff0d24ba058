//! External collaborators, expressed as traits.
//!
//! Real market-data clients, databases and webhook delivery live outside this
//! workspace; the monitor only talks to them through these seams.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use divmon_types::{Bar, Candle, SignalKind, Timeframe};
use tokio::sync::mpsc;

use crate::alert::AlertPayload;
use crate::error::{AlertError, ProviderError, StoreError};

/// Bars keyed by symbol.
pub type BarsBySymbol = BTreeMap<String, Vec<Bar>>;

/// Source of historical and streaming bars.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Most recent `limit` bars per symbol at `timeframe` granularity.
    ///
    /// # Errors
    /// Returns [`ProviderError`] when the request fails.
    async fn backfill(
        &self,
        symbols: &[String],
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<BarsBySymbol, ProviderError>;

    /// Bars per symbol in `[start, end)` at `timeframe` granularity.
    ///
    /// # Errors
    /// Returns [`ProviderError`] when the request fails.
    async fn get_range(
        &self,
        symbols: &[String],
        timeframe: Timeframe,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BarsBySymbol, ProviderError>;

    /// Streams bars into `bars` in arrival order until the connection
    /// closes. `Ok(())` is a clean close; a closed receiver should also end
    /// the stream cleanly. The future may be dropped at any await point.
    ///
    /// # Errors
    /// Returns [`ProviderError`] when the connection fails.
    async fn stream(&self, symbols: &[String], bars: mpsc::Sender<Bar>)
    -> Result<(), ProviderError>;
}

/// Candle persistence.
pub trait CandleRepository: Send + Sync {
    /// Inserts or replaces candles keyed by (symbol, timeframe, bucket start).
    ///
    /// # Errors
    /// Returns [`StoreError`] when the write fails.
    fn upsert_candles(&self, candles: &[Candle]) -> Result<(), StoreError>;

    /// Most recent `limit` candles, ascending by bucket start.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn get_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, StoreError>;
}

/// Record of published signal ids.
///
/// Deduplication is serialised by the store itself: [`SignalStore::try_reserve`]
/// claims an id under the store's lock, so every gate sharing one store sees
/// the same claims.
pub trait SignalStore: Send + Sync {
    /// True when `id` was already published.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the read fails.
    fn has_sent(&self, id: &str) -> Result<bool, StoreError>;

    /// Claims `id` for delivery. Returns `false` when it is already sent or
    /// claimed by another publisher.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the write fails.
    fn try_reserve(&self, id: &str) -> Result<bool, StoreError>;

    /// Drops a claim after a failed delivery so a later attempt may retry.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the write fails.
    fn release(&self, id: &str) -> Result<(), StoreError>;

    /// Records `id` as published and drops its claim.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the write fails.
    fn mark_sent(
        &self,
        id: &str,
        symbol: &str,
        timeframe: &str,
        kind: SignalKind,
    ) -> Result<(), StoreError>;
}

/// Alert destination.
pub trait AlertSink: Send + Sync {
    /// Delivers one alert.
    ///
    /// # Errors
    /// Returns [`AlertError`] when delivery fails.
    fn deliver(&self, payload: &AlertPayload) -> Result<(), AlertError>;
}
