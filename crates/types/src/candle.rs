use chrono::{DateTime, FixedOffset, Utc};

/// Raw provider bar (e.g. one minute), as delivered by REST or the stream.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bar {
    /// Ticker symbol
    pub symbol: String,
    /// Bar start time (UTC)
    pub timestamp: DateTime<Utc>,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: f64,
}

/// Aggregated OHLCV candle for one timeframe bucket.
/// `timestamp` is the bucket **start**, localized to the configured zone.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    /// Ticker symbol
    pub symbol: String,
    /// Timeframe label (e.g. "10m")
    pub timeframe: String,
    /// Bucket start with explicit UTC offset
    pub timestamp: DateTime<FixedOffset>,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: f64,
}

impl Candle {
    /// Builds a candle directly from a bar that already has the target
    /// granularity (used for provider backfill).
    #[must_use]
    pub fn from_bar(bar: &Bar, timeframe: &str, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            symbol: bar.symbol.clone(),
            timeframe: timeframe.to_string(),
            timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}
