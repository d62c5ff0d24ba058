//! Streaming bar-to-candle aggregation.
//!
//! The aggregator is modelled as an explicit value state plus a pure
//! transition ([`update`]). [`CandleAggregator`] wraps the state for
//! callers (one per symbol and timeframe) that own it exclusively.
//!
//! Precondition: bars for one symbol arrive in non-decreasing timestamp
//! order. Out-of-order bars are not detected and give undefined buckets.

use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};
use chrono_tz::Tz;
use divmon_types::{Bar, Candle, Timeframe};

use crate::error::DataError;

/// Static parameters of one aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationContext {
    /// Symbol the aggregator accepts
    pub symbol: String,
    /// Bucket width
    pub timeframe: Timeframe,
    /// Zone used to localise bucket starts
    pub timezone: Tz,
}

impl AggregationContext {
    /// Creates a new context.
    #[must_use]
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, timezone: Tz) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            timezone,
        }
    }
}

/// Aggregator state: either nothing open yet, or one open candle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AggregatorState {
    /// No bar seen since creation or the last finalize
    #[default]
    NoCandle,
    /// Candle for the current bucket, still open
    Accumulating(Candle),
}

/// Localises `timestamp` and floors it to the start of its bucket.
///
/// The minute of hour is floored to a multiple of the timeframe width;
/// seconds and sub-seconds are zeroed.
#[must_use]
pub fn bucket_start(
    timestamp: DateTime<Utc>,
    timeframe: Timeframe,
    timezone: Tz,
) -> DateTime<FixedOffset> {
    let local = timestamp.with_timezone(&timezone);
    let excess_minutes = local.minute() % timeframe.minutes();
    let floored = local
        - Duration::minutes(i64::from(excess_minutes))
        - Duration::seconds(i64::from(local.second()))
        - Duration::nanoseconds(i64::from(local.nanosecond()));
    floored.fixed_offset()
}

/// Pure transition: folds one bar into the state.
///
/// Returns the next state and the candle closed by this bar, if any.
/// The bar's symbol is not checked here; see [`CandleAggregator::push`].
#[must_use]
pub fn update(
    state: AggregatorState,
    bar: &Bar,
    ctx: &AggregationContext,
) -> (AggregatorState, Option<Candle>) {
    let start = bucket_start(bar.timestamp, ctx.timeframe, ctx.timezone);
    let label = ctx.timeframe.label();

    match state {
        AggregatorState::NoCandle => (
            AggregatorState::Accumulating(Candle::from_bar(bar, &label, start)),
            None,
        ),
        AggregatorState::Accumulating(open) if start > open.timestamp => (
            AggregatorState::Accumulating(Candle::from_bar(bar, &label, start)),
            Some(open),
        ),
        AggregatorState::Accumulating(mut open) => {
            open.high = open.high.max(bar.high);
            open.low = open.low.min(bar.low);
            open.close = bar.close;
            open.volume += bar.volume;
            (AggregatorState::Accumulating(open), None)
        }
    }
}

/// Owned aggregator for one (symbol, timeframe).
#[derive(Debug, Clone)]
pub struct CandleAggregator {
    ctx: AggregationContext,
    state: AggregatorState,
}

impl CandleAggregator {
    /// Creates an aggregator with no open candle.
    #[must_use]
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, timezone: Tz) -> Self {
        Self {
            ctx: AggregationContext::new(symbol, timeframe, timezone),
            state: AggregatorState::NoCandle,
        }
    }

    /// Symbol this aggregator accepts
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.ctx.symbol
    }

    /// Aggregation parameters
    #[must_use]
    pub fn context(&self) -> &AggregationContext {
        &self.ctx
    }

    /// The candle currently being accumulated
    #[must_use]
    pub fn current(&self) -> Option<&Candle> {
        match &self.state {
            AggregatorState::NoCandle => None,
            AggregatorState::Accumulating(candle) => Some(candle),
        }
    }

    /// Pushes one bar; returns the candle it closed, if any.
    ///
    /// # Errors
    /// Returns [`DataError::SymbolMismatch`] if the bar belongs to another
    /// symbol. The state is left untouched in that case.
    pub fn push(&mut self, bar: &Bar) -> Result<Option<Candle>, DataError> {
        if bar.symbol != self.ctx.symbol {
            tracing::warn!(
                expected = %self.ctx.symbol,
                got = %bar.symbol,
                "Rejecting bar for another symbol"
            );
            return Err(DataError::symbol_mismatch(&self.ctx.symbol, &bar.symbol));
        }
        let (next, closed) = update(std::mem::take(&mut self.state), bar, &self.ctx);
        self.state = next;
        Ok(closed)
    }

    /// Returns the still-open candle and resets to [`AggregatorState::NoCandle`].
    ///
    /// Only meaningful for historical aggregation; a live stream never
    /// finalizes its trailing partial bucket.
    pub fn finalize(&mut self) -> Option<Candle> {
        match std::mem::take(&mut self.state) {
            AggregatorState::NoCandle => None,
            AggregatorState::Accumulating(candle) => Some(candle),
        }
    }
}

/// Folds a bar list into candles, including the finalized trailing bucket.
///
/// # Errors
/// Returns [`DataError::SymbolMismatch`] if any bar belongs to another symbol.
pub fn aggregate_bars(
    symbol: &str,
    bars: &[Bar],
    timeframe: Timeframe,
    timezone: Tz,
) -> Result<Vec<Candle>, DataError> {
    let mut aggregator = CandleAggregator::new(symbol, timeframe, timezone);
    let mut candles = Vec::with_capacity(bars.len() / timeframe.minutes() as usize + 1);
    for bar in bars {
        if let Some(closed) = aggregator.push(bar)? {
            candles.push(closed);
        }
    }
    candles.extend(aggregator.finalize());
    Ok(candles)
}
