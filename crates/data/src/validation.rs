//! Candle validation helpers.

use crate::error::DataError;
use divmon_types::Candle;

/// Validates a candle sequence before it is persisted or replayed.
///
/// # Errors
/// - [`DataError::EmptyData`] when `candles` is empty.
/// - [`DataError::CorruptData`] on non-finite values, negative volume,
///   inconsistent OHLC or non-increasing timestamps.
pub fn validate_candles(candles: &[Candle]) -> Result<(), DataError> {
    if candles.is_empty() {
        return Err(DataError::EmptyData);
    }

    for (i, candle) in candles.iter().enumerate() {
        if !candle.open.is_finite()
            || !candle.high.is_finite()
            || !candle.low.is_finite()
            || !candle.close.is_finite()
            || !candle.volume.is_finite()
        {
            return Err(DataError::CorruptData(format!(
                "NaN/Inf at index {i}: {candle:?}"
            )));
        }

        if candle.volume < 0.0 {
            return Err(DataError::CorruptData(format!(
                "Negative volume at index {i}: {}",
                candle.volume
            )));
        }

        if candle.low > candle.open
            || candle.low > candle.close
            || candle.high < candle.open
            || candle.high < candle.close
        {
            return Err(DataError::CorruptData(format!(
                "Invalid OHLC at index {i}: low={}, high={}, open={}, close={}",
                candle.low, candle.high, candle.open, candle.close
            )));
        }

        if i > 0 && candle.timestamp <= candles[i - 1].timestamp {
            return Err(DataError::CorruptData(format!(
                "Non-monotonic timestamp at index {i}: {} <= {}",
                candle.timestamp,
                candles[i - 1].timestamp
            )));
        }
    }

    Ok(())
}
