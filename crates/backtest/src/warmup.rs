//! Warmup helpers.

/// First candle index at which a history of `min_history` candles exists.
#[must_use]
pub fn first_evaluation_index(min_history: usize) -> usize {
    min_history.saturating_sub(1)
}

/// Logs the evaluation window of one symbol and returns the number of
/// evaluation steps.
///
/// Short histories are not an error: they simply produce no steps.
pub fn log_warmup(symbol: &str, len: usize, min_history: usize) -> usize {
    let steps = len.saturating_sub(first_evaluation_index(min_history));
    if steps == 0 {
        tracing::warn!(
            "{symbol}: {len} candles, fewer than the {min_history} required; nothing to replay"
        );
    } else {
        tracing::info!(
            "Starting replay for {symbol}: {} candles ({} warmup, {} evaluated)",
            len,
            len - steps,
            steps
        );
    }
    steps
}
