//! High-level backtest runner helpers.

use std::collections::BTreeMap;

use divmon_data::aggregate_bars;
use divmon_types::{BacktestConfig, Bar, Candle, parse_timezone};

use crate::engine::BacktestEngine;
use crate::error::BacktestError;

/// Aggregates provider bars into candles using the configured timeframe and
/// zone. Symbols whose bars produce no candles keep an empty series.
///
/// # Errors
/// - [`BacktestError::ConfigValidation`] for an unknown timezone.
/// - [`BacktestError::Data`] when a bar belongs to another symbol.
pub fn aggregate_history(
    bars_by_symbol: &BTreeMap<String, Vec<Bar>>,
    config: &BacktestConfig,
) -> Result<BTreeMap<String, Vec<Candle>>, BacktestError> {
    let timezone = parse_timezone(&config.timezone)?;
    let mut candles_by_symbol = BTreeMap::new();
    for (symbol, bars) in bars_by_symbol {
        let candles = aggregate_bars(symbol, bars, config.timeframe, timezone)?;
        tracing::debug!(symbol, bars = bars.len(), candles = candles.len(), "Aggregated history");
        candles_by_symbol.insert(symbol.clone(), candles);
    }
    Ok(candles_by_symbol)
}

/// Main entry point: receives config JSON and raw bars, returns report JSON.
///
/// # Errors
/// - [`BacktestError::ConfigParse`] when JSON parsing fails.
/// - [`BacktestError::ConfigValidation`] for invalid configuration values.
/// - Any errors from aggregation or replay.
pub fn run_backtest_from_json(
    config_json: &str,
    bars_by_symbol: &BTreeMap<String, Vec<Bar>>,
) -> Result<String, BacktestError> {
    let config = BacktestConfig::from_json(config_json)?;
    let candles_by_symbol = aggregate_history(bars_by_symbol, &config)?;

    let engine = BacktestEngine::new(config)?;
    let report = engine.run(&candles_by_symbol)?;

    serde_json::to_string(&report).map_err(|e| BacktestError::ResultSerialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn minute_bars(symbol: &str, count: usize) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2026, 1, 5, 14, 30, 0).unwrap();
        (0..count)
            .map(|i| Bar {
                symbol: symbol.to_string(),
                timestamp: start + Duration::minutes(i as i64),
                open: 10.0,
                high: 10.5,
                low: 9.5,
                close: 10.0,
                volume: 100.0,
            })
            .collect()
    }

    #[test]
    fn test_aggregate_history_uses_timeframe() {
        let mut bars = BTreeMap::new();
        bars.insert("SMCI".to_string(), minute_bars("SMCI", 30));
        let candles = aggregate_history(&bars, &BacktestConfig::default()).unwrap();
        assert_eq!(candles["SMCI"].len(), 3);
        assert_eq!(candles["SMCI"][0].timeframe, "10m");
        assert!((candles["SMCI"][0].volume - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_history_rejects_foreign_bars() {
        let mut bars = BTreeMap::new();
        bars.insert("SMCI".to_string(), minute_bars("AAPL", 5));
        let err = aggregate_history(&bars, &BacktestConfig::default()).unwrap_err();
        assert_eq!(err.error_category(), "market_data");
    }

    #[test]
    fn test_run_from_json_parse_error() {
        let err = run_backtest_from_json("{not json", &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, BacktestError::ConfigParse(_)));
    }

    #[test]
    fn test_run_from_json_unknown_timezone() {
        let err = run_backtest_from_json(r#"{"timezone": "Mars/Olympus"}"#, &BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, BacktestError::ConfigValidation(_)));
    }

    #[test]
    fn test_run_from_json_returns_report() {
        let mut bars = BTreeMap::new();
        bars.insert("SMCI".to_string(), minute_bars("SMCI", 600));
        let json = run_backtest_from_json("{}", &bars).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["candles_processed"], 60);
        assert!(value["signals"]["SMCI"].as_array().unwrap().is_empty());
    }
}
