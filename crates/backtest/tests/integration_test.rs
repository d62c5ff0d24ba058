//! Integration tests for the backtest engine.
//!
//! Tests cover:
//! - Walk-forward acceptance timing and dedup
//! - Equivalence with evaluating every prefix from scratch
//! - Determinism of the full report
//! - Config error categories

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use divmon_backtest::{BacktestError, WalkForward, replay, run_backtest_from_json};
use divmon_strategy::{evaluate, signal_key};
use divmon_types::{BacktestConfig, Candle, DivergenceConfig, EvaluationConfig, SignalKind};

// ============================================================================
// FIXTURES
// ============================================================================

fn start() -> DateTime<FixedOffset> {
    FixedOffset::west_opt(5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 1, 5, 9, 30, 0)
        .unwrap()
}

/// Sine wave with a linear drift; a negative drift gives lower lows.
fn wave(symbol: &str, len: usize, drift: f64) -> Vec<Candle> {
    (0..len)
        .map(|i| {
            let x = i as f64;
            let close = 100.0 + 5.0 * (x * 0.5).sin() + drift * x;
            Candle {
                symbol: symbol.to_string(),
                timeframe: "10m".to_string(),
                timestamp: start() + Duration::minutes(10 * i as i64),
                open: close,
                high: close + 0.3,
                low: close - 0.3,
                close,
                volume: 1_000.0,
            }
        })
        .collect()
}

fn permissive(divergence: DivergenceConfig) -> EvaluationConfig {
    EvaluationConfig {
        divergence: DivergenceConfig {
            min_rsi_delta: -100.0,
            ..divergence
        },
        ..EvaluationConfig::default()
    }
}

fn permissive_backtest() -> BacktestConfig {
    BacktestConfig {
        evaluation: permissive(DivergenceConfig::confirmed()),
        ..BacktestConfig::default()
    }
}

/// Reference replay: evaluates every prefix from scratch.
fn oracle(symbol: &str, candles: &[Candle], config: &EvaluationConfig) -> Vec<(usize, String)> {
    let mut seen = HashSet::new();
    let mut accepted = Vec::new();
    for n in 0..candles.len() {
        let Some(signal) = evaluate(symbol, "10m", &candles[..=n], config).unwrap() else {
            continue;
        };
        if n != signal.later_pivot + config.divergence.pivot_right {
            continue;
        }
        let id = signal_key(&signal);
        if seen.insert(id.clone()) {
            accepted.push((n, id));
        }
    }
    accepted
}

// ============================================================================
// WALK-FORWARD TESTS
// ============================================================================

#[test]
fn test_walk_forward_matches_prefix_evaluation() {
    let candles = wave("SMCI", 160, -0.1);
    let config = permissive(DivergenceConfig::default());

    let mut walk = WalkForward::new(&config).unwrap();
    let accepted: Vec<(usize, String)> = walk
        .run_symbol("SMCI", "10m", &candles)
        .unwrap()
        .into_iter()
        .map(|a| (a.candle_index, a.id))
        .collect();

    assert!(!accepted.is_empty());
    assert_eq!(accepted, oracle("SMCI", &candles, &config));
}

#[test]
fn test_walk_forward_matches_prefix_evaluation_with_confirmations() {
    let candles = wave("SMCI", 160, 0.1);
    let config = permissive(DivergenceConfig::confirmed());

    let mut walk = WalkForward::new(&config).unwrap();
    let accepted: Vec<(usize, String)> = walk
        .run_symbol("SMCI", "10m", &candles)
        .unwrap()
        .into_iter()
        .map(|a| (a.candle_index, a.id))
        .collect();

    assert_eq!(accepted, oracle("SMCI", &candles, &config));
}

#[test]
fn test_rising_wave_yields_bearish_signals() {
    let candles = wave("SMCI", 200, 0.1);
    let mut walk = WalkForward::new(&permissive(DivergenceConfig::default())).unwrap();
    let accepted = walk.run_symbol("SMCI", "10m", &candles).unwrap();

    assert!(!accepted.is_empty());
    assert!(accepted.iter().all(|a| a.signal.kind == SignalKind::Bearish));
    assert!(
        accepted
            .iter()
            .all(|a| a.candle_index == a.signal.later_pivot + 3)
    );
}

#[test]
fn test_rerun_on_same_replay_accepts_nothing() {
    let candles = wave("SMCI", 200, -0.1);
    let mut walk = WalkForward::new(&permissive(DivergenceConfig::default())).unwrap();
    assert!(!walk.run_symbol("SMCI", "10m", &candles).unwrap().is_empty());
    assert!(walk.run_symbol("SMCI", "10m", &candles).unwrap().is_empty());
}

// ============================================================================
// REPORT TESTS
// ============================================================================

#[test]
fn test_replay_report_is_consistent() {
    let mut candles = BTreeMap::new();
    candles.insert("AAPL".to_string(), wave("AAPL", 200, 0.1));
    candles.insert("SMCI".to_string(), wave("SMCI", 200, -0.1));

    let report = replay(&candles, &permissive_backtest()).unwrap();

    assert_eq!(report.summary.symbols, 2);
    assert_eq!(report.summary.candles_processed, 400);
    assert_eq!(report.summary.first_candle, Some(start()));

    let rsi_only_total: usize = report.rsi_only_signals.values().map(Vec::len).sum();
    assert_eq!(report.summary.rsi_only_signals.total, rsi_only_total);
    assert!(rsi_only_total > 0);
    assert!(
        report.rsi_only_signals["SMCI"]
            .iter()
            .all(|a| a.signal.confirmations.is_empty())
    );

    for accepted in report.signals.values().flatten() {
        let ids: usize = report
            .signals
            .values()
            .flatten()
            .filter(|other| other.id == accepted.id)
            .count();
        assert_eq!(ids, 1);
    }

    assert_eq!(report.portfolio.len(), 2);
    assert_eq!(report.rsi_only_portfolio.len(), 2);
    assert_eq!(report.accuracy.horizons, vec![3, 6]);
}

#[test]
fn test_replay_is_deterministic() {
    let mut candles = BTreeMap::new();
    candles.insert("SMCI".to_string(), wave("SMCI", 200, -0.1));

    let first = replay(&candles, &permissive_backtest()).unwrap();
    let second = replay(&candles, &permissive_backtest()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

// ============================================================================
// CONFIG VALIDATION TESTS
// ============================================================================

#[test]
fn test_config_validation_bad_timeframe() {
    let result = run_backtest_from_json(r#"{"timeframe": "90m"}"#, &BTreeMap::new());
    let err = result.unwrap_err();
    assert_eq!(err.error_category(), "config");
}

#[test]
fn test_config_validation_zero_pivot_window() {
    let config = r#"{"evaluation": {"divergence": {"pivot_left": 0}}}"#;
    let err = run_backtest_from_json(config, &BTreeMap::new()).unwrap_err();
    assert!(
        matches!(err, BacktestError::ConfigValidation(_)),
        "Expected validation error, got: {err:?}"
    );
}

#[test]
fn test_config_validation_zero_horizon() {
    let config = r#"{"accuracy_horizons": [0]}"#;
    let err = run_backtest_from_json(config, &BTreeMap::new()).unwrap_err();
    assert!(err.is_config_error());
}
