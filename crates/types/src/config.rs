use std::str::FromStr;

use chrono_tz::Tz;

use crate::error::CoreError;
use crate::timeframe::Timeframe;

/// Parses an IANA time zone name (e.g. `America/Toronto`).
///
/// # Errors
/// Returns [`CoreError::Timezone`] for unknown names.
pub fn parse_timezone(name: &str) -> Result<Tz, CoreError> {
    Tz::from_str(name.trim()).map_err(|_| CoreError::Timezone(name.to_string()))
}

// ============================================
// INDICATORS
// ============================================

/// Indicator periods shared by live evaluation and replay
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IndicatorConfig {
    /// RSI period (Wilder)
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    /// MACD fast EMA period
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,
    /// MACD slow EMA period
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,
    /// MACD signal EMA period
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
    /// KDJ RSV lookback
    #[serde(default = "default_kdj_period")]
    pub kdj_period: usize,
    /// KDJ K smoothing
    #[serde(default = "default_kdj_smooth")]
    pub kdj_k_smooth: usize,
    /// KDJ D smoothing
    #[serde(default = "default_kdj_smooth")]
    pub kdj_d_smooth: usize,
}

fn default_rsi_period() -> usize {
    14
}
fn default_macd_fast() -> usize {
    12
}
fn default_macd_slow() -> usize {
    26
}
fn default_macd_signal() -> usize {
    9
}
fn default_kdj_period() -> usize {
    9
}
fn default_kdj_smooth() -> usize {
    3
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            kdj_period: default_kdj_period(),
            kdj_k_smooth: default_kdj_smooth(),
            kdj_d_smooth: default_kdj_smooth(),
        }
    }
}

impl IndicatorConfig {
    /// Validates periods.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] when a period is zero or `macd_fast >= macd_slow`.
    pub fn validate(&self) -> Result<(), CoreError> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("kdj_period", self.kdj_period),
            ("kdj_k_smooth", self.kdj_k_smooth),
            ("kdj_d_smooth", self.kdj_d_smooth),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(CoreError::Config(format!("indicators.{name} must be > 0")));
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(CoreError::Config(
                "indicators.macd_fast must be < indicators.macd_slow".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================
// DIVERGENCE
// ============================================

/// Divergence detection parameters.
///
/// `Default` is the RSI-only configuration; see [`DivergenceConfig::confirmed`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DivergenceConfig {
    /// Bars left of a pivot
    #[serde(default = "default_pivot_window")]
    pub pivot_left: usize,
    /// Bars right of a pivot (also the confirmation delay)
    #[serde(default = "default_pivot_window")]
    pub pivot_right: usize,
    /// Minimum bars between paired pivots
    #[serde(default = "default_min_sep_bars")]
    pub min_sep_bars: usize,
    /// Maximum bars between paired pivots
    #[serde(default = "default_max_sep_bars")]
    pub max_sep_bars: usize,
    /// Minimum RSI disagreement between pivots
    #[serde(default = "default_min_rsi_delta")]
    pub min_rsi_delta: f64,
    /// Require MACD corroboration
    #[serde(default)]
    pub use_macd: bool,
    /// Require KDJ corroboration
    #[serde(default)]
    pub use_kdj: bool,
    /// Emit only when every enabled confirmation fired
    #[serde(default)]
    pub require_both_confirmations: bool,
}

fn default_pivot_window() -> usize {
    3
}
fn default_min_sep_bars() -> usize {
    6
}
fn default_max_sep_bars() -> usize {
    60
}
fn default_min_rsi_delta() -> f64 {
    3.0
}

impl Default for DivergenceConfig {
    fn default() -> Self {
        Self {
            pivot_left: default_pivot_window(),
            pivot_right: default_pivot_window(),
            min_sep_bars: default_min_sep_bars(),
            max_sep_bars: default_max_sep_bars(),
            min_rsi_delta: default_min_rsi_delta(),
            use_macd: false,
            use_kdj: false,
            require_both_confirmations: false,
        }
    }
}

impl DivergenceConfig {
    /// Default windows with MACD and KDJ confirmation enabled.
    #[must_use]
    pub fn confirmed() -> Self {
        Self {
            use_macd: true,
            use_kdj: true,
            ..Self::default()
        }
    }

    /// Same windows with every confirmation disabled.
    #[must_use]
    pub fn rsi_only(&self) -> Self {
        Self {
            use_macd: false,
            use_kdj: false,
            require_both_confirmations: false,
            ..self.clone()
        }
    }

    /// True when at least one confirmation is enabled.
    #[must_use]
    pub fn confirmations_enabled(&self) -> bool {
        self.use_macd || self.use_kdj
    }

    /// Validates window sizes and thresholds.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] on zero windows, an inverted separation
    /// range or a non-finite RSI delta.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.pivot_left < 1 || self.pivot_right < 1 {
            return Err(CoreError::Config(
                "divergence.pivot_left and divergence.pivot_right must be >= 1".to_string(),
            ));
        }
        if self.min_sep_bars > self.max_sep_bars {
            return Err(CoreError::Config(
                "divergence.min_sep_bars must be <= divergence.max_sep_bars".to_string(),
            ));
        }
        if !self.min_rsi_delta.is_finite() {
            return Err(CoreError::Config(
                "divergence.min_rsi_delta must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_confirmed_divergence() -> DivergenceConfig {
    DivergenceConfig::confirmed()
}

/// Everything `evaluate` needs beyond the candle history
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EvaluationConfig {
    /// Indicator periods
    #[serde(default)]
    pub indicators: IndicatorConfig,
    /// Divergence parameters
    #[serde(default = "default_confirmed_divergence")]
    pub divergence: DivergenceConfig,
    /// Candles required before any evaluation
    #[serde(default = "default_min_history")]
    pub min_history: usize,
}

fn default_min_history() -> usize {
    50
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            indicators: IndicatorConfig::default(),
            divergence: default_confirmed_divergence(),
            min_history: default_min_history(),
        }
    }
}

impl EvaluationConfig {
    /// Copy of this configuration with confirmations disabled.
    #[must_use]
    pub fn rsi_only(&self) -> Self {
        Self {
            divergence: self.divergence.rsi_only(),
            ..self.clone()
        }
    }

    /// Validates indicator and divergence sections.
    ///
    /// # Errors
    /// Propagates [`CoreError::Config`] from the sections.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.indicators.validate()?;
        self.divergence.validate()
    }
}

// ============================================
// BACKTEST
// ============================================

/// Portfolio simulation parameters
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimulationConfig {
    /// Starting cash per symbol
    #[serde(default = "default_starting_cash")]
    pub starting_cash: f64,
    /// Fraction of cash spent on a bullish event
    #[serde(default = "default_trade_pct")]
    pub buy_pct: f64,
    /// Fraction of shares sold on a bearish event
    #[serde(default = "default_trade_pct")]
    pub sell_pct: f64,
}

fn default_starting_cash() -> f64 {
    1000.0
}
fn default_trade_pct() -> f64 {
    1.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            starting_cash: default_starting_cash(),
            buy_pct: default_trade_pct(),
            sell_pct: default_trade_pct(),
        }
    }
}

impl SimulationConfig {
    /// Validates cash and fractions.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] for negative cash or fractions outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.starting_cash.is_finite() || self.starting_cash < 0.0 {
            return Err(CoreError::Config(
                "simulation.starting_cash must be >= 0".to_string(),
            ));
        }
        for (name, value) in [("buy_pct", self.buy_pct), ("sell_pct", self.sell_pct)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::Config(format!(
                    "simulation.{name} must be within [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Main backtest configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BacktestConfig {
    /// IANA zone used to align candle buckets
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Candle timeframe
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
    /// Confirmed strategy; the RSI-only replay derives from it
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    /// Portfolio simulation
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Forward-return horizons (candles) for accuracy metrics
    #[serde(default = "default_accuracy_horizons")]
    pub accuracy_horizons: Vec<usize>,
}

fn default_timezone() -> String {
    "America/Toronto".to_string()
}
fn default_timeframe() -> Timeframe {
    Timeframe::DEFAULT
}
fn default_accuracy_horizons() -> Vec<usize> {
    vec![3, 6]
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            timeframe: default_timeframe(),
            evaluation: EvaluationConfig::default(),
            simulation: SimulationConfig::default(),
            accuracy_horizons: default_accuracy_horizons(),
        }
    }
}

impl BacktestConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    /// - [`CoreError::Json`] when JSON parsing fails.
    /// - [`CoreError::Config`] / [`CoreError::Timezone`] for invalid values.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all sections.
    ///
    /// # Errors
    /// Returns the first invalid section as a [`CoreError`].
    pub fn validate(&self) -> Result<(), CoreError> {
        parse_timezone(&self.timezone)?;
        self.evaluation.validate()?;
        self.simulation.validate()?;
        if self.accuracy_horizons.contains(&0) {
            return Err(CoreError::Config(
                "accuracy_horizons must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================
// LIVE MONITOR
// ============================================

/// Stream reconnect backoff
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReconnectConfig {
    /// First retry delay (ms), also the delay after a clean reconnect
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Delay cap (ms)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_initial_delay_ms() -> u64 {
    1_000
}
fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (overridden by `RUST_LOG`)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit ANSI colours
    #[serde(default)]
    pub ansi: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            ansi: false,
        }
    }
}

/// Live monitor configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MonitorConfig {
    /// IANA zone used to align candle buckets
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Candle timeframe
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
    /// Symbols to monitor
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Log alert payloads instead of delivering them
    #[serde(default)]
    pub dry_run: bool,
    /// Alert webhook (required unless `dry_run`)
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Candles loaded per evaluation
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Bars requested on startup backfill
    #[serde(default = "default_history_limit")]
    pub backfill_limit: usize,
    /// Log a heartbeat every N closed candles
    #[serde(default = "default_heartbeat_every")]
    pub heartbeat_every: u64,
    /// Strategy parameters
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    /// Stream reconnect policy
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_symbols() -> Vec<String> {
    vec!["SMCI".to_string()]
}
fn default_history_limit() -> usize {
    500
}
fn default_heartbeat_every() -> u64 {
    30
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            timeframe: default_timeframe(),
            symbols: default_symbols(),
            dry_run: false,
            webhook_url: None,
            history_limit: default_history_limit(),
            backfill_limit: default_history_limit(),
            heartbeat_every: default_heartbeat_every(),
            evaluation: EvaluationConfig::default(),
            reconnect: ReconnectConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

const ENV_TIMEZONE: &str = "DIVMON_TIMEZONE";
const ENV_TIMEFRAME: &str = "DIVMON_TIMEFRAME";
const ENV_SYMBOLS: &str = "DIVMON_SYMBOLS";
const ENV_DRY_RUN: &str = "DIVMON_DRY_RUN";
const ENV_WEBHOOK_URL: &str = "DIVMON_WEBHOOK_URL";

impl MonitorConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    /// - [`CoreError::Json`] when JSON parsing fails.
    /// - Any validation error from [`MonitorConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from `DIVMON_*` environment variables,
    /// falling back to defaults for anything unset.
    ///
    /// # Errors
    /// - [`CoreError::Timeframe`] for an unparsable `DIVMON_TIMEFRAME`.
    /// - Any validation error from [`MonitorConfig::validate`].
    pub fn from_env() -> Result<Self, CoreError> {
        let mut config = Self::default();

        if let Ok(tz) = std::env::var(ENV_TIMEZONE) {
            config.timezone = tz;
        }
        if let Ok(tf) = std::env::var(ENV_TIMEFRAME) {
            config.timeframe = tf
                .parse()
                .map_err(|e: crate::ParseTimeframeError| CoreError::Timeframe(e.to_string()))?;
        }
        if let Ok(symbols) = std::env::var(ENV_SYMBOLS) {
            config.symbols = parse_symbols(&symbols);
        }
        config.dry_run = std::env::var(ENV_DRY_RUN)
            .map(|v| parse_bool(&v))
            .unwrap_or(false);
        config.webhook_url = std::env::var(ENV_WEBHOOK_URL)
            .ok()
            .filter(|v| !v.trim().is_empty());

        config.validate()?;
        Ok(config)
    }

    /// Validates all sections.
    ///
    /// # Errors
    /// Returns the first invalid section as a [`CoreError`].
    pub fn validate(&self) -> Result<(), CoreError> {
        parse_timezone(&self.timezone)?;
        if self.symbols.is_empty() || self.symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(CoreError::Config("symbols must be non-empty".to_string()));
        }
        if !self.dry_run && self.webhook_url.is_none() {
            return Err(CoreError::Env(format!(
                "missing {ENV_WEBHOOK_URL} (or set {ENV_DRY_RUN}=true)"
            )));
        }
        if self.history_limit < self.evaluation.min_history {
            return Err(CoreError::Config(
                "history_limit must be >= evaluation.min_history".to_string(),
            ));
        }
        if self.reconnect.initial_delay_ms == 0
            || self.reconnect.initial_delay_ms > self.reconnect.max_delay_ms
        {
            return Err(CoreError::Config(
                "reconnect.initial_delay_ms must be > 0 and <= reconnect.max_delay_ms"
                    .to_string(),
            ));
        }
        self.evaluation.validate()
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

fn parse_symbols(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOAT_EPS: f64 = 1e-12;

    fn assert_f64_eq(left: f64, right: f64) {
        assert!((left - right).abs() < FLOAT_EPS);
    }

    #[test]
    fn test_divergence_config_defaults_are_rsi_only() {
        let config = DivergenceConfig::default();
        assert_eq!(config.pivot_left, 3);
        assert_eq!(config.pivot_right, 3);
        assert_eq!(config.min_sep_bars, 6);
        assert_eq!(config.max_sep_bars, 60);
        assert_f64_eq(config.min_rsi_delta, 3.0);
        assert!(!config.confirmations_enabled());
        assert!(DivergenceConfig::confirmed().confirmations_enabled());
    }

    #[test]
    fn test_rsi_only_keeps_windows() {
        let mut confirmed = DivergenceConfig::confirmed();
        confirmed.pivot_right = 5;
        confirmed.require_both_confirmations = true;
        let rsi_only = confirmed.rsi_only();
        assert_eq!(rsi_only.pivot_right, 5);
        assert!(!rsi_only.confirmations_enabled());
        assert!(!rsi_only.require_both_confirmations);
    }

    #[test]
    fn test_indicator_config_rejects_fast_not_below_slow() {
        let config = IndicatorConfig {
            macd_fast: 26,
            ..IndicatorConfig::default()
        };
        assert!(config.validate().is_err());

        let config = IndicatorConfig {
            kdj_period: 0,
            ..IndicatorConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("kdj_period"));
    }

    #[test]
    fn test_divergence_config_validation() {
        let config = DivergenceConfig {
            pivot_left: 0,
            ..DivergenceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DivergenceConfig {
            min_sep_bars: 10,
            max_sep_bars: 5,
            ..DivergenceConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(DivergenceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_backtest_config_from_json_defaults() {
        let config = BacktestConfig::from_json("{}").unwrap();
        assert_eq!(config.timezone, "America/Toronto");
        assert_eq!(config.timeframe.minutes(), 10);
        assert!(config.evaluation.divergence.use_macd);
        assert!(config.evaluation.divergence.use_kdj);
        assert_eq!(config.evaluation.min_history, 50);
        assert_f64_eq(config.simulation.starting_cash, 1000.0);
        assert_eq!(config.accuracy_horizons, vec![3, 6]);
    }

    #[test]
    fn test_backtest_config_rejects_bad_timezone() {
        let err = BacktestConfig::from_json(r#"{"timezone": "Mars/Olympus"}"#).unwrap_err();
        assert!(matches!(err, CoreError::Timezone(_)));
    }

    #[test]
    fn test_backtest_config_rejects_bad_timeframe() {
        let err = BacktestConfig::from_json(r#"{"timeframe": "2d"}"#).unwrap_err();
        assert!(matches!(err, CoreError::Json(_)));
    }

    #[test]
    fn test_simulation_config_rejects_fraction_above_one() {
        let config = SimulationConfig {
            buy_pct: 1.5,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_monitor_config_requires_webhook_unless_dry_run() {
        let err = MonitorConfig::from_json("{}").unwrap_err();
        assert!(matches!(err, CoreError::Env(_)));

        let config = MonitorConfig::from_json(r#"{"dry_run": true}"#).unwrap();
        assert_eq!(config.symbols, vec!["SMCI".to_string()]);
        assert_eq!(config.history_limit, 500);
        assert_eq!(config.reconnect.initial_delay_ms, 1_000);
        assert_eq!(config.reconnect.max_delay_ms, 30_000);
    }

    #[test]
    fn test_monitor_config_from_env() {
        temp_env::with_vars(
            [
                (ENV_TIMEZONE, Some("UTC")),
                (ENV_TIMEFRAME, Some("5m")),
                (ENV_SYMBOLS, Some("smci, aapl,,")),
                (ENV_DRY_RUN, Some("yes")),
                (ENV_WEBHOOK_URL, None),
            ],
            || {
                let config = MonitorConfig::from_env().unwrap();
                assert_eq!(config.timezone, "UTC");
                assert_eq!(config.timeframe.minutes(), 5);
                assert_eq!(config.symbols, vec!["SMCI".to_string(), "AAPL".to_string()]);
                assert!(config.dry_run);
                assert!(config.webhook_url.is_none());
            },
        );
    }

    #[test]
    fn test_monitor_config_from_env_missing_webhook() {
        temp_env::with_vars(
            [
                (ENV_TIMEZONE, None::<&str>),
                (ENV_TIMEFRAME, None),
                (ENV_SYMBOLS, None),
                (ENV_DRY_RUN, Some("false")),
                (ENV_WEBHOOK_URL, None),
            ],
            || {
                let err = MonitorConfig::from_env().unwrap_err();
                assert!(err.to_string().contains(ENV_WEBHOOK_URL));
            },
        );
    }

    #[test]
    fn test_monitor_config_from_env_bad_timeframe() {
        temp_env::with_vars(
            [
                (ENV_TIMEFRAME, Some("3h")),
                (ENV_DRY_RUN, Some("1")),
            ],
            || {
                let err = MonitorConfig::from_env().unwrap_err();
                assert!(matches!(err, CoreError::Timeframe(_)));
            },
        );
    }

    #[test]
    fn test_parse_bool_variants() {
        for value in ["1", "true", "YES", " y ", "on"] {
            assert!(parse_bool(value), "{value}");
        }
        for value in ["0", "false", "no", ""] {
            assert!(!parse_bool(value), "{value}");
        }
    }
}
