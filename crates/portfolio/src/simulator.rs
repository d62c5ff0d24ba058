//! Sequential cash/share simulation driven by signal events.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use divmon_types::{Candle, SignalEvent, SignalKind, SimulationConfig};
use serde::{Deserialize, Serialize};

use crate::error::PortfolioError;

/// Mutable simulation state for one symbol.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioState {
    /// Uninvested cash
    pub cash: f64,
    /// Shares held
    pub shares: f64,
    /// Executed buys
    pub buy_count: usize,
    /// Executed sells
    pub sell_count: usize,
}

impl PortfolioState {
    /// Creates a state holding only cash.
    #[must_use]
    pub fn new(cash: f64) -> Self {
        Self {
            cash,
            ..Self::default()
        }
    }

    /// Spends `pct` of cash at `price`. Returns the quantity bought.
    fn buy(&mut self, price: f64, pct: f64) -> Option<f64> {
        let budget = self.cash * pct;
        if budget <= 0.0 {
            return None;
        }
        let quantity = budget / price;
        self.cash -= budget;
        self.shares += quantity;
        self.buy_count += 1;
        Some(quantity)
    }

    /// Sells `pct` of shares at `price`. Returns the quantity sold.
    fn sell(&mut self, price: f64, pct: f64) -> Option<f64> {
        let quantity = self.shares * pct;
        if quantity <= 0.0 {
            return None;
        }
        self.shares -= quantity;
        self.cash += quantity * price;
        self.sell_count += 1;
        Some(quantity)
    }

    /// Cash plus shares marked at `price`.
    #[must_use]
    pub fn value(&self, price: f64) -> f64 {
        self.cash + self.shares * price
    }
}

/// One executed simulated trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Pivot timestamp of the triggering event
    pub timestamp: DateTime<FixedOffset>,
    /// Bullish = buy, bearish = sell
    pub kind: SignalKind,
    /// Pivot candle close
    pub price: f64,
    /// Shares traded
    pub quantity: f64,
}

/// Final simulation result for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioResult {
    /// Ticker symbol
    pub symbol: String,
    /// Cash at start
    pub starting_cash: f64,
    /// Cash + shares x last close
    pub ending_value: f64,
    /// (ending - starting) / starting, 0 when starting cash is 0
    pub total_return: f64,
    /// Final state
    pub state: PortfolioState,
    /// Executed trades in application order
    pub fills: Vec<Fill>,
}

impl PortfolioResult {
    /// Total return in percent.
    #[must_use]
    pub fn return_pct(&self) -> f64 {
        self.total_return * 100.0
    }
}

/// Simulates one symbol.
///
/// Events are applied in ascending pivot timestamp order, bearish before
/// bullish at equal timestamps. Events with an out-of-range pivot index or
/// a non-positive price are skipped, as are zero-budget buys and
/// zero-quantity sells. Returns `None` when `candles` is empty.
///
/// # Errors
/// Returns [`PortfolioError::InvalidConfig`] for out-of-range parameters.
pub fn simulate_symbol(
    symbol: &str,
    candles: &[Candle],
    events: &[SignalEvent],
    config: &SimulationConfig,
) -> Result<Option<PortfolioResult>, PortfolioError> {
    config.validate()?;
    let Some(last) = candles.last() else {
        return Ok(None);
    };

    let mut ordered: Vec<&SignalEvent> = events.iter().collect();
    ordered.sort_by_key(|e| (e.pivot_timestamp, e.kind == SignalKind::Bullish));

    let mut state = PortfolioState::new(config.starting_cash);
    let mut fills = Vec::new();

    for event in ordered {
        let Some(candle) = candles.get(event.pivot_index) else {
            tracing::warn!(
                symbol,
                pivot_index = event.pivot_index,
                candles = candles.len(),
                "Skipping event with out-of-range pivot index"
            );
            continue;
        };
        let price = candle.close;
        if price <= 0.0 {
            continue;
        }

        let executed = match event.kind {
            SignalKind::Bullish => state.buy(price, config.buy_pct),
            SignalKind::Bearish => state.sell(price, config.sell_pct),
        };
        if let Some(quantity) = executed {
            fills.push(Fill {
                timestamp: event.pivot_timestamp,
                kind: event.kind,
                price,
                quantity,
            });
        }
    }

    let ending_value = state.value(last.close);
    let total_return = if config.starting_cash > 0.0 {
        (ending_value - config.starting_cash) / config.starting_cash
    } else {
        0.0
    };

    Ok(Some(PortfolioResult {
        symbol: symbol.to_string(),
        starting_cash: config.starting_cash,
        ending_value,
        total_return,
        state,
        fills,
    }))
}

/// Simulates every symbol that has candles.
///
/// Symbols without candles are omitted; symbols without events end with
/// their starting cash.
///
/// # Errors
/// Returns [`PortfolioError::InvalidConfig`] for out-of-range parameters.
pub fn simulate_portfolio(
    candles_by_symbol: &BTreeMap<String, Vec<Candle>>,
    events_by_symbol: &BTreeMap<String, Vec<SignalEvent>>,
    config: &SimulationConfig,
) -> Result<BTreeMap<String, PortfolioResult>, PortfolioError> {
    let mut results = BTreeMap::new();
    for (symbol, candles) in candles_by_symbol {
        let events = events_by_symbol.get(symbol).map_or(&[][..], Vec::as_slice);
        if let Some(result) = simulate_symbol(symbol, candles, events, config)? {
            results.insert(symbol.clone(), result);
        }
    }
    Ok(results)
}
