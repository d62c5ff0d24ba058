//! Aggregate portfolio figures across symbols.

use std::collections::BTreeMap;

use divmon_portfolio::PortfolioResult;
use serde::{Deserialize, Serialize};

/// Portfolio totals over every simulated symbol.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Number of simulated symbols
    pub symbols: usize,
    /// Sum of starting cash
    pub starting_cash: f64,
    /// Sum of ending values
    pub ending_value: f64,
    /// (ending - starting) / starting over the totals, 0 without cash
    pub total_return: f64,
    /// Executed buys across symbols
    pub buy_count: usize,
    /// Executed sells across symbols
    pub sell_count: usize,
    /// Symbols that ended above their starting cash
    pub profitable_symbols: usize,
}

/// Sums per-symbol results into one summary.
#[must_use]
pub fn summarize_portfolio(results: &BTreeMap<String, PortfolioResult>) -> PortfolioSummary {
    let mut summary = PortfolioSummary {
        symbols: results.len(),
        ..PortfolioSummary::default()
    };

    for result in results.values() {
        summary.starting_cash += result.starting_cash;
        summary.ending_value += result.ending_value;
        summary.buy_count += result.state.buy_count;
        summary.sell_count += result.state.sell_count;
        if result.ending_value > result.starting_cash {
            summary.profitable_symbols += 1;
        }
    }

    summary.total_return = if summary.starting_cash > 0.0 {
        (summary.ending_value - summary.starting_cash) / summary.starting_cash
    } else {
        0.0
    };
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use divmon_portfolio::PortfolioState;

    fn result(symbol: &str, ending_value: f64, buys: usize) -> PortfolioResult {
        PortfolioResult {
            symbol: symbol.to_string(),
            starting_cash: 1000.0,
            ending_value,
            total_return: (ending_value - 1000.0) / 1000.0,
            state: PortfolioState {
                cash: ending_value,
                shares: 0.0,
                buy_count: buys,
                sell_count: buys,
            },
            fills: Vec::new(),
        }
    }

    #[test]
    fn test_summarize_portfolio() {
        let mut results = BTreeMap::new();
        results.insert("AAPL".to_string(), result("AAPL", 1200.0, 2));
        results.insert("SMCI".to_string(), result("SMCI", 900.0, 1));

        let summary = summarize_portfolio(&results);
        assert_eq!(summary.symbols, 2);
        assert!((summary.starting_cash - 2000.0).abs() < 1e-9);
        assert!((summary.ending_value - 2100.0).abs() < 1e-9);
        assert!((summary.total_return - 0.05).abs() < 1e-9);
        assert_eq!(summary.buy_count, 3);
        assert_eq!(summary.sell_count, 3);
        assert_eq!(summary.profitable_symbols, 1);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize_portfolio(&BTreeMap::new());
        assert_eq!(summary, PortfolioSummary::default());
    }
}
