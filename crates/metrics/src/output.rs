//! Output formatting helpers for metrics.

use crate::accuracy::{AccuracyReport, AccuracyStats};
use crate::compute::PortfolioSummary;

const CURRENCY_DECIMALS: u32 = 2;
const RATIO_DECIMALS: u32 = 6;

/// Rounds accuracy stats according to the output contract.
#[must_use]
pub fn round_accuracy(mut report: AccuracyReport) -> AccuracyReport {
    for stats in report
        .stats
        .values_mut()
        .flat_map(|buckets| buckets.values_mut())
        .flat_map(|horizons| horizons.values_mut())
    {
        round_stats(stats);
    }
    report
}

fn round_stats(stats: &mut AccuracyStats) {
    stats.hit_rate = round_to_decimals(stats.hit_rate, RATIO_DECIMALS);
    stats.mean_return = round_to_decimals(stats.mean_return, RATIO_DECIMALS);
    stats.median_return = round_to_decimals(stats.median_return, RATIO_DECIMALS);
}

/// Rounds portfolio totals according to the output contract.
#[must_use]
pub fn round_portfolio_summary(mut summary: PortfolioSummary) -> PortfolioSummary {
    summary.starting_cash = round_to_decimals(summary.starting_cash, CURRENCY_DECIMALS);
    summary.ending_value = round_to_decimals(summary.ending_value, CURRENCY_DECIMALS);
    summary.total_return = round_to_decimals(summary.total_return, RATIO_DECIMALS);
    summary
}

#[allow(clippy::cast_possible_wrap)] // decimals is always small (< 10)
fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}
