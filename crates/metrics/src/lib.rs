//! Divmon Metrics
//!
//! Scores replayed signals: directional forward-return accuracy per
//! confirmation bucket, and portfolio totals across symbols.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

/// Forward-return accuracy.
pub mod accuracy;
/// Portfolio aggregation.
pub mod compute;
/// Output rounding helpers.
pub mod output;

pub use accuracy::{
    AccuracyReport, AccuracyStats, AccuracyTable, ConfirmationBucket, compute_accuracy,
    directional_return,
};
pub use compute::{PortfolioSummary, summarize_portfolio};
pub use output::{round_accuracy, round_portfolio_summary};
