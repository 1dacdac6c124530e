//! Buy-and-hold benchmark over a quote window.

use serde::Serialize;

use super::metrics::{max_drawdown_fraction, sharpe_from_returns};
use super::quote::QuoteSeries;

/// Metrics for a passive buy-one-unit-and-hold position over a date window.
///
/// A pure function of the window: identical inputs always yield identical
/// output, so callers may memoize per `(start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkMetrics {
    pub profit_pct: f64,
    pub sharpe: Option<f64>,
    pub drawdown: f64,
}

impl BenchmarkMetrics {
    pub fn compute(quotes: &QuoteSeries) -> Self {
        let closes = quotes.closes();

        let profit_pct = match (closes.first(), closes.last()) {
            (Some(&first), Some(&last)) if first > 0.0 => last / first - 1.0,
            _ => 0.0,
        };

        let returns: Vec<f64> = closes
            .windows(2)
            .filter(|w| w[0] > 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();

        BenchmarkMetrics {
            profit_pct,
            sharpe: sharpe_from_returns(&returns),
            drawdown: max_drawdown_fraction(&closes),
        }
    }

    /// The defined neutral result when no window exists to benchmark.
    pub fn neutral() -> Self {
        BenchmarkMetrics {
            profit_pct: 0.0,
            sharpe: None,
            drawdown: 0.0,
        }
    }
}
