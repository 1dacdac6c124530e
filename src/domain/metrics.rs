//! Performance statistics over a reconstructed balance history.

use serde::Serialize;

use super::balance::BalanceSample;
use super::benchmark::BenchmarkMetrics;
use super::transfer::TransferEvent;

const DAYS_PER_YEAR: f64 = 365.0;

/// Minimum holding that counts as a day in the market: 0.001 BTC.
pub const IN_MARKET_THRESHOLD_SATS: i64 = 100_000;

/// The metric set computed from one address's balance history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub profit_pct: f64,
    /// `None` when the Sharpe ratio is undefined (fewer than two return
    /// observations or zero variance). Callers must not read this as zero.
    pub sharpe_ratio: Option<f64>,
    pub drawdown: f64,
    pub exposure: f64,
    pub count_days_in_market: u32,
}

impl PerformanceMetrics {
    /// The defined neutral result for an address with no activity.
    pub fn neutral() -> Self {
        PerformanceMetrics {
            profit_pct: 0.0,
            sharpe_ratio: None,
            drawdown: 0.0,
            exposure: 0.0,
            count_days_in_market: 0,
        }
    }

    /// Compute the full metric set for one address window.
    ///
    /// `samples` is the daily balance history; `events` is the raw transfer
    /// sequence the history was built from, needed for the cost basis. An
    /// empty history yields the neutral metric set, not an error.
    pub fn compute(samples: &[BalanceSample], events: &[TransferEvent]) -> Self {
        let Some(last) = samples.last() else {
            return Self::neutral();
        };

        let basis = remaining_cost_basis(events);
        let profit_pct = if basis > 0.0 {
            (last.balance_usd - basis) / basis
        } else {
            0.0
        };

        let count_days_in_market = samples
            .iter()
            .filter(|s| s.balance_satoshis > IN_MARKET_THRESHOLD_SATS)
            .count() as u32;

        let peak_sats = samples
            .iter()
            .map(|s| s.balance_satoshis)
            .max()
            .unwrap_or(0);
        let exposure = if peak_sats > 0 {
            samples
                .iter()
                .map(|s| s.balance_satoshis as f64 / peak_sats as f64)
                .sum::<f64>()
                / samples.len() as f64
        } else {
            0.0
        };

        let returns = active_daily_returns(samples);
        let usd_curve: Vec<f64> = samples.iter().map(|s| s.balance_usd).collect();

        PerformanceMetrics {
            profit_pct,
            sharpe_ratio: sharpe_from_returns(&returns),
            drawdown: max_drawdown_fraction(&usd_curve),
            exposure,
            count_days_in_market,
        }
    }
}

/// Statistics for one address, with the buy-and-hold benchmark over the same
/// window attached for comparison. Rebuilt from scratch on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressStats {
    pub address: String,
    pub profit_pct: f64,
    pub sharpe_ratio: Option<f64>,
    pub drawdown: f64,
    pub exposure: f64,
    pub count_days_in_market: u32,
    pub benchmark_profit: f64,
    pub benchmark_sharpe: Option<f64>,
    pub benchmark_drawdown: f64,
}

impl AddressStats {
    pub fn assemble(
        address: &str,
        metrics: PerformanceMetrics,
        benchmark: &BenchmarkMetrics,
    ) -> Self {
        AddressStats {
            address: address.to_string(),
            profit_pct: metrics.profit_pct,
            sharpe_ratio: metrics.sharpe_ratio,
            drawdown: metrics.drawdown,
            exposure: metrics.exposure,
            count_days_in_market: metrics.count_days_in_market,
            benchmark_profit: benchmark.profit_pct,
            benchmark_sharpe: benchmark.sharpe,
            benchmark_drawdown: benchmark.drawdown,
        }
    }

    /// Stats for an address with no ledger activity.
    pub fn neutral(address: &str) -> Self {
        Self::assemble(address, PerformanceMetrics::neutral(), &BenchmarkMetrics::neutral())
    }
}

/// USD cost basis still attached to the current holdings.
///
/// Each inbound transfer adds its own at-the-time USD value; an outbound
/// transfer releases basis in proportion to the fraction of holdings it
/// spends. Historical transfers are never re-priced at the current quote.
fn remaining_cost_basis(events: &[TransferEvent]) -> f64 {
    let mut sorted: Vec<&TransferEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);

    let mut held: i64 = 0;
    let mut basis: f64 = 0.0;
    for event in sorted {
        if event.value_satoshis >= 0 {
            held += event.value_satoshis;
            basis += event.usd_value;
        } else {
            let spent = -event.value_satoshis;
            if held > 0 {
                let fraction = (spent as f64 / held as f64).min(1.0);
                basis *= 1.0 - fraction;
            }
            held -= spent;
        }
    }
    basis
}

/// Day-over-day simple returns for days the address holds a positive balance.
/// A zero-balance day contributes no observation, so inactive periods do not
/// pollute the risk statistics.
pub fn active_daily_returns(samples: &[BalanceSample]) -> Vec<f64> {
    samples
        .windows(2)
        .filter(|w| {
            w[0].balance_satoshis > 0 && w[1].balance_satoshis > 0 && w[0].balance_usd > 0.0
        })
        .map(|w| (w[1].balance_usd - w[0].balance_usd) / w[0].balance_usd)
        .collect()
}

/// Annualized Sharpe ratio at zero risk-free rate, population stdev. `None`
/// when undefined: fewer than two observations or zero variance.
pub fn sharpe_from_returns(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev == 0.0 {
        return None;
    }
    Some(mean / stddev * DAYS_PER_YEAR.sqrt())
}

/// Deepest peak-to-trough decline over `values`, as a fraction ≤ 0. Returns
/// 0 for a non-decreasing series. Days before the first positive peak are
/// skipped so zero-balance stretches do not divide by zero.
pub fn max_drawdown_fraction(values: &[f64]) -> f64 {
    let mut peak: f64 = 0.0;
    let mut min_dd: f64 = 0.0;
    for &value in values {
        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            let dd = (value - peak) / peak;
            if dd < min_dd {
                min_dd = dd;
            }
        }
    }
    min_dd
}
