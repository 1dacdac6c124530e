//! The address analytics service.
//!
//! Wires the ledger and quote ports into the balance, metrics, benchmark,
//! and ranking computations. Owns no state: every call is a pure function
//! of what the ports return.

use chrono::NaiveDate;
use serde::Serialize;

use super::balance::{build_history, BalanceHistory};
use super::benchmark::BenchmarkMetrics;
use super::error::SatscopeError;
use super::metrics::{AddressStats, PerformanceMetrics};
use super::quote::QuoteSeries;
use super::ranking::{rank_addresses, RankedAddress, RankingFilter};
use super::transfer::{first_activity_date, TransferEvent};
use crate::ports::ledger_port::LedgerPort;
use crate::ports::quote_port::QuotePort;

/// Everything computed for one address in a single pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressReport {
    pub stats: AddressStats,
    pub history: BalanceHistory,
}

pub struct AddressAnalytics<'a> {
    ledger: &'a dyn LedgerPort,
    quotes: &'a dyn QuotePort,
}

impl<'a> AddressAnalytics<'a> {
    pub fn new(ledger: &'a dyn LedgerPort, quotes: &'a dyn QuotePort) -> Self {
        Self { ledger, quotes }
    }

    /// Full single-address pipeline: daily balance history joined with
    /// quotes, the performance metric set, and the buy-and-hold benchmark
    /// over the same window.
    ///
    /// `benchmark_start` defaults to the address's own first activity date;
    /// batch callers pass the population-wide earliest date so every report
    /// shares one benchmark. An address with no activity yields a neutral
    /// report, not an error.
    pub fn address_report(
        &self,
        address: &str,
        end_date: NaiveDate,
        benchmark_start: Option<NaiveDate>,
    ) -> Result<AddressReport, SatscopeError> {
        let events = self.ledger.fetch_transfer_events(address)?;
        let Some(first_active) = first_activity_date(&events) else {
            return Ok(AddressReport {
                stats: AddressStats::neutral(address),
                history: BalanceHistory::default(),
            });
        };
        if end_date < first_active {
            return Err(SatscopeError::InvalidWindow {
                start: first_active,
                end: end_date,
            });
        }

        let bench_start = benchmark_start.unwrap_or(first_active);
        let fetch_start = bench_start.min(first_active);
        let raw = self.quotes.fetch_quotes(fetch_start, end_date)?;

        let balance_series = QuoteSeries::build(&raw, first_active, end_date)?;
        let history = build_history(&events, &balance_series, end_date)?;
        let metrics = PerformanceMetrics::compute(&history.samples, &events);

        let bench_series = QuoteSeries::build(&raw, bench_start, end_date)?;
        let benchmark = BenchmarkMetrics::compute(&bench_series);

        Ok(AddressReport {
            stats: AddressStats::assemble(address, metrics, &benchmark),
            history,
        })
    }

    /// Daily balance history for one address, without the metric pass.
    pub fn balance_history(
        &self,
        address: &str,
        end_date: NaiveDate,
    ) -> Result<BalanceHistory, SatscopeError> {
        let events = self.ledger.fetch_transfer_events(address)?;
        let Some(first_active) = first_activity_date(&events) else {
            return Ok(BalanceHistory::default());
        };
        if end_date < first_active {
            return Err(SatscopeError::InvalidWindow {
                start: first_active,
                end: end_date,
            });
        }

        let raw = self.quotes.fetch_quotes(first_active, end_date)?;
        let series = QuoteSeries::build(&raw, first_active, end_date)?;
        build_history(&events, &series, end_date)
    }

    /// Buy-and-hold benchmark for an arbitrary window.
    pub fn benchmark(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BenchmarkMetrics, SatscopeError> {
        let raw = self.quotes.fetch_quotes(start, end)?;
        let series = QuoteSeries::build(&raw, start, end)?;
        Ok(BenchmarkMetrics::compute(&series))
    }

    /// Evaluate a batch of addresses and return the filtered, ranked result.
    ///
    /// Addresses without ledger activity are skipped with a warning. The
    /// benchmark window starts at the earliest activity date across the
    /// whole batch, so the benchmark columns are comparable between entries.
    pub fn ranked_addresses(
        &self,
        addresses: &[String],
        end_date: NaiveDate,
        filter: &RankingFilter,
    ) -> Result<Vec<RankedAddress>, SatscopeError> {
        // First pass: collect events and find the population-wide start.
        let mut batch: Vec<(String, Vec<TransferEvent>, NaiveDate)> = Vec::new();
        let mut population_start: Option<NaiveDate> = None;

        for address in addresses {
            let events = self.ledger.fetch_transfer_events(address)?;
            let Some(first_active) = first_activity_date(&events) else {
                eprintln!("Warning: skipping {address} (no ledger activity)");
                continue;
            };
            if end_date < first_active {
                eprintln!(
                    "Warning: skipping {address} (first activity {first_active} after {end_date})"
                );
                continue;
            }
            population_start =
                Some(population_start.map_or(first_active, |d: NaiveDate| d.min(first_active)));
            batch.push((address.clone(), events, first_active));
        }

        let Some(bench_start) = population_start else {
            return Ok(Vec::new());
        };

        let raw = self.quotes.fetch_quotes(bench_start, end_date)?;
        let bench_series = QuoteSeries::build(&raw, bench_start, end_date)?;
        let benchmark = BenchmarkMetrics::compute(&bench_series);

        let mut entries = Vec::new();
        for (address, events, first_active) in batch {
            let series = QuoteSeries::build(&raw, first_active, end_date)?;
            let history = build_history(&events, &series, end_date)?;
            for warning in &history.warnings {
                eprintln!("Warning: {address}: {warning}");
            }

            let metrics = PerformanceMetrics::compute(&history.samples, &events);
            let count_out = events.iter().filter(|e| e.is_outbound()).count() as u32;

            entries.push(RankedAddress {
                stats: AddressStats::assemble(&address, metrics, &benchmark),
                max_btc: history.peak_balance_satoshis(),
                btc_value: history.final_balance_satoshis(),
                count_out,
                first_in: first_active,
            });
        }

        Ok(rank_addresses(entries, filter))
    }
}
