//! Daily balance reconstruction from transfer events.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::SatscopeError;
use super::quote::QuoteSeries;
use super::transfer::{TransferEvent, SATS_PER_BTC};

/// One day of reconstructed holdings: the running cumulative satoshi sum and
/// its USD value at that day's close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSample {
    pub date: NaiveDate,
    pub balance_satoshis: i64,
    pub balance_usd: f64,
}

/// Data-integrity findings surfaced alongside a computed history.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum LedgerWarning {
    /// Spends exceed cumulative receipts; the ledger is inconsistent. The
    /// negative value is reported as computed, never clamped.
    #[error("ledger inconsistency: balance {balance_satoshis} sat on {date}")]
    NegativeBalance {
        date: NaiveDate,
        balance_satoshis: i64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BalanceHistory {
    pub samples: Vec<BalanceSample>,
    pub warnings: Vec<LedgerWarning>,
}

impl BalanceHistory {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Satoshi balance on the last day, 0 for an empty history.
    pub fn final_balance_satoshis(&self) -> i64 {
        self.samples.last().map_or(0, |s| s.balance_satoshis)
    }

    /// Highest satoshi balance over the window, 0 for an empty history.
    pub fn peak_balance_satoshis(&self) -> i64 {
        self.samples
            .iter()
            .map(|s| s.balance_satoshis)
            .max()
            .unwrap_or(0)
    }
}

/// Reconstruct the daily balance of one address from its transfer events.
///
/// Emits one sample per calendar day from the earliest event's date through
/// `end_date` inclusive. Events on the same day net into a single daily
/// change; no intraday granularity is modeled. `quotes` must cover the full
/// window. Zero events yield an empty history, which is a valid result for
/// an address with no activity.
pub fn build_history(
    events: &[TransferEvent],
    quotes: &QuoteSeries,
    end_date: NaiveDate,
) -> Result<BalanceHistory, SatscopeError> {
    if events.is_empty() {
        return Ok(BalanceHistory::default());
    }

    let mut sorted: Vec<&TransferEvent> = events.iter().collect();
    // Stable: same-timestamp events keep ledger insertion order.
    sorted.sort_by_key(|e| e.timestamp);

    let first_active = sorted[0].date();
    if end_date < first_active {
        return Err(SatscopeError::InvalidWindow {
            start: first_active,
            end: end_date,
        });
    }

    let mut samples = Vec::new();
    let mut warnings = Vec::new();
    let mut balance: i64 = 0;
    let mut idx = 0;
    let mut day = first_active;
    loop {
        while idx < sorted.len() && sorted[idx].date() == day {
            balance += sorted[idx].value_satoshis;
            idx += 1;
        }

        let close = quotes
            .close_on(day)
            .ok_or(SatscopeError::DataUnavailable { date: day })?;
        let balance_usd = balance as f64 / SATS_PER_BTC * close;

        if balance < 0 {
            let entering = samples
                .last()
                .map_or(true, |s: &BalanceSample| s.balance_satoshis >= 0);
            if entering {
                warnings.push(LedgerWarning::NegativeBalance {
                    date: day,
                    balance_satoshis: balance,
                });
            }
        }

        samples.push(BalanceSample {
            date: day,
            balance_satoshis: balance,
            balance_usd,
        });

        if day == end_date {
            break;
        }
        day = match day.succ_opt() {
            Some(d) => d,
            None => break,
        };
    }

    Ok(BalanceHistory { samples, warnings })
}
