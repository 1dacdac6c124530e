//! Multi-criteria filtering and ranking over evaluated addresses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::metrics::AddressStats;

/// Threshold criteria for the ranking filter. An absent field imposes no
/// constraint; populated fields must all pass for an entry to survive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingFilter {
    pub profit2btc_min: Option<f64>,
    pub max_btc_min: Option<i64>,
    pub btcvalue_ratio_min: Option<f64>,
    pub count_out_min: Option<u32>,
    pub first_in_after: Option<NaiveDate>,
}

impl RankingFilter {
    pub fn is_unconstrained(&self) -> bool {
        self.profit2btc_min.is_none()
            && self.max_btc_min.is_none()
            && self.btcvalue_ratio_min.is_none()
            && self.count_out_min.is_none()
            && self.first_in_after.is_none()
    }

    fn matches(&self, entry: &RankedAddress) -> bool {
        if let Some(min) = self.profit2btc_min {
            if entry.stats.profit_pct <= min {
                return false;
            }
        }
        if let Some(min) = self.max_btc_min {
            if entry.max_btc <= min {
                return false;
            }
        }
        if let Some(ratio) = self.btcvalue_ratio_min {
            if (entry.btc_value as f64) <= entry.max_btc as f64 * ratio {
                return false;
            }
        }
        if let Some(min) = self.count_out_min {
            if entry.count_out < min {
                return false;
            }
        }
        if let Some(cutoff) = self.first_in_after {
            if entry.first_in <= cutoff {
                return false;
            }
        }
        true
    }
}

/// One evaluated address: its statistics plus the auxiliary fields the
/// filter criteria compare against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedAddress {
    pub stats: AddressStats,
    /// Peak satoshi balance over the window.
    pub max_btc: i64,
    /// Final satoshi balance.
    pub btc_value: i64,
    /// Number of outbound transfers.
    pub count_out: u32,
    /// Date of the earliest transfer.
    pub first_in: NaiveDate,
}

/// Keep entries passing every populated criterion, ordered by profit
/// descending; ties fall back to address order so output is deterministic.
/// An empty input or a filter matching nothing yields an empty list.
pub fn rank_addresses(entries: Vec<RankedAddress>, filter: &RankingFilter) -> Vec<RankedAddress> {
    let mut kept: Vec<RankedAddress> = entries
        .into_iter()
        .filter(|e| filter.matches(e))
        .collect();

    kept.sort_by(|a, b| {
        b.stats
            .profit_pct
            .total_cmp(&a.stats.profit_pct)
            .then_with(|| a.stats.address.cmp(&b.stats.address))
    });
    kept
}
