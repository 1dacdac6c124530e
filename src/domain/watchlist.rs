//! Address watchlist for batch evaluation.
//!
//! Parses address lists from configuration or the command line and checks
//! each against the ledger before a batch runs.

use crate::ports::ledger_port::LedgerPort;
use std::collections::HashSet;

#[derive(Debug, Clone, thiserror::Error)]
pub enum WatchlistError {
    #[error("empty token in address list")]
    EmptyToken,

    #[error("duplicate address: {0}")]
    DuplicateAddress(String),
}

/// Split a comma-separated address list, trimming whitespace. Addresses are
/// case sensitive and kept verbatim.
pub fn parse_addresses(input: &str) -> Result<Vec<String>, WatchlistError> {
    let mut addresses = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(WatchlistError::EmptyToken);
        }
        if !seen.insert(trimmed.to_string()) {
            return Err(WatchlistError::DuplicateAddress(trimmed.to_string()));
        }
        addresses.push(trimmed.to_string());
    }

    Ok(addresses)
}

#[derive(Debug, Clone)]
pub struct SkippedAddress {
    pub address: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub enum SkipReason {
    NoActivity,
    FetchFailed,
}

pub struct WatchlistValidationResult {
    pub active: Vec<String>,
    pub skipped: Vec<SkippedAddress>,
}

/// Drop addresses the ledger has never seen. An address with no activity is
/// a valid, common case; a fully skipped watchlist yields an empty batch
/// rather than an error.
pub fn validate_watchlist(
    ledger: &dyn LedgerPort,
    addresses: Vec<String>,
) -> WatchlistValidationResult {
    let mut active = Vec::new();
    let mut skipped = Vec::new();

    for address in addresses {
        match ledger.activity_range(&address) {
            Ok(Some(_)) => active.push(address),
            Ok(None) => {
                eprintln!("Warning: skipping {} (no ledger activity)", address);
                skipped.push(SkippedAddress {
                    address,
                    reason: SkipReason::NoActivity,
                });
            }
            Err(e) => {
                eprintln!("Warning: skipping {} ({})", address, e);
                skipped.push(SkippedAddress {
                    address,
                    reason: SkipReason::FetchFailed,
                });
            }
        }
    }

    WatchlistValidationResult { active, skipped }
}
