//! Ledger transfer events.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Satoshis per bitcoin.
pub const SATS_PER_BTC: f64 = 100_000_000.0;

/// One signed value transfer observed on the ledger for a single address.
///
/// `value_satoshis` is positive for an inbound transfer (output received by
/// the address) and negative for an outbound transfer (input spent by it).
/// `usd_value` is the absolute USD value of the transfer at its own time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferEvent {
    pub timestamp: NaiveDateTime,
    pub address: String,
    pub value_satoshis: i64,
    pub usd_value: f64,
}

impl TransferEvent {
    /// Calendar date of the transfer.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn is_inbound(&self) -> bool {
        self.value_satoshis > 0
    }

    pub fn is_outbound(&self) -> bool {
        self.value_satoshis < 0
    }
}

/// Calendar date of the earliest event, if any. Events need not be sorted.
pub fn first_activity_date(events: &[TransferEvent]) -> Option<NaiveDate> {
    events.iter().map(|e| e.timestamp).min().map(|t| t.date())
}
