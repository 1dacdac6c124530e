//! Ledger access port trait.

use crate::domain::error::SatscopeError;
use crate::domain::transfer::TransferEvent;
use chrono::NaiveDate;

pub trait LedgerPort {
    /// All transfer events for one address, ordered by timestamp with ledger
    /// insertion order preserved for ties. May be empty; never contains
    /// events for other addresses.
    fn fetch_transfer_events(&self, address: &str) -> Result<Vec<TransferEvent>, SatscopeError>;

    fn list_addresses(&self) -> Result<Vec<String>, SatscopeError>;

    /// First and last activity dates plus event count, `None` for an address
    /// the ledger has never seen.
    fn activity_range(
        &self,
        address: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SatscopeError>;
}
