//! Quote access port trait.

use crate::domain::error::SatscopeError;
use crate::domain::quote::Quote;
use chrono::NaiveDate;

pub trait QuotePort {
    /// Quotes in `[start_date, end_date]`, ordered by date. Gaps are allowed;
    /// forward-filling happens exactly once, in the quote series builder.
    fn fetch_quotes(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Quote>, SatscopeError>;

    /// First and last quoted dates plus row count, `None` when no quotes are
    /// stored.
    fn quote_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SatscopeError>;
}
