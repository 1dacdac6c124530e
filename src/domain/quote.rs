//! Daily price quotes and the gap-free series the engine computes over.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::SatscopeError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub date: NaiveDate,
    pub close_usd: f64,
}

/// Date-ordered close series with exactly one entry per calendar day.
///
/// Built from a raw quote sequence that may have gaps; a missing day carries
/// the last known close forward. Downstream day-granularity arithmetic can
/// index any day in the window without hitting a hole.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSeries {
    quotes: Vec<Quote>,
}

impl QuoteSeries {
    /// Build the gap-free series for `[start, end]` from raw quotes ordered
    /// by date. Days without a quote take the most recent close on or before
    /// them; missing days are never interpolated or dropped. A window whose
    /// start precedes every raw quote has nothing to fill from and fails
    /// with `DataUnavailable`.
    pub fn build(raw: &[Quote], start: NaiveDate, end: NaiveDate) -> Result<Self, SatscopeError> {
        if end < start {
            return Err(SatscopeError::InvalidWindow { start, end });
        }

        // Seed from the most recent close on or before the window start.
        let mut idx = raw.iter().take_while(|q| q.date <= start).count();
        if idx == 0 {
            return Err(SatscopeError::DataUnavailable { date: start });
        }
        let mut last_close = raw[idx - 1].close_usd;

        let mut quotes = Vec::with_capacity((end - start).num_days() as usize + 1);
        let mut day = start;
        loop {
            while idx < raw.len() && raw[idx].date <= day {
                last_close = raw[idx].close_usd;
                idx += 1;
            }
            quotes.push(Quote {
                date: day,
                close_usd: last_close,
            });
            if day == end {
                break;
            }
            day = match day.succ_opt() {
                Some(d) => d,
                None => break,
            };
        }

        Ok(Self { quotes })
    }

    /// First day of the window. The series is never empty by construction.
    pub fn start(&self) -> NaiveDate {
        self.quotes[0].date
    }

    /// Last day of the window.
    pub fn end(&self) -> NaiveDate {
        self.quotes[self.quotes.len() - 1].date
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Close for a day inside the window, `None` outside it.
    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        let offset = date.signed_duration_since(self.start()).num_days();
        if offset < 0 {
            return None;
        }
        self.quotes.get(offset as usize).map(|q| q.close_usd)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.quotes.iter().map(|q| q.close_usd).collect()
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }
}
