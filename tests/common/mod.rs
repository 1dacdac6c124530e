#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use satscope::domain::error::SatscopeError;
use satscope::domain::quote::Quote;
use satscope::domain::transfer::TransferEvent;
use satscope::ports::ledger_port::LedgerPort;
use satscope::ports::quote_port::QuotePort;
use std::collections::HashMap;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn datetime(time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn make_event(address: &str, time: &str, sats: i64, usd: f64) -> TransferEvent {
    TransferEvent {
        timestamp: datetime(time),
        address: address.to_string(),
        value_satoshis: sats,
        usd_value: usd,
    }
}

/// One quote per day starting at `start`, taking closes from `closes`.
pub fn quotes_from(start: NaiveDate, closes: &[f64]) -> Vec<Quote> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Quote {
            date: start + chrono::Duration::days(i as i64),
            close_usd: close,
        })
        .collect()
}

pub fn constant_quotes(start: NaiveDate, days: usize, close: f64) -> Vec<Quote> {
    quotes_from(start, &vec![close; days])
}

pub struct MockLedger {
    pub events: HashMap<String, Vec<TransferEvent>>,
    pub errors: HashMap<String, String>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_events(mut self, address: &str, events: Vec<TransferEvent>) -> Self {
        self.events.insert(address.to_string(), events);
        self
    }

    pub fn with_error(mut self, address: &str, reason: &str) -> Self {
        self.errors.insert(address.to_string(), reason.to_string());
        self
    }
}

impl LedgerPort for MockLedger {
    fn fetch_transfer_events(&self, address: &str) -> Result<Vec<TransferEvent>, SatscopeError> {
        if let Some(reason) = self.errors.get(address) {
            return Err(SatscopeError::DatabaseQuery {
                reason: reason.clone(),
            });
        }
        Ok(self.events.get(address).cloned().unwrap_or_default())
    }

    fn list_addresses(&self) -> Result<Vec<String>, SatscopeError> {
        let mut addresses: Vec<String> = self.events.keys().cloned().collect();
        addresses.sort();
        Ok(addresses)
    }

    fn activity_range(
        &self,
        address: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SatscopeError> {
        if let Some(reason) = self.errors.get(address) {
            return Err(SatscopeError::DatabaseQuery {
                reason: reason.clone(),
            });
        }
        let events = match self.events.get(address) {
            Some(e) if !e.is_empty() => e,
            _ => return Ok(None),
        };
        let min = events.iter().map(|e| e.date()).min().unwrap();
        let max = events.iter().map(|e| e.date()).max().unwrap();
        Ok(Some((min, max, events.len())))
    }
}

pub struct MockQuotes {
    pub quotes: Vec<Quote>,
}

impl MockQuotes {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }
}

impl QuotePort for MockQuotes {
    fn fetch_quotes(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Quote>, SatscopeError> {
        Ok(self
            .quotes
            .iter()
            .filter(|q| q.date >= start_date && q.date <= end_date)
            .cloned()
            .collect())
    }

    fn quote_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SatscopeError> {
        if self.quotes.is_empty() {
            return Ok(None);
        }
        let min = self.quotes.iter().map(|q| q.date).min().unwrap();
        let max = self.quotes.iter().map(|q| q.date).max().unwrap();
        Ok(Some((min, max, self.quotes.len())))
    }
}
