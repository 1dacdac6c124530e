//! CSV file ingest adapter.
//!
//! Reads transfer-event and quote exports for loading into a database
//! adapter via the `import` command.

use crate::domain::error::SatscopeError;
use crate::domain::quote::Quote;
use crate::domain::transfer::TransferEvent;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Read transfer events from a CSV with columns
/// `time,address,value_satoshis,usd_value`. File order is preserved; it is
/// the ledger insertion order used to break timestamp ties downstream.
pub fn read_transfer_events<P: AsRef<Path>>(path: P) -> Result<Vec<TransferEvent>, SatscopeError> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path).map_err(|e| SatscopeError::Database {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut events = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| SatscopeError::Database {
            reason: format!("CSV parse error: {}", e),
        })?;

        let time_str = field(&record, 0, "time")?;
        let timestamp =
            NaiveDateTime::parse_from_str(time_str, TIME_FORMAT).map_err(|e| {
                SatscopeError::Database {
                    reason: format!("invalid time format: {}", e),
                }
            })?;

        let address = field(&record, 1, "address")?.to_string();

        let value_satoshis: i64 =
            field(&record, 2, "value_satoshis")?
                .parse()
                .map_err(|e| SatscopeError::Database {
                    reason: format!("invalid value_satoshis: {}", e),
                })?;

        let usd_value: f64 =
            field(&record, 3, "usd_value")?
                .parse()
                .map_err(|e| SatscopeError::Database {
                    reason: format!("invalid usd_value: {}", e),
                })?;

        events.push(TransferEvent {
            timestamp,
            address,
            value_satoshis,
            usd_value,
        });
    }

    Ok(events)
}

/// Read daily quotes from a CSV with columns `date,close`, sorted by date.
pub fn read_quotes<P: AsRef<Path>>(path: P) -> Result<Vec<Quote>, SatscopeError> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path).map_err(|e| SatscopeError::Database {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut quotes = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| SatscopeError::Database {
            reason: format!("CSV parse error: {}", e),
        })?;

        let date_str = field(&record, 0, "date")?;
        let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|e| {
            SatscopeError::Database {
                reason: format!("invalid date format: {}", e),
            }
        })?;

        let close_usd: f64 = field(&record, 1, "close")?
            .parse()
            .map_err(|e| SatscopeError::Database {
                reason: format!("invalid close value: {}", e),
            })?;

        quotes.push(Quote { date, close_usd });
    }

    quotes.sort_by_key(|q| q.date);
    Ok(quotes)
}

fn field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'a str, SatscopeError> {
    record.get(index).ok_or_else(|| SatscopeError::Database {
        reason: format!("missing {} column", name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn read_transfer_events_parses_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transfers.csv");
        fs::write(
            &path,
            "time,address,value_satoshis,usd_value\n\
             2020-01-02 10:00:00,bc1qaaa,100000000,7100.0\n\
             2020-01-04 12:00:00,bc1qaaa,-30000000,2145.0\n",
        )
        .unwrap();

        let events = read_transfer_events(&path).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].address, "bc1qaaa");
        assert_eq!(events[0].value_satoshis, 100_000_000);
        assert!(events[1].is_outbound());
    }

    #[test]
    fn read_transfer_events_preserves_file_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transfers.csv");
        fs::write(
            &path,
            "time,address,value_satoshis,usd_value\n\
             2020-01-02 10:00:00,bc1qaaa,1,0.1\n\
             2020-01-02 10:00:00,bc1qaaa,2,0.2\n",
        )
        .unwrap();

        let events = read_transfer_events(&path).unwrap();
        let values: Vec<i64> = events.iter().map(|e| e.value_satoshis).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn read_transfer_events_rejects_bad_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transfers.csv");
        fs::write(
            &path,
            "time,address,value_satoshis,usd_value\n\
             2020-01-02 10:00:00,bc1qaaa,lots,7100.0\n",
        )
        .unwrap();

        assert!(read_transfer_events(&path).is_err());
    }

    #[test]
    fn read_quotes_sorts_by_date() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quotes.csv");
        fs::write(
            &path,
            "date,close\n2020-01-03,7200.0\n2020-01-01,7000.0\n2020-01-02,7100.0\n",
        )
        .unwrap();

        let quotes = read_quotes(&path).unwrap();

        let closes: Vec<f64> = quotes.iter().map(|q| q.close_usd).collect();
        assert_eq!(closes, vec![7000.0, 7100.0, 7200.0]);
    }

    #[test]
    fn read_quotes_missing_file_fails() {
        let result = read_quotes("/nonexistent/quotes.csv");
        assert!(result.is_err());
    }
}
