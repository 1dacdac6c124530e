//! SQLite data adapter.
//!
//! Implements both data ports over one pooled connection: the transfer
//! ledger and the daily quote table.

use crate::domain::error::SatscopeError;
use crate::domain::quote::Quote;
use crate::domain::transfer::TransferEvent;
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;
use crate::ports::quote_port::QuotePort;
use chrono::{NaiveDate, NaiveDateTime};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SatscopeError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| SatscopeError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| SatscopeError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, SatscopeError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| SatscopeError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), SatscopeError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| SatscopeError::Database {
                reason: e.to_string(),
            })?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS transfers (
                t_time TEXT NOT NULL,
                address TEXT NOT NULL,
                value_satoshis INTEGER NOT NULL,
                usd_value REAL NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_transfers_address ON transfers(address);
            CREATE INDEX IF NOT EXISTS idx_transfers_time ON transfers(t_time);
            CREATE TABLE IF NOT EXISTS quotes (
                date TEXT PRIMARY KEY,
                close REAL NOT NULL
            );",
        )
        .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    pub fn insert_events(&self, events: &[TransferEvent]) -> Result<(), SatscopeError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| SatscopeError::Database {
                reason: e.to_string(),
            })?;

        let tx =
            conn.transaction()
                .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        for event in events {
            tx.execute(
                "INSERT INTO transfers (t_time, address, value_satoshis, usd_value)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    event.timestamp.format(TIME_FORMAT).to_string(),
                    event.address,
                    event.value_satoshis,
                    event.usd_value
                ],
            )
            .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }

    pub fn insert_quotes(&self, quotes: &[Quote]) -> Result<(), SatscopeError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| SatscopeError::Database {
                reason: e.to_string(),
            })?;

        let tx =
            conn.transaction()
                .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        for quote in quotes {
            tx.execute(
                "INSERT OR REPLACE INTO quotes (date, close) VALUES (?1, ?2)",
                params![
                    quote.date.format(DATE_FORMAT).to_string(),
                    quote.close_usd
                ],
            )
            .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }
}

fn parse_time(value: &str) -> Result<NaiveDateTime, rusqlite::Error> {
    NaiveDateTime::parse_from_str(value, TIME_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            value.len(),
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

fn parse_date(value: &str) -> Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            value.len(),
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

impl LedgerPort for SqliteAdapter {
    fn fetch_transfer_events(&self, address: &str) -> Result<Vec<TransferEvent>, SatscopeError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| SatscopeError::Database {
                reason: e.to_string(),
            })?;

        // rowid keeps ledger insertion order for same-timestamp events.
        let query = "SELECT t_time, address, value_satoshis, usd_value
                     FROM transfers
                     WHERE address = ?1
                     ORDER BY t_time ASC, rowid ASC";

        let mut stmt =
            conn.prepare(query)
                .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let rows = stmt
            .query_map(params![address], |row| {
                let time_str: String = row.get(0)?;
                Ok(TransferEvent {
                    timestamp: parse_time(&time_str)?,
                    address: row.get(1)?,
                    value_satoshis: row.get(2)?,
                    usd_value: row.get(3)?,
                })
            })
            .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut events = Vec::new();
        for row in rows {
            events.push(
                row.map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                    reason: e.to_string(),
                })?,
            );
        }

        Ok(events)
    }

    fn list_addresses(&self) -> Result<Vec<String>, SatscopeError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| SatscopeError::Database {
                reason: e.to_string(),
            })?;

        let query = "SELECT DISTINCT address FROM transfers ORDER BY address";

        let mut stmt =
            conn.prepare(query)
                .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut addresses = Vec::new();
        for row in rows {
            addresses.push(
                row.map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                    reason: e.to_string(),
                })?,
            );
        }

        Ok(addresses)
    }

    fn activity_range(
        &self,
        address: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SatscopeError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| SatscopeError::Database {
                reason: e.to_string(),
            })?;

        let query =
            "SELECT MIN(t_time), MAX(t_time), COUNT(*) FROM transfers WHERE address = ?1";

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(query, params![address], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        match result {
            (Some(min_str), Some(max_str), count) if count > 0 => {
                let min = NaiveDateTime::parse_from_str(&min_str, TIME_FORMAT)
                    .map_err(|e: chrono::ParseError| SatscopeError::Database {
                        reason: e.to_string(),
                    })?
                    .date();
                let max = NaiveDateTime::parse_from_str(&max_str, TIME_FORMAT)
                    .map_err(|e: chrono::ParseError| SatscopeError::Database {
                        reason: e.to_string(),
                    })?
                    .date();
                Ok(Some((min, max, count as usize)))
            }
            _ => Ok(None),
        }
    }
}

impl QuotePort for SqliteAdapter {
    fn fetch_quotes(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Quote>, SatscopeError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| SatscopeError::Database {
                reason: e.to_string(),
            })?;

        let start_str = start_date.format(DATE_FORMAT).to_string();
        let end_str = end_date.format(DATE_FORMAT).to_string();

        let query = "SELECT date, close FROM quotes
                     WHERE date >= ?1 AND date <= ?2
                     ORDER BY date ASC";

        let mut stmt =
            conn.prepare(query)
                .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let rows = stmt
            .query_map(params![start_str, end_str], |row| {
                let date_str: String = row.get(0)?;
                Ok(Quote {
                    date: parse_date(&date_str)?,
                    close_usd: row.get(1)?,
                })
            })
            .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut quotes = Vec::new();
        for row in rows {
            quotes.push(
                row.map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                    reason: e.to_string(),
                })?,
            );
        }

        Ok(quotes)
    }

    fn quote_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SatscopeError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| SatscopeError::Database {
                reason: e.to_string(),
            })?;

        let query = "SELECT MIN(date), MAX(date), COUNT(*) FROM quotes";

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(query, [], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .map_err(|e: rusqlite::Error| SatscopeError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        match result {
            (Some(min_str), Some(max_str), count) if count > 0 => {
                let min = NaiveDate::parse_from_str(&min_str, DATE_FORMAT).map_err(
                    |e: chrono::ParseError| SatscopeError::Database {
                        reason: e.to_string(),
                    },
                )?;
                let max = NaiveDate::parse_from_str(&max_str, DATE_FORMAT).map_err(
                    |e: chrono::ParseError| SatscopeError::Database {
                        reason: e.to_string(),
                    },
                )?;
                Ok(Some((min, max, count as usize)))
            }
            _ => Ok(None),
        }
    }
}
