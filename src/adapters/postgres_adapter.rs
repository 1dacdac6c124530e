//! PostgreSQL data adapter.
//!
//! The pooled counterpart to the SQLite adapter; both expose the same ports
//! and are interchangeable at construction time.

use crate::domain::error::SatscopeError;
use crate::domain::quote::Quote;
use crate::domain::transfer::TransferEvent;
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;
use crate::ports::quote_port::QuotePort;
use chrono::{NaiveDate, NaiveDateTime};
use postgres::NoTls;
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;

pub struct PostgresAdapter {
    pool: Pool<PostgresConnectionManager<NoTls>>,
}

impl PostgresAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SatscopeError> {
        // Try [postgres] connection_string first, fall back to [database] conninfo
        let connection_string = config
            .get_string("postgres", "connection_string")
            .or_else(|| config.get_string("database", "conninfo"))
            .ok_or_else(|| SatscopeError::ConfigMissing {
                section: "database".into(),
                key: "conninfo".into(),
            })?;

        let pool_size = config.get_int("postgres", "pool_size", 4) as u32;

        let manager = PostgresConnectionManager::new(
            connection_string
                .parse()
                .map_err(|e: postgres::Error| SatscopeError::Database {
                    reason: e.to_string(),
                })?,
            NoTls,
        );
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| SatscopeError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }
}

impl LedgerPort for PostgresAdapter {
    fn fetch_transfer_events(&self, address: &str) -> Result<Vec<TransferEvent>, SatscopeError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| SatscopeError::Database {
                reason: e.to_string(),
            })?;

        // ctid keeps ledger insertion order for same-timestamp events.
        let query = "SELECT t_time, address, value_satoshis::bigint, \
                            usd_value::double precision \
                     FROM public.transfers \
                     WHERE address = $1 \
                     ORDER BY t_time ASC, ctid ASC";

        let rows = conn
            .query(query, &[&address])
            .map_err(|e: postgres::Error| SatscopeError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let timestamp: NaiveDateTime = row.get(0);
            events.push(TransferEvent {
                timestamp,
                address: row.get(1),
                value_satoshis: row.get(2),
                usd_value: row.get(3),
            });
        }

        Ok(events)
    }

    fn list_addresses(&self) -> Result<Vec<String>, SatscopeError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| SatscopeError::Database {
                reason: e.to_string(),
            })?;

        let query = "SELECT DISTINCT address FROM public.transfers ORDER BY address";

        let rows = conn
            .query(query, &[])
            .map_err(|e: postgres::Error| SatscopeError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    fn activity_range(
        &self,
        address: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SatscopeError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| SatscopeError::Database {
                reason: e.to_string(),
            })?;

        let query = "SELECT MIN(t_time), MAX(t_time), COUNT(*)::bigint \
                     FROM public.transfers WHERE address = $1";

        let row = conn
            .query_one(query, &[&address])
            .map_err(|e: postgres::Error| SatscopeError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let min: Option<NaiveDateTime> = row.get(0);
        let max: Option<NaiveDateTime> = row.get(1);
        let count: i64 = row.get(2);

        match (min, max) {
            (Some(min), Some(max)) if count > 0 => {
                Ok(Some((min.date(), max.date(), count as usize)))
            }
            _ => Ok(None),
        }
    }
}

impl QuotePort for PostgresAdapter {
    fn fetch_quotes(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Quote>, SatscopeError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| SatscopeError::Database {
                reason: e.to_string(),
            })?;

        let query = "SELECT date, close::double precision \
                     FROM public.quotes \
                     WHERE date >= $1 AND date <= $2 \
                     ORDER BY date ASC";

        let rows = conn
            .query(query, &[&start_date, &end_date])
            .map_err(|e: postgres::Error| SatscopeError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(rows
            .iter()
            .map(|row| Quote {
                date: row.get(0),
                close_usd: row.get(1),
            })
            .collect())
    }

    fn quote_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SatscopeError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| SatscopeError::Database {
                reason: e.to_string(),
            })?;

        let query = "SELECT MIN(date), MAX(date), COUNT(*)::bigint FROM public.quotes";

        let row = conn
            .query_one(query, &[])
            .map_err(|e: postgres::Error| SatscopeError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let min: Option<NaiveDate> = row.get(0);
        let max: Option<NaiveDate> = row.get(1);
        let count: i64 = row.get(2);

        match (min, max) {
            (Some(min), Some(max)) if count > 0 => Ok(Some((min, max, count as usize))),
            _ => Ok(None),
        }
    }
}
