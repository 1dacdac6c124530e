//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for satscope.
#[derive(Debug, thiserror::Error)]
pub enum SatscopeError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no quote available on or before {date}")]
    DataUnavailable { date: NaiveDate },

    #[error("invalid analysis window: end {end} precedes start {start}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SatscopeError> for std::process::ExitCode {
    fn from(err: &SatscopeError) -> Self {
        let code: u8 = match err {
            SatscopeError::Io(_) => 1,
            SatscopeError::ConfigParse { .. }
            | SatscopeError::ConfigMissing { .. }
            | SatscopeError::ConfigInvalid { .. } => 2,
            SatscopeError::Database { .. } | SatscopeError::DatabaseQuery { .. } => 3,
            SatscopeError::InvalidWindow { .. } => 4,
            SatscopeError::DataUnavailable { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
