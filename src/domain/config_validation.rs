//! Configuration validation.
//!
//! Checks config fields before any data access runs.

use crate::domain::error::SatscopeError;
use crate::domain::watchlist::parse_addresses;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

/// Validate the `[analysis]` section. Every key is optional; present keys
/// must be well formed.
pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), SatscopeError> {
    let end_date = validate_optional_date(config, "end_date")?;
    let benchmark_start = validate_optional_date(config, "benchmark_start")?;

    if let (Some(start), Some(end)) = (benchmark_start, end_date) {
        if end < start {
            return Err(SatscopeError::ConfigInvalid {
                section: "analysis".to_string(),
                key: "benchmark_start".to_string(),
                reason: "benchmark_start must not be after end_date".to_string(),
            });
        }
    }

    validate_addresses(config)?;
    Ok(())
}

/// Validate that a usable data-source section exists: either `[sqlite] path`
/// or a PostgreSQL connection string.
pub fn validate_database_config(config: &dyn ConfigPort) -> Result<(), SatscopeError> {
    let sqlite_path = config.get_string("sqlite", "path");
    let conninfo = config
        .get_string("postgres", "connection_string")
        .or_else(|| config.get_string("database", "conninfo"));

    match (sqlite_path, conninfo) {
        (Some(p), _) if !p.trim().is_empty() => Ok(()),
        (_, Some(c)) if !c.trim().is_empty() => Ok(()),
        _ => Err(SatscopeError::ConfigMissing {
            section: "sqlite".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn validate_optional_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, SatscopeError> {
    match config.get_string("analysis", key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| SatscopeError::ConfigInvalid {
                section: "analysis".to_string(),
                key: key.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", key),
            }),
    }
}

fn validate_addresses(config: &dyn ConfigPort) -> Result<(), SatscopeError> {
    match config.get_string("analysis", "addresses") {
        None => Ok(()),
        Some(s) => parse_addresses(&s)
            .map(|_| ())
            .map_err(|e| SatscopeError::ConfigInvalid {
                section: "analysis".to_string(),
                key: "addresses".to_string(),
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn empty_analysis_section_passes() {
        let config = make_config("[analysis]\n");
        assert!(validate_analysis_config(&config).is_ok());
    }

    #[test]
    fn valid_analysis_config_passes() {
        let config = make_config(
            r#"
[analysis]
end_date = 2023-10-01
benchmark_start = 2020-01-01
addresses = bc1qaaa,bc1qbbb
"#,
        );
        assert!(validate_analysis_config(&config).is_ok());
    }

    #[test]
    fn invalid_end_date_format_fails() {
        let config = make_config("[analysis]\nend_date = 2023/10/01\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, SatscopeError::ConfigInvalid { key, .. } if key == "end_date"));
    }

    #[test]
    fn invalid_benchmark_start_format_fails() {
        let config = make_config("[analysis]\nbenchmark_start = yesterday\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(
            matches!(err, SatscopeError::ConfigInvalid { key, .. } if key == "benchmark_start")
        );
    }

    #[test]
    fn benchmark_start_after_end_date_fails() {
        let config =
            make_config("[analysis]\nend_date = 2020-01-01\nbenchmark_start = 2023-10-01\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(
            matches!(err, SatscopeError::ConfigInvalid { key, .. } if key == "benchmark_start")
        );
    }

    #[test]
    fn malformed_addresses_fail() {
        let config = make_config("[analysis]\naddresses = bc1qaaa,,bc1qbbb\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, SatscopeError::ConfigInvalid { key, .. } if key == "addresses"));
    }

    #[test]
    fn sqlite_path_satisfies_database_config() {
        let config = make_config("[sqlite]\npath = /var/lib/satscope.db\n");
        assert!(validate_database_config(&config).is_ok());
    }

    #[test]
    fn conninfo_satisfies_database_config() {
        let config = make_config("[database]\nconninfo = host=localhost dbname=btc\n");
        assert!(validate_database_config(&config).is_ok());
    }

    #[test]
    fn missing_data_source_fails() {
        let config = make_config("[analysis]\nend_date = 2023-10-01\n");
        let err = validate_database_config(&config).unwrap_err();
        assert!(matches!(err, SatscopeError::ConfigMissing { section, .. } if section == "sqlite"));
    }
}
