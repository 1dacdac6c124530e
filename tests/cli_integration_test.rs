//! CLI orchestration tests.
//!
//! Tests cover:
//! - Config loading and date/filter resolution helpers
//! - CSV ingest into a file-backed SQLite database
//! - Stats over an imported database (the `import` → `stats` path)

mod common;

use chrono::NaiveDate;
use common::*;
use satscope::adapters::file_config_adapter::FileConfigAdapter;
use satscope::cli;
use satscope::domain::config_validation::{validate_analysis_config, validate_database_config};
use std::io::Write;
use std::path::PathBuf;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[sqlite]
path = /tmp/satscope-test.db
pool_size = 2

[analysis]
end_date = 2020-01-10
benchmark_start = 2020-01-01
addresses = bc1qaaa,bc1qbbb
"#;

#[test]
fn load_config_reads_ini_from_disk() {
    let file = write_temp_ini(VALID_INI);
    let config = cli::load_config(&file.path().to_path_buf()).unwrap();
    assert!(validate_analysis_config(&config).is_ok());
    assert!(validate_database_config(&config).is_ok());
}

#[test]
fn load_config_missing_file_fails() {
    let result = cli::load_config(&PathBuf::from("/nonexistent/satscope.ini"));
    assert!(result.is_err());
}

#[test]
fn end_date_prefers_argument_over_config() {
    let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
    let arg = Some(date(2021, 6, 1));
    assert_eq!(cli::resolve_end_date(arg, &config), date(2021, 6, 1));
}

#[test]
fn end_date_falls_back_to_config() {
    let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
    assert_eq!(cli::resolve_end_date(None, &config), date(2020, 1, 10));
}

#[test]
fn end_date_defaults_to_today_without_config_key() {
    let config = FileConfigAdapter::from_string("[sqlite]\npath = a.db\n").unwrap();
    let resolved = cli::resolve_end_date(None, &config);
    assert_eq!(resolved, chrono::Local::now().date_naive());
}

#[test]
fn benchmark_start_falls_back_to_config() {
    let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
    assert_eq!(
        cli::resolve_benchmark_start(None, &config),
        Some(date(2020, 1, 1))
    );
    assert_eq!(
        cli::resolve_benchmark_start(Some(date(2019, 1, 1)), &config),
        Some(date(2019, 1, 1))
    );
}

#[test]
fn ranking_filter_maps_cli_flags() {
    let filter = cli::build_ranking_filter(
        Some(1.5),
        Some(100_000_000),
        Some(0.5),
        Some(3),
        Some(date(2020, 1, 1)),
    );

    assert_eq!(filter.profit2btc_min, Some(1.5));
    assert_eq!(filter.max_btc_min, Some(100_000_000));
    assert_eq!(filter.btcvalue_ratio_min, Some(0.5));
    assert_eq!(filter.count_out_min, Some(3));
    assert_eq!(filter.first_in_after, Some(date(2020, 1, 1)));

    let empty = cli::build_ranking_filter(None, None, None, None, None);
    assert!(empty.is_unconstrained());
}

#[cfg(feature = "sqlite")]
mod import_path {
    use super::*;
    use satscope::adapters::csv_adapter;
    use satscope::adapters::sqlite_adapter::SqliteAdapter;
    use satscope::domain::analytics::AddressAnalytics;
    use std::fs;

    #[test]
    fn csv_import_feeds_the_stats_pipeline() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("satscope.db");

        let transfers_path = dir.path().join("transfers.csv");
        fs::write(
            &transfers_path,
            "time,address,value_satoshis,usd_value\n\
             2020-01-02 10:00:00,bc1qcsv,100000000,7100.0\n\
             2020-01-04 12:00:00,bc1qcsv,-50000000,3575.0\n",
        )
        .unwrap();

        let quotes_path = dir.path().join("quotes.csv");
        fs::write(
            &quotes_path,
            "date,close\n\
             2020-01-01,7000.0\n\
             2020-01-02,7100.0\n\
             2020-01-03,7200.0\n\
             2020-01-04,7150.0\n\
             2020-01-05,7300.0\n",
        )
        .unwrap();

        let ini = format!("[sqlite]\npath = {}\npool_size = 1\n", db_path.display());
        let config = FileConfigAdapter::from_string(&ini).unwrap();

        let adapter = SqliteAdapter::from_config(&config).unwrap();
        adapter.initialize_schema().unwrap();
        adapter
            .insert_events(&csv_adapter::read_transfer_events(&transfers_path).unwrap())
            .unwrap();
        adapter
            .insert_quotes(&csv_adapter::read_quotes(&quotes_path).unwrap())
            .unwrap();

        let analytics = AddressAnalytics::new(&adapter, &adapter);
        let report = analytics
            .address_report("bc1qcsv", date(2020, 1, 5), None)
            .unwrap();

        assert_eq!(report.history.len(), 4);
        assert_eq!(report.history.samples[0].balance_satoshis, 100_000_000);
        assert_eq!(report.history.samples[3].balance_satoshis, 50_000_000);
        assert_eq!(report.stats.count_days_in_market, 4);
        assert!(report.stats.sharpe_ratio.is_some());
    }

    #[test]
    fn reopening_the_database_preserves_imported_data() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("satscope.db");
        let ini = format!("[sqlite]\npath = {}\npool_size = 1\n", db_path.display());
        let config = FileConfigAdapter::from_string(&ini).unwrap();

        {
            let adapter = SqliteAdapter::from_config(&config).unwrap();
            adapter.initialize_schema().unwrap();
            adapter
                .insert_events(&[make_event(
                    "bc1qkeep",
                    "2020-01-01 10:00:00",
                    100_000_000,
                    7_000.0,
                )])
                .unwrap();
        }

        let reopened = SqliteAdapter::from_config(&config).unwrap();
        use satscope::ports::ledger_port::LedgerPort;
        let events = reopened.fetch_transfer_events("bc1qkeep").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].value_satoshis, 100_000_000);
    }
}

#[test]
fn parse_naive_date_arguments() {
    // The CLI relies on NaiveDate's FromStr for --end-date style arguments.
    let parsed: NaiveDate = "2020-01-10".parse().unwrap();
    assert_eq!(parsed, date(2020, 1, 10));
    assert!("2020/01/10".parse::<NaiveDate>().is_err());
}
