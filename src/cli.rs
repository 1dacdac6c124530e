//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analytics::AddressAnalytics;
use crate::domain::balance::BalanceHistory;
use crate::domain::config_validation::{validate_analysis_config, validate_database_config};
use crate::domain::error::SatscopeError;
use crate::domain::metrics::AddressStats;
use crate::domain::ranking::{RankedAddress, RankingFilter};
use crate::domain::watchlist::{parse_addresses, validate_watchlist};
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;
use crate::ports::quote_port::QuotePort;

#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
use crate::adapters::postgres_adapter::PostgresAdapter;
#[cfg(feature = "sqlite")]
use crate::adapters::sqlite_adapter::SqliteAdapter;

#[cfg(not(any(feature = "sqlite", feature = "postgres")))]
compile_error!("enable at least one of the `sqlite` or `postgres` features");

#[derive(Parser, Debug)]
#[command(name = "satscope", about = "Bitcoin address performance analytics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute performance statistics for one address
    Stats {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        address: String,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(long)]
        benchmark_start: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
    /// Reconstruct the daily balance history for one address
    Balance {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        address: String,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
    /// Compute buy-and-hold benchmark metrics for a date window
    Benchmark {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        json: bool,
    },
    /// Rank a batch of addresses by profit, applying threshold filters
    Top {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated address list; defaults to [analysis] addresses,
        /// then to every address in the ledger
        #[arg(long)]
        addresses: Option<String>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(long)]
        min_profit: Option<f64>,
        #[arg(long)]
        min_max_btc: Option<i64>,
        #[arg(long)]
        min_value_ratio: Option<f64>,
        #[arg(long)]
        min_count_out: Option<u32>,
        #[arg(long)]
        first_in_after: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
    /// Load transfer and quote CSV exports into the database
    Import {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        transfers: Option<PathBuf>,
        #[arg(long)]
        quotes: Option<PathBuf>,
    },
    /// Show stored data ranges
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        address: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Stats {
            config,
            address,
            end_date,
            benchmark_start,
            json,
        } => run_stats(&config, &address, end_date, benchmark_start, json),
        Command::Balance {
            config,
            address,
            end_date,
            json,
        } => run_balance(&config, &address, end_date, json),
        Command::Benchmark {
            config,
            start,
            end,
            json,
        } => run_benchmark(&config, start, end, json),
        Command::Top {
            config,
            addresses,
            end_date,
            min_profit,
            min_max_btc,
            min_value_ratio,
            min_count_out,
            first_in_after,
            json,
        } => {
            let filter = build_ranking_filter(
                min_profit,
                min_max_btc,
                min_value_ratio,
                min_count_out,
                first_in_after,
            );
            run_top(&config, addresses.as_deref(), end_date, &filter, json)
        }
        Command::Import {
            config,
            transfers,
            quotes,
        } => run_import(&config, transfers.as_ref(), quotes.as_ref()),
        Command::Info { config, address } => run_info(&config, address.as_deref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = SatscopeError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Analysis end date: explicit argument, then the `[analysis]` section, then
/// today.
pub fn resolve_end_date(arg: Option<NaiveDate>, config: &dyn ConfigPort) -> NaiveDate {
    arg.or_else(|| {
        config
            .get_string("analysis", "end_date")
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
    })
    .unwrap_or_else(|| Local::now().date_naive())
}

/// Benchmark window start: explicit argument, then the `[analysis]` section.
pub fn resolve_benchmark_start(
    arg: Option<NaiveDate>,
    config: &dyn ConfigPort,
) -> Option<NaiveDate> {
    arg.or_else(|| {
        config
            .get_string("analysis", "benchmark_start")
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
    })
}

pub fn build_ranking_filter(
    min_profit: Option<f64>,
    min_max_btc: Option<i64>,
    min_value_ratio: Option<f64>,
    min_count_out: Option<u32>,
    first_in_after: Option<NaiveDate>,
) -> RankingFilter {
    RankingFilter {
        profit2btc_min: min_profit,
        max_btc_min: min_max_btc,
        btcvalue_ratio_min: min_value_ratio,
        count_out_min: min_count_out,
        first_in_after,
    }
}

#[cfg(feature = "sqlite")]
fn open_adapter(config: &dyn ConfigPort) -> Result<SqliteAdapter, SatscopeError> {
    SqliteAdapter::from_config(config)
}

#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
fn open_adapter(config: &dyn ConfigPort) -> Result<PostgresAdapter, SatscopeError> {
    PostgresAdapter::from_config(config)
}

fn setup(config_path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    let adapter = load_config(config_path)?;
    if let Err(e) = validate_analysis_config(&adapter) {
        eprintln!("error: {e}");
        return Err(ExitCode::from(&e));
    }
    if let Err(e) = validate_database_config(&adapter) {
        eprintln!("error: {e}");
        return Err(ExitCode::from(&e));
    }
    Ok(adapter)
}

fn run_stats(
    config_path: &PathBuf,
    address: &str,
    end_date: Option<NaiveDate>,
    benchmark_start: Option<NaiveDate>,
    json: bool,
) -> ExitCode {
    let config = match setup(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data = match open_adapter(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let end = resolve_end_date(end_date, &config);
    let bench_start = resolve_benchmark_start(benchmark_start, &config);

    let analytics = AddressAnalytics::new(&data, &data);
    let report = match analytics.address_report(address, end, bench_start) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    for warning in &report.history.warnings {
        eprintln!("Warning: {warning}");
    }

    if json {
        print_json(&report.stats)
    } else {
        print_stats(&report.stats);
        ExitCode::SUCCESS
    }
}

fn run_balance(
    config_path: &PathBuf,
    address: &str,
    end_date: Option<NaiveDate>,
    json: bool,
) -> ExitCode {
    let config = match setup(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data = match open_adapter(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let end = resolve_end_date(end_date, &config);

    let analytics = AddressAnalytics::new(&data, &data);
    let history = match analytics.balance_history(address, end) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    for warning in &history.warnings {
        eprintln!("Warning: {warning}");
    }

    if json {
        print_json(&history)
    } else {
        print_balance(&history);
        ExitCode::SUCCESS
    }
}

fn run_benchmark(config_path: &PathBuf, start: NaiveDate, end: NaiveDate, json: bool) -> ExitCode {
    let config = match setup(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data = match open_adapter(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let analytics = AddressAnalytics::new(&data, &data);
    let benchmark = match analytics.benchmark(start, end) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    if json {
        print_json(&benchmark)
    } else {
        println!("Benchmark {start} → {end}");
        println!("  Profit:   {}", fmt_pct(benchmark.profit_pct));
        println!("  Sharpe:   {}", fmt_sharpe(benchmark.sharpe));
        println!("  Drawdown: {}", fmt_pct(benchmark.drawdown));
        ExitCode::SUCCESS
    }
}

fn run_top(
    config_path: &PathBuf,
    addresses: Option<&str>,
    end_date: Option<NaiveDate>,
    filter: &RankingFilter,
    json: bool,
) -> ExitCode {
    let config = match setup(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data = match open_adapter(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let requested = match resolve_addresses(addresses, &config, &data) {
        Ok(list) => list,
        Err(code) => return code,
    };

    eprintln!("Evaluating {} addresses...", requested.len());
    let watchlist = validate_watchlist(&data, requested);

    let end = resolve_end_date(end_date, &config);
    let analytics = AddressAnalytics::new(&data, &data);
    let ranked = match analytics.ranked_addresses(&watchlist.active, end, filter) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    if json {
        print_json(&ranked)
    } else {
        print_ranked(&ranked);
        ExitCode::SUCCESS
    }
}

fn run_import(
    config_path: &PathBuf,
    transfers: Option<&PathBuf>,
    quotes: Option<&PathBuf>,
) -> ExitCode {
    if transfers.is_none() && quotes.is_none() {
        eprintln!("error: nothing to import, pass --transfers and/or --quotes");
        return ExitCode::from(2);
    }

    let config = match setup(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    import_into_database(&config, transfers, quotes)
}

#[cfg(feature = "sqlite")]
fn import_into_database(
    config: &dyn ConfigPort,
    transfers: Option<&PathBuf>,
    quotes: Option<&PathBuf>,
) -> ExitCode {
    use crate::adapters::csv_adapter;

    let data = match SqliteAdapter::from_config(config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };
    if let Err(e) = data.initialize_schema() {
        eprintln!("error: {e}");
        return ExitCode::from(&e);
    }

    if let Some(path) = transfers {
        let events = match csv_adapter::read_transfer_events(path) {
            Ok(ev) => ev,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        };
        if let Err(e) = data.insert_events(&events) {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
        eprintln!("Imported {} transfer events from {}", events.len(), path.display());
    }

    if let Some(path) = quotes {
        let parsed = match csv_adapter::read_quotes(path) {
            Ok(q) => q,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        };
        if let Err(e) = data.insert_quotes(&parsed) {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
        eprintln!("Imported {} quotes from {}", parsed.len(), path.display());
    }

    ExitCode::SUCCESS
}

#[cfg(not(feature = "sqlite"))]
fn import_into_database(
    _config: &dyn ConfigPort,
    _transfers: Option<&PathBuf>,
    _quotes: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("error: import requires the sqlite feature");
    ExitCode::from(2)
}

fn run_info(config_path: &PathBuf, address: Option<&str>) -> ExitCode {
    let config = match setup(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data = match open_adapter(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    match data.quote_range() {
        Ok(Some((min, max, count))) => {
            println!("Quotes: {count} rows, {min} → {max}");
        }
        Ok(None) => println!("Quotes: none stored"),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    }

    match address {
        Some(addr) => match data.activity_range(addr) {
            Ok(Some((min, max, count))) => {
                println!("{addr}: {count} events, {min} → {max}");
                ExitCode::SUCCESS
            }
            Ok(None) => {
                println!("{addr}: no ledger activity");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::from(&e)
            }
        },
        None => match data.list_addresses() {
            Ok(addresses) => {
                println!("Addresses: {}", addresses.len());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::from(&e)
            }
        },
    }
}

fn resolve_addresses(
    arg: Option<&str>,
    config: &dyn ConfigPort,
    ledger: &dyn LedgerPort,
) -> Result<Vec<String>, ExitCode> {
    let source = arg
        .map(str::to_string)
        .or_else(|| config.get_string("analysis", "addresses"));

    match source {
        Some(list) => parse_addresses(&list).map_err(|e| {
            let err = SatscopeError::ConfigInvalid {
                section: "analysis".to_string(),
                key: "addresses".to_string(),
                reason: e.to_string(),
            };
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }),
        None => ledger.list_addresses().map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }),
    }
}

fn fmt_pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn fmt_sharpe(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.4}", v),
        None => "undefined".to_string(),
    }
}

fn print_stats(stats: &AddressStats) {
    println!("Address:            {}", stats.address);
    println!("Profit:             {}", fmt_pct(stats.profit_pct));
    println!("Sharpe ratio:       {}", fmt_sharpe(stats.sharpe_ratio));
    println!("Max drawdown:       {}", fmt_pct(stats.drawdown));
    println!("Exposure:           {:.4}", stats.exposure);
    println!("Days in market:     {}", stats.count_days_in_market);
    println!("Benchmark profit:   {}", fmt_pct(stats.benchmark_profit));
    println!("Benchmark Sharpe:   {}", fmt_sharpe(stats.benchmark_sharpe));
    println!("Benchmark drawdown: {}", fmt_pct(stats.benchmark_drawdown));
}

fn print_balance(history: &BalanceHistory) {
    println!("date,balance_satoshis,balance_usd");
    for sample in &history.samples {
        println!(
            "{},{},{:.2}",
            sample.date, sample.balance_satoshis, sample.balance_usd
        );
    }
}

fn print_ranked(ranked: &[RankedAddress]) {
    if ranked.is_empty() {
        println!("No addresses matched the filter.");
        return;
    }
    for (i, entry) in ranked.iter().enumerate() {
        println!(
            "{:>3}. {}  profit {}  sharpe {}  drawdown {}  days {}",
            i + 1,
            entry.stats.address,
            fmt_pct(entry.stats.profit_pct),
            fmt_sharpe(entry.stats.sharpe_ratio),
            fmt_pct(entry.stats.drawdown),
            entry.stats.count_days_in_market
        );
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{s}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize output: {e}");
            ExitCode::from(1)
        }
    }
}
