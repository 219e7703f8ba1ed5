//! Crosslab CLI: run, fetch, and cache management commands.
//!
//! Commands:
//! - `run`: backtest one or more symbols and print a JSON report per symbol
//! - `fetch`: download daily bars from Alpha Vantage into the CSV cache
//! - `cache status`: list cached symbols and their date ranges

mod logging;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{error, info, Level};

use crosslab_core::data::{
    AlphaVantageProvider, CachedProvider, CsvCache, PriceSeriesProvider, SyntheticProvider,
};
use crosslab_runner::{run_backtest_detailed, run_batch, BacktestConfig, BacktestRequest};

use logging::{init_logging, LogFormat};

#[derive(Parser)]
#[command(
    name = "crosslab",
    version,
    about = "Crosslab CLI: moving-average crossover backtesting"
)]
struct Cli {
    /// Log output format (logs go to stderr).
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest one or more symbols.
    Run {
        /// Symbols to backtest (e.g., SPY QQQ AAPL).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Initial capital.
        #[arg(long)]
        capital: Decimal,

        /// Short moving-average window. Defaults to the config value (20).
        #[arg(long)]
        short: Option<usize>,

        /// Long moving-average window. Defaults to the config value (50).
        #[arg(long)]
        long: Option<usize>,

        #[command(flatten)]
        source: SourceArgs,

        /// Offline mode: serve from the cache only.
        #[arg(long, default_value_t = false, conflicts_with = "synthetic")]
        offline: bool,

        /// Use deterministic synthetic data instead of the cache or network.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Print the full run (positions, trades, equity curve) instead of the report.
        #[arg(long, default_value_t = false)]
        detailed: bool,
    },
    /// Download daily bars from Alpha Vantage into the cache.
    Fetch {
        /// Symbols to fetch.
        #[arg(required = true)]
        symbols: Vec<String>,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached symbols, date ranges, and bar counts.
    Status {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Cache directory. Defaults to the config value (./data).
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
}

/// Options shared by commands that read market data.
#[derive(clap::Args)]
struct SourceArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cache directory. Defaults to the config value (./data).
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Alpha Vantage API key.
    #[arg(long, env = "ALPHA_VANTAGE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Last date of history to use (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

impl SourceArgs {
    fn as_of(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, Level::INFO);

    match cli.command {
        Commands::Run {
            symbols,
            capital,
            short,
            long,
            source,
            offline,
            synthetic,
            detailed,
        } => run_cmd(symbols, capital, short, long, &source, offline, synthetic, detailed),
        Commands::Fetch { symbols, source } => fetch_cmd(&symbols, &source),
        Commands::Cache { action } => match action {
            CacheAction::Status { config, cache_dir } => {
                let config = load_config(config.as_deref())?;
                let cache_dir = cache_dir.unwrap_or(config.data.cache_dir);
                cache_status_cmd(&cache_dir)
            }
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<BacktestConfig> {
    match path {
        Some(path) => BacktestConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(BacktestConfig::default()),
    }
}

fn remote_provider(
    config: &BacktestConfig,
    source: &SourceArgs,
) -> Result<AlphaVantageProvider> {
    let Some(api_key) = source.api_key.as_deref().filter(|k| !k.is_empty()) else {
        bail!("no Alpha Vantage API key: set ALPHA_VANTAGE_API_KEY or pass --api-key (or use --offline / --synthetic)");
    };
    Ok(AlphaVantageProvider::new(
        config.alpha_vantage_config(api_key),
        config.history_window(),
    )?)
}

fn build_provider(
    config: &BacktestConfig,
    source: &SourceArgs,
    offline: bool,
    synthetic: bool,
) -> Result<Box<dyn PriceSeriesProvider>> {
    let window = config.history_window();
    if synthetic {
        return Ok(Box::new(SyntheticProvider::new(window)));
    }

    let cache_dir = source
        .cache_dir
        .clone()
        .unwrap_or_else(|| config.data.cache_dir.clone());
    let cache = CsvCache::new(cache_dir);
    if offline {
        return Ok(Box::new(CachedProvider::offline(cache, window)));
    }
    let remote = remote_provider(config, source)?;
    Ok(Box::new(CachedProvider::new(cache, Box::new(remote), window)))
}

#[allow(clippy::too_many_arguments)]
fn run_cmd(
    symbols: Vec<String>,
    capital: Decimal,
    short: Option<usize>,
    long: Option<usize>,
    source: &SourceArgs,
    offline: bool,
    synthetic: bool,
    detailed: bool,
) -> Result<()> {
    let config = load_config(source.config.as_deref())?;
    let provider = build_provider(&config, source, offline, synthetic)?;
    let request = BacktestRequest::from_config(&config, capital, source.as_of()).with_windows(
        short.unwrap_or(config.strategy.short_window),
        long.unwrap_or(config.strategy.long_window),
    );

    let mut failures = 0usize;
    if detailed {
        for symbol in &symbols {
            let value = match run_backtest_detailed(provider.as_ref(), symbol, &request) {
                Ok(run) => serde_json::to_value(run)?,
                Err(e) => {
                    failures += 1;
                    with_symbol(serde_json::to_value(e.to_structured())?, symbol)
                }
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    } else {
        for entry in run_batch(provider.as_ref(), &symbols, &request) {
            let value = match &entry.result {
                Ok(report) => serde_json::to_value(report)?,
                Err(e) => {
                    failures += 1;
                    serde_json::to_value(e.to_structured())?
                }
            };
            println!("{}", serde_json::to_string(&with_symbol(value, &entry.symbol))?);
        }
    }

    if failures > 0 {
        error!(failures, total = symbols.len(), "some backtests failed");
        std::process::exit(1);
    }
    Ok(())
}

fn with_symbol(mut value: Value, symbol: &str) -> Value {
    if let Some(obj) = value.as_object_mut() {
        obj.insert("symbol".into(), Value::String(symbol.to_string()));
    }
    value
}

fn fetch_cmd(symbols: &[String], source: &SourceArgs) -> Result<()> {
    let config = load_config(source.config.as_deref())?;
    let cache_dir = source
        .cache_dir
        .clone()
        .unwrap_or_else(|| config.data.cache_dir.clone());
    let remote = remote_provider(&config, source)?;
    let provider = CachedProvider::new(
        CsvCache::new(&cache_dir),
        Box::new(remote),
        config.history_window(),
    );
    let failures = fetch_symbols(&provider, symbols, source.as_of(), &cache_dir);
    if failures > 0 {
        error!(failures, total = symbols.len(), "some fetches failed");
        std::process::exit(1);
    }
    Ok(())
}

/// Refresh every symbol into the cache. Returns the number of failures.
fn fetch_symbols(
    provider: &CachedProvider,
    symbols: &[String],
    as_of: NaiveDate,
    cache_dir: &Path,
) -> usize {
    let mut failures = 0usize;
    for symbol in symbols {
        match provider.refresh(symbol, as_of) {
            Ok(bars) => {
                info!(symbol = %symbol, bars = bars.len(), "fetched");
                println!("{symbol}: {} bars cached in {}", bars.len(), cache_dir.display());
            }
            Err(e) => {
                failures += 1;
                error!(symbol = %symbol, error = %e, "fetch failed");
            }
        }
    }
    failures
}

fn cache_status_cmd(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let rows = CsvCache::new(cache_dir).status()?;
    if rows.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    println!("Cache: {}", cache_dir.display());
    println!("Symbols: {}", rows.len());
    println!();
    println!(
        "{:<8} {:<25} {:>8} {:<20}",
        "Symbol", "Date Range", "Bars", "Cached At"
    );
    println!("{}", "-".repeat(64));
    for row in &rows {
        println!(
            "{:<8} {:<25} {:>8} {:<20}",
            row.symbol,
            format!("{} to {}", row.start_date, row.end_date),
            row.bar_count,
            row.cached_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }

    Ok(())
}
