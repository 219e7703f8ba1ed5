//! CSV cache layer with Hive-style partitioning.
//!
//! Layout: `{cache_dir}/symbol={SYMBOL}/bars.csv` plus a `meta.json` sidecar.
//!
//! - Upserts keyed by date: a re-fetched bar replaces the cached one.
//! - Atomic writes (write to a uniquely named temp file, rename into place),
//!   so concurrent upserts of one symbol never share a partial file.
//! - Integrity validation on load; corrupt files are quarantined
//!   (`bars.csv.quarantined`) and treated as a cache miss.
//! - Metadata sidecar per symbol (hash, date range, bar count).

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use super::provider::{HistoryWindow, ProviderError};
use crate::domain::{validate_series, Bar};

const BARS_FILE: &str = "bars.csv";
const META_FILE: &str = "meta.json";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("metadata error: {0}")]
    Meta(#[from] serde_json::Error),

    #[error("invalid symbol for cache path: '{0}'")]
    InvalidSymbol(String),

    #[error("corrupt cache file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

impl From<CacheError> for ProviderError {
    fn from(e: CacheError) -> Self {
        ProviderError::Cache(e.to_string())
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> CacheError + '_ {
    move |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Metadata sidecar for a cached symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMeta {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bar_count: usize,
    pub data_hash: String,
    pub source: String,
    pub cached_at: NaiveDateTime,
}

/// Cache status for a single symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatus {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bar_count: usize,
    pub cached_at: NaiveDateTime,
}

/// On-disk row. Prices are written as exact decimal strings.
#[derive(Debug, Serialize, Deserialize)]
struct CacheRow {
    date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    open: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    high: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    low: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    close: Decimal,
    volume: u64,
}

impl From<&Bar> for CacheRow {
    fn from(bar: &Bar) -> Self {
        Self {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

impl From<CacheRow> for Bar {
    fn from(row: CacheRow) -> Self {
        Bar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

/// The CSV cache.
#[derive(Debug, Clone)]
pub struct CsvCache {
    cache_dir: PathBuf,
}

impl CsvCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Root directory of the cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Directory for a specific symbol: `{cache_dir}/symbol={SYMBOL}/`
    fn symbol_dir(&self, symbol: &str) -> Result<PathBuf, CacheError> {
        let valid = !symbol.is_empty()
            && symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '^'))
            && symbol != "."
            && symbol != "..";
        if !valid {
            return Err(CacheError::InvalidSymbol(symbol.to_string()));
        }
        Ok(self.cache_dir.join(format!("symbol={symbol}")))
    }

    fn bars_path(&self, symbol: &str) -> Result<PathBuf, CacheError> {
        Ok(self.symbol_dir(symbol)?.join(BARS_FILE))
    }

    fn meta_path(&self, symbol: &str) -> Result<PathBuf, CacheError> {
        Ok(self.symbol_dir(symbol)?.join(META_FILE))
    }

    /// Load all cached bars for a symbol, ascending by date.
    ///
    /// Returns `Ok(None)` on a miss. A file that fails to parse or validate is
    /// quarantined and reported as a miss.
    pub fn load(&self, symbol: &str) -> Result<Option<Vec<Bar>>, CacheError> {
        let path = self.bars_path(symbol)?;
        if !path.exists() {
            return Ok(None);
        }

        match read_bars(&path) {
            Ok(bars) => Ok(Some(bars)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "quarantining corrupt cache file");
                let quarantine = path.with_extension("csv.quarantined");
                fs::rename(&path, &quarantine).map_err(io_err(&path))?;
                if let Ok(meta_path) = self.meta_path(symbol) {
                    let _ = fs::remove_file(meta_path);
                }
                Ok(None)
            }
        }
    }

    /// Cached bars for `symbol` inside `window` ending at `as_of`.
    ///
    /// A cache holding no bars in that range is a miss.
    pub fn load_window(
        &self,
        symbol: &str,
        window: HistoryWindow,
        as_of: NaiveDate,
    ) -> Result<Option<Vec<Bar>>, CacheError> {
        Ok(self
            .load(symbol)?
            .map(|bars| window.clip(&bars, as_of))
            .filter(|bars| !bars.is_empty()))
    }

    /// Merge `bars` into the cached series for `symbol`, replacing bars that
    /// share a date. Returns the merged series length.
    pub fn upsert(&self, symbol: &str, bars: &[Bar], source: &str) -> Result<usize, CacheError> {
        let dir = self.symbol_dir(symbol)?;
        fs::create_dir_all(&dir).map_err(io_err(&dir))?;

        let mut merged: BTreeMap<NaiveDate, Bar> = self
            .load(symbol)?
            .unwrap_or_default()
            .into_iter()
            .map(|bar| (bar.date, bar))
            .collect();
        for bar in bars {
            merged.insert(bar.date, bar.clone());
        }
        let merged: Vec<Bar> = merged.into_values().collect();

        let (Some(first), Some(last)) = (merged.first(), merged.last()) else {
            return Ok(0);
        };
        let (start_date, end_date) = (first.date, last.date);

        write_bars(&dir, &dir.join(BARS_FILE), &merged)?;

        let meta = CacheMeta {
            symbol: symbol.to_string(),
            start_date,
            end_date,
            bar_count: merged.len(),
            data_hash: hash_bars(&merged)?,
            source: source.to_string(),
            cached_at: chrono::Local::now().naive_local(),
        };
        let meta_path = dir.join(META_FILE);
        let mut meta_tmp = NamedTempFile::new_in(&dir).map_err(io_err(&dir))?;
        meta_tmp
            .write_all(serde_json::to_string_pretty(&meta)?.as_bytes())
            .map_err(io_err(&meta_path))?;
        meta_tmp
            .persist(&meta_path)
            .map_err(|e| io_err(&meta_path)(e.error))?;

        debug!(symbol, bars = merged.len(), %start_date, %end_date, "cache updated");
        Ok(merged.len())
    }

    /// Metadata for a cached symbol, if present and readable.
    pub fn get_meta(&self, symbol: &str) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path(symbol).ok()?).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Status of every cached symbol, sorted by symbol.
    pub fn status(&self) -> Result<Vec<CacheStatus>, CacheError> {
        if !self.cache_dir.exists() {
            return Ok(Vec::new());
        }

        let mut statuses = Vec::new();
        for entry in fs::read_dir(&self.cache_dir).map_err(io_err(&self.cache_dir))? {
            let entry = entry.map_err(io_err(&self.cache_dir))?;
            let name = entry.file_name();
            let Some(symbol) = name.to_str().and_then(|n| n.strip_prefix("symbol=")) else {
                continue;
            };
            if let Some(meta) = self.get_meta(symbol) {
                statuses.push(CacheStatus {
                    symbol: meta.symbol,
                    start_date: meta.start_date,
                    end_date: meta.end_date,
                    bar_count: meta.bar_count,
                    cached_at: meta.cached_at,
                });
            }
        }
        statuses.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(statuses)
    }
}

// ── CSV I/O helpers ─────────────────────────────────────────────────

/// Write `bars` to a temp file in `dir` and rename it over `path`.
fn write_bars(dir: &Path, path: &Path, bars: &[Bar]) -> Result<(), CacheError> {
    let tmp = NamedTempFile::new_in(dir).map_err(io_err(dir))?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file());
        for bar in bars {
            writer.serialize(CacheRow::from(bar))?;
        }
        writer.flush().map_err(io_err(tmp.path()))?;
    }
    tmp.persist(path).map_err(|e| io_err(path)(e.error))?;
    Ok(())
}

fn read_bars(path: &Path) -> Result<Vec<Bar>, CacheError> {
    let mut reader = csv::Reader::from_path(path)?;
    let bars = reader
        .deserialize::<CacheRow>()
        .map(|row| row.map(Bar::from))
        .collect::<Result<Vec<_>, _>>()?;

    if bars.is_empty() {
        return Err(CacheError::Corrupt {
            path: path.to_path_buf(),
            reason: "no rows".into(),
        });
    }
    validate_series(&bars).map_err(|e| CacheError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(bars)
}

fn hash_bars(bars: &[Bar]) -> Result<String, CacheError> {
    Ok(blake3::hash(&serde_json::to_vec(bars)?).to_hex().to_string())
}
