//! Price series provider trait, history window, and structured error types.
//!
//! The `PriceSeriesProvider` trait abstracts over data sources (Alpha Vantage,
//! the on-disk cache, in-memory fixtures, synthetic data) so the engine can be
//! fed and mocked without knowing where bars come from.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;

/// Structured error types for data operations.
///
/// `NoData` is the only "this symbol has nothing" outcome. Every other variant
/// is a transient fetch or storage failure and must not be reported as an
/// invalid symbol. Upstream messages are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("no data available for symbol '{symbol}'")]
    NoData { symbol: String },

    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    Network(String),

    #[error("provider returned HTTP {status}")]
    Http { status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormat(String),

    #[error("cache error: {0}")]
    Cache(String),
}

impl ProviderError {
    pub fn no_data(symbol: &str) -> Self {
        ProviderError::NoData {
            symbol: symbol.to_string(),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, ProviderError::NoData { .. })
    }
}

/// Bounded historical window ending at the `as_of` date, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    pub days: u32,
}

impl HistoryWindow {
    /// Two years of calendar days.
    pub const DEFAULT_DAYS: u32 = 2 * 365;

    pub fn new(days: u32) -> Self {
        Self { days }
    }

    /// First date inside the window.
    pub fn start(&self, as_of: NaiveDate) -> NaiveDate {
        as_of - Duration::days(i64::from(self.days))
    }

    pub fn contains(&self, as_of: NaiveDate, date: NaiveDate) -> bool {
        date >= self.start(as_of) && date <= as_of
    }

    /// Keep only the bars dated inside the window.
    pub fn clip(&self, bars: &[Bar], as_of: NaiveDate) -> Vec<Bar> {
        bars.iter()
            .filter(|bar| self.contains(as_of, bar.date))
            .cloned()
            .collect()
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DAYS)
    }
}

/// Trait for price series providers.
///
/// Implementations return an ascending, deduplicated series of daily bars for
/// `symbol` ending no later than `as_of`. Providers are shared read-only
/// between concurrent backtests.
pub trait PriceSeriesProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn get_price_series(&self, symbol: &str, as_of: NaiveDate) -> Result<Vec<Bar>, ProviderError>;
}
