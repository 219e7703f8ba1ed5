//! Alpha Vantage daily time series provider.
//!
//! Fetches `TIME_SERIES_DAILY` with `outputsize=full` and keeps the bars that
//! fall inside the history window. A single request per call; rate limits and
//! transport failures are surfaced to the caller instead of retried.
//!
//! Alpha Vantage reports most failures with HTTP 200 and a JSON body carrying
//! `Note`, `Information` or `Error Message` instead of the time series. Those
//! bodies are classified here so a throttled request never reads as an
//! unknown symbol.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use super::canonicalize::canonicalize;
use super::provider::{HistoryWindow, PriceSeriesProvider, ProviderError};
use crate::domain::Bar;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings. The API key is never printed by `Debug`.
#[derive(Clone)]
pub struct AlphaVantageConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl AlphaVantageConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for AlphaVantageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// ── Wire format ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<BTreeMap<String, DailyEntry>>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyEntry {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

impl DailyEntry {
    fn into_bar(self, date: NaiveDate) -> Result<Bar, ProviderError> {
        Ok(Bar {
            date,
            open: parse_price(&self.open, date)?,
            high: parse_price(&self.high, date)?,
            low: parse_price(&self.low, date)?,
            close: parse_price(&self.close, date)?,
            volume: self.volume.trim().parse().map_err(|_| {
                ProviderError::ResponseFormat(format!("invalid volume '{}' on {date}", self.volume))
            })?,
        })
    }
}

fn parse_price(raw: &str, date: NaiveDate) -> Result<Decimal, ProviderError> {
    Decimal::from_str(raw.trim())
        .map_err(|_| ProviderError::ResponseFormat(format!("invalid price '{raw}' on {date}")))
}

/// Parse a `TIME_SERIES_DAILY` response body into a canonical bar series.
///
/// Only bars inside `window` ending at `as_of` are kept. An empty result is
/// `NoData`.
pub fn parse_daily(
    symbol: &str,
    body: &str,
    window: HistoryWindow,
    as_of: NaiveDate,
) -> Result<Vec<Bar>, ProviderError> {
    let response: DailyResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::ResponseFormat(format!("failed to parse response for {symbol}: {e}")))?;

    if let Some(message) = response.note.or(response.information) {
        return Err(ProviderError::RateLimited(message));
    }
    if let Some(message) = response.error_message {
        debug!(symbol, %message, "alpha vantage rejected symbol");
        return Err(ProviderError::no_data(symbol));
    }
    let series = response
        .time_series
        .ok_or_else(|| ProviderError::no_data(symbol))?;

    let mut bars = Vec::with_capacity(series.len());
    for (raw_date, entry) in series {
        let date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d")
            .map_err(|_| ProviderError::ResponseFormat(format!("invalid date key '{raw_date}'")))?;
        if window.contains(as_of, date) {
            bars.push(entry.into_bar(date)?);
        }
    }

    if bars.is_empty() {
        return Err(ProviderError::no_data(symbol));
    }
    Ok(canonicalize(bars))
}

/// Remote provider backed by the Alpha Vantage REST API.
pub struct AlphaVantageProvider {
    client: reqwest::blocking::Client,
    config: AlphaVantageConfig,
    window: HistoryWindow,
}

impl AlphaVantageProvider {
    pub fn new(config: AlphaVantageConfig, window: HistoryWindow) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("crosslab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            window,
        })
    }

    fn fetch_body(&self, symbol: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("apikey", self.config.api_key.as_str()),
                ("outputsize", "full"),
            ])
            .send()
            .map_err(|e| ProviderError::Network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .map_err(|e| ProviderError::Network(e.without_url().to_string()))
    }
}

impl PriceSeriesProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "alpha_vantage"
    }

    fn get_price_series(&self, symbol: &str, as_of: NaiveDate) -> Result<Vec<Bar>, ProviderError> {
        debug!(symbol, %as_of, days = self.window.days, "fetching daily series");
        let body = self.fetch_body(symbol)?;
        let result = parse_daily(symbol, &body, self.window, as_of);
        match &result {
            Ok(bars) => debug!(symbol, bars = bars.len(), "fetched daily series"),
            Err(ProviderError::RateLimited(message)) => warn!(symbol, %message, "rate limited"),
            Err(_) => {}
        }
        result
    }
}
