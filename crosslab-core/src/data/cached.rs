//! Cache-first provider: serve from the CSV cache, fall back to a remote
//! provider and write the fetched bars through.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::cache::CsvCache;
use super::provider::{HistoryWindow, PriceSeriesProvider, ProviderError};
use crate::domain::Bar;

pub struct CachedProvider {
    cache: CsvCache,
    remote: Option<Box<dyn PriceSeriesProvider>>,
    window: HistoryWindow,
}

impl CachedProvider {
    pub fn new(cache: CsvCache, remote: Box<dyn PriceSeriesProvider>, window: HistoryWindow) -> Self {
        Self {
            cache,
            remote: Some(remote),
            window,
        }
    }

    /// Serve from the cache only; a miss is `NoData`.
    pub fn offline(cache: CsvCache, window: HistoryWindow) -> Self {
        Self {
            cache,
            remote: None,
            window,
        }
    }

    pub fn cache(&self) -> &CsvCache {
        &self.cache
    }

    /// Skip the cache and fetch from the remote, writing the result through.
    pub fn refresh(&self, symbol: &str, as_of: NaiveDate) -> Result<Vec<Bar>, ProviderError> {
        let remote = self
            .remote
            .as_ref()
            .ok_or_else(|| ProviderError::no_data(symbol))?;

        let bars = remote.get_price_series(symbol, as_of)?;
        if bars.is_empty() {
            return Ok(bars);
        }
        match self.cache.upsert(symbol, &bars, remote.name()) {
            Ok(total) => debug!(symbol, fetched = bars.len(), total, "cached fetched bars"),
            Err(e) => warn!(symbol, error = %e, "failed to write cache; continuing with fetched bars"),
        }
        Ok(bars)
    }
}

impl PriceSeriesProvider for CachedProvider {
    fn name(&self) -> &str {
        "cached"
    }

    fn get_price_series(&self, symbol: &str, as_of: NaiveDate) -> Result<Vec<Bar>, ProviderError> {
        if let Some(bars) = self.cache.load_window(symbol, self.window, as_of)? {
            info!(symbol, bars = bars.len(), "served from cache");
            return Ok(bars);
        }

        if self.remote.is_none() {
            debug!(symbol, "cache miss in offline mode");
            return Err(ProviderError::no_data(symbol));
        }
        info!(symbol, "cache miss; fetching from remote");
        self.refresh(symbol, as_of)
    }
}
