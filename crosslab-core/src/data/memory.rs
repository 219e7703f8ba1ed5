//! In-memory provider over a fixed symbol → bars map.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::canonicalize::canonicalize;
use super::provider::{HistoryWindow, PriceSeriesProvider, ProviderError};
use crate::domain::Bar;

/// Serves pre-loaded bars. Unknown symbols are `NoData`.
///
/// Without a window every bar dated on or before `as_of` is returned.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: HashMap<String, Vec<Bar>>,
    window: Option<HistoryWindow>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        self.insert(symbol, bars);
        self
    }

    pub fn with_window(mut self, window: HistoryWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn insert(&mut self, symbol: impl Into<String>, bars: Vec<Bar>) {
        self.series.insert(symbol.into(), bars);
    }
}

impl PriceSeriesProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn get_price_series(&self, symbol: &str, as_of: NaiveDate) -> Result<Vec<Bar>, ProviderError> {
        let bars = self
            .series
            .get(symbol)
            .ok_or_else(|| ProviderError::no_data(symbol))?;

        let selected = match self.window {
            Some(window) => window.clip(bars, as_of),
            None => bars.iter().filter(|b| b.date <= as_of).cloned().collect(),
        };
        Ok(canonicalize(selected))
    }
}
