//! Synthetic price series for offline development.
//!
//! Produces a deterministic random walk from a starting price of 100.00,
//! seeded from the symbol name, on weekdays only. These bars are clearly fake.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use super::provider::{HistoryWindow, PriceSeriesProvider, ProviderError};
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticProvider {
    window: HistoryWindow,
}

impl SyntheticProvider {
    pub fn new(window: HistoryWindow) -> Self {
        Self { window }
    }
}

impl PriceSeriesProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn get_price_series(&self, symbol: &str, as_of: NaiveDate) -> Result<Vec<Bar>, ProviderError> {
        Ok(generate_synthetic_bars(symbol, self.window.start(as_of), as_of))
    }
}

/// Generate a weekday random walk between `start` and `end` inclusive.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    // Deterministic seed from symbol name
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let floor = Decimal::new(1, 2);
    let mut bars = Vec::new();
    let mut price = Decimal::new(10_000, 2);
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += Duration::days(1);
            continue;
        }

        // Daily move in basis points, ±3%.
        let change = Decimal::new(rng.gen_range(-300..=300), 4);
        let open = price;
        let close = (open * (Decimal::ONE + change)).round_dp(2).max(floor);
        let up = Decimal::new(rng.gen_range(0..=100), 4);
        let down = Decimal::new(rng.gen_range(0..=100), 4);
        let high = (open.max(close) * (Decimal::ONE + up)).round_dp(2);
        let low = (open.min(close) * (Decimal::ONE - down)).round_dp(2).max(floor);
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(Bar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += Duration::days(1);
    }

    bars
}
