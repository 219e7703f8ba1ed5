//! Bar: the fundamental market data unit.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol on a single trading day.
///
/// Prices are fixed-precision decimals exactly as the quote provider reports them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

impl Bar {
    /// True when every price is strictly positive.
    pub fn has_positive_prices(&self) -> bool {
        self.open > Decimal::ZERO
            && self.high > Decimal::ZERO
            && self.low > Decimal::ZERO
            && self.close > Decimal::ZERO
    }

    /// True when high >= low and open/close sit inside the [low, high] range.
    pub fn is_consistent(&self) -> bool {
        self.high >= self.low
            && self.open >= self.low
            && self.open <= self.high
            && self.close >= self.low
            && self.close <= self.high
    }

    /// Basic OHLCV sanity check: positive prices and a consistent range.
    pub fn is_sane(&self) -> bool {
        self.has_positive_prices() && self.is_consistent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 10, 17).unwrap(),
            open: dec!(150.00),
            high: dec!(155.00),
            low: dec!(145.00),
            close: dec!(152.00),
            volume: 1_000_000,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_non_positive_price() {
        let mut bar = sample_bar();
        bar.low = dec!(0);
        assert!(!bar.has_positive_prices());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = dec!(144.00); // below low
        assert!(!bar.is_consistent());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_close_outside_range() {
        let mut bar = sample_bar();
        bar.close = dec!(156.00);
        assert!(!bar.is_consistent());
    }

    #[test]
    fn bar_json_keeps_decimal_precision() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(deser, bar);
        assert_eq!(deser.close.to_string(), "152.00");
    }
}
