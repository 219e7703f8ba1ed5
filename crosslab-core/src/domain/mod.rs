//! Domain types for crosslab

pub mod bar;
pub mod portfolio;
pub mod position;
pub mod series;
pub mod trade;

pub use bar::Bar;
pub use portfolio::{Portfolio, SHARE_SCALE};
pub use position::PositionState;
pub use series::{validate_series, SeriesError};
pub use trade::{OpenPosition, Trade};

/// Create synthetic bars from close prices for testing.
///
/// Open is the previous close (or the close itself for the first bar), high
/// and low sit 1% outside the open/close range, volume is 1000. Dates are
/// consecutive calendar days from 2024-01-02.
#[cfg(test)]
pub fn test_bars(closes: &[rust_decimal::Decimal]) -> Vec<Bar> {
    use rust_decimal_macros::dec;

    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * dec!(1.01),
                low: open.min(close) * dec!(0.99),
                close,
                volume: 1000,
            }
        })
        .collect()
}
