//! Indicators: pure functions from bar history to a value series.

pub mod sma;

pub use sma::Sma;

use rust_decimal::Decimal;

use crate::domain::Bar;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce an output series of the same
/// length. The first `lookback()` values are `None` (undefined).
///
/// # Look-ahead contamination guard
/// No value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20").
    fn name(&self) -> &str;

    /// Number of bars before the indicator produces defined output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<Option<Decimal>>;
}
