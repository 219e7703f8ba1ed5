//! Price series integrity checks.
//!
//! Providers promise an ascending, deduplicated series. The engine does not
//! take that on trust: it validates once before computing anything and fails
//! fast on the first violation.

use thiserror::Error;

use super::bar::Bar;

/// A malformed bar sequence handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("bar {index} is not strictly after the previous bar ({date})")]
    NonMonotonic { index: usize, date: chrono::NaiveDate },

    #[error("bar {index} has a non-positive price")]
    NonPositivePrice { index: usize },

    #[error("bar {index} has an inconsistent OHLC range")]
    InconsistentBar { index: usize },
}

/// Validate an ascending price series.
///
/// Checks, bar by bar: strictly increasing dates (duplicates rejected),
/// positive prices, and high >= low with open/close inside the range.
pub fn validate_series(bars: &[Bar]) -> Result<(), SeriesError> {
    for (index, bar) in bars.iter().enumerate() {
        if index > 0 && bar.date <= bars[index - 1].date {
            return Err(SeriesError::NonMonotonic {
                index,
                date: bar.date,
            });
        }
        if !bar.has_positive_prices() {
            return Err(SeriesError::NonPositivePrice { index });
        }
        if !bar.is_consistent() {
            return Err(SeriesError::InconsistentBar { index });
        }
    }
    Ok(())
}
