//! Parallel backtests over several symbols.

use rayon::prelude::*;
use tracing::info;

use crosslab_core::data::PriceSeriesProvider;

use crate::error::BacktestError;
use crate::metrics::BacktestReport;
use crate::runner::{run_backtest, BacktestRequest};

/// One symbol's outcome in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub symbol: String,
    pub result: Result<BacktestReport, BacktestError>,
}

/// Run the same request for every symbol on the rayon pool.
///
/// Results come back in input order. Each run owns its data; the provider is
/// only read.
pub fn run_batch(
    provider: &dyn PriceSeriesProvider,
    symbols: &[String],
    request: &BacktestRequest,
) -> Vec<BatchEntry> {
    let entries: Vec<BatchEntry> = symbols
        .par_iter()
        .map(|symbol| BatchEntry {
            symbol: symbol.clone(),
            result: run_backtest(provider, symbol, request),
        })
        .collect();

    let failed = entries.iter().filter(|e| e.result.is_err()).count();
    info!(symbols = entries.len(), failed, "batch complete");
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorStatus;
    use chrono::NaiveDate;
    use crosslab_core::data::{HistoryWindow, SyntheticProvider};
    use rust_decimal_macros::dec;

    #[test]
    fn preserves_input_order_and_isolates_failures() {
        let provider = SyntheticProvider::new(HistoryWindow::default());
        let as_of = NaiveDate::from_ymd_opt(2024, 10, 17).unwrap();
        let request = BacktestRequest::new(dec!(10000), as_of);
        let symbols: Vec<String> = ["SPY", "", "QQQ", "IWM"].iter().map(|s| s.to_string()).collect();

        let entries = run_batch(&provider, &symbols, &request);

        let order: Vec<_> = entries.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(order, vec!["SPY", "", "QQQ", "IWM"]);
        assert!(entries[0].result.is_ok());
        assert_eq!(
            entries[1].result.as_ref().unwrap_err().status(),
            ErrorStatus::NoData
        );
        assert!(entries[2].result.is_ok());
        assert!(entries[3].result.is_ok());
    }

    #[test]
    fn matches_sequential_runs() {
        let provider = SyntheticProvider::new(HistoryWindow::default());
        let as_of = NaiveDate::from_ymd_opt(2024, 10, 17).unwrap();
        let request = BacktestRequest::new(dec!(2500), as_of).with_windows(10, 30);
        let symbols: Vec<String> = ["AAPL", "MSFT", "NVDA"].iter().map(|s| s.to_string()).collect();

        let entries = run_batch(&provider, &symbols, &request);
        for entry in entries {
            assert_eq!(entry.result, run_backtest(&provider, &entry.symbol, &request));
        }
    }
}
