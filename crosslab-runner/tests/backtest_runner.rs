//! Integration tests for the runner: end-to-end scenarios through a provider.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crosslab_core::data::{InMemoryProvider, PriceSeriesProvider, ProviderError};
use crosslab_core::domain::Bar;
use crosslab_runner::{
    run_backtest, run_backtest_detailed, BacktestRequest, ErrorStatus, StructuredError,
};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
}

fn bars_from_closes(closes: &[Decimal]) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close),
                low: open.min(close),
                close,
                volume: 1_000_000,
            }
        })
        .collect()
}

fn provider_with(symbol: &str, closes: &[Decimal]) -> InMemoryProvider {
    InMemoryProvider::new().with_series(symbol, bars_from_closes(closes))
}

/// Always fails with the configured error.
struct FailingProvider(ProviderError);

impl PriceSeriesProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    fn get_price_series(&self, _: &str, _: NaiveDate) -> Result<Vec<Bar>, ProviderError> {
        Err(self.0.clone())
    }
}

#[test]
fn three_bar_scenario_reports_zero_trades() {
    let provider = provider_with("AAPL", &[dec!(150.00), dec!(155.00), dec!(152.00)]);
    let request = BacktestRequest::new(dec!(10000), as_of()).with_windows(1, 2);

    let report = run_backtest(&provider, "AAPL", &request).unwrap();

    assert_eq!(report.number_of_trades, 0);
    assert_eq!(report.total_return_pct, Decimal::ZERO);
    assert_eq!(report.max_drawdown_pct, Decimal::ZERO);
}

#[test]
fn monotonic_uptrend_scenario() {
    let closes: Vec<Decimal> = (0..60).map(|i| dec!(100) + Decimal::from(i)).collect();
    let provider = provider_with("MSFT", &closes);
    let request = BacktestRequest::new(dec!(10000), as_of()).with_windows(20, 50);

    let run = run_backtest_detailed(&provider, "MSFT", &request).unwrap();

    let transitions = run
        .positions
        .windows(2)
        .filter(|w| w[0].is_flat() && w[1].is_long())
        .count();
    assert_eq!(transitions, 1);
    assert_eq!(run.report.number_of_trades, 0);
    assert!(run.report.total_return_pct > Decimal::ZERO);
    assert_eq!(run.report.max_drawdown_pct, Decimal::ZERO);
    assert!(run.open_position.is_some());
}

#[test]
fn round_trip_with_drawdown() {
    // Rally, then a slide that triggers the death cross.
    let closes: Vec<Decimal> = [
        100, 100, 100, 100, 100, 110, 120, 130, 140, 150, 140, 120, 100, 90, 80,
    ]
    .iter()
    .map(|&c| Decimal::from(c))
    .collect();
    let provider = provider_with("SPY", &closes);
    let request = BacktestRequest::new(dec!(10000), as_of()).with_windows(2, 5);

    let run = run_backtest_detailed(&provider, "SPY", &request).unwrap();

    assert_eq!(run.report.number_of_trades, 1);
    let trade = &run.trades[0];
    // First decision bar with short > long is bar 5 (close 110).
    assert_eq!(trade.entry_bar, 5);
    assert_eq!(trade.entry_price, dec!(110));
    // short(2) drops below long(5) at bar 11: 130 vs 136.
    assert_eq!(trade.exit_bar, 11);
    assert_eq!(trade.exit_price, dec!(120));
    assert!(run.open_position.is_none());

    // 10000 → 10909.09... : +9.09%
    assert_eq!(run.report.total_return_pct, dec!(9.09));
    // Peak at 150 (13636.36...), trough held at exit value 10909.09...: 20%
    assert_eq!(run.report.max_drawdown_pct, dec!(20.00));
}

#[test]
fn empty_series_is_no_data_not_a_crash() {
    let provider = InMemoryProvider::new().with_series("EMPTY", Vec::new());
    let request = BacktestRequest::new(dec!(10000), as_of());
    let err = run_backtest(&provider, "EMPTY", &request).unwrap_err();
    assert_eq!(err.status(), ErrorStatus::NoData);
}

#[test]
fn unknown_symbol_is_no_data() {
    let provider = InMemoryProvider::new();
    let request = BacktestRequest::new(dec!(10000), as_of());
    let err = run_backtest(&provider, "ZZZZ", &request).unwrap_err();
    let structured = StructuredError::from(err);
    assert_eq!(structured.status, ErrorStatus::NoData);
    assert!(structured.message.contains("ZZZZ"));
}

#[test]
fn rate_limited_provider_is_upstream_failure_with_verbatim_message() {
    let message = "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day.";
    let provider = FailingProvider(ProviderError::RateLimited(message.into()));
    let request = BacktestRequest::new(dec!(10000), as_of());

    let structured = StructuredError::from(run_backtest(&provider, "AAPL", &request).unwrap_err());

    assert_eq!(structured.status, ErrorStatus::UpstreamFetchFailure);
    assert_eq!(structured.message, message);
}

#[test]
fn network_and_http_failures_are_upstream() {
    let request = BacktestRequest::new(dec!(10000), as_of());
    for error in [
        ProviderError::Network("connection reset by peer".into()),
        ProviderError::Http { status: 503 },
        ProviderError::ResponseFormat("missing field".into()),
    ] {
        let err = run_backtest(&FailingProvider(error), "AAPL", &request).unwrap_err();
        assert_eq!(err.status(), ErrorStatus::UpstreamFetchFailure);
    }
}

#[test]
fn negative_price_is_internal_error() {
    let mut bars = bars_from_closes(&[dec!(10), dec!(11), dec!(12)]);
    bars[1].low = dec!(-1);
    let provider = InMemoryProvider::new().with_series("BAD", bars);
    let request = BacktestRequest::new(dec!(10000), as_of()).with_windows(1, 2);

    let err = run_backtest(&provider, "BAD", &request).unwrap_err();
    assert_eq!(err.status(), ErrorStatus::InternalError);
}

#[test]
fn fewer_bars_than_long_window_is_insufficient_history() {
    let closes: Vec<Decimal> = (0..49).map(|i| dec!(50) + Decimal::from(i)).collect();
    let provider = provider_with("NEW", &closes);
    let request = BacktestRequest::new(dec!(10000), as_of());

    let err = run_backtest(&provider, "NEW", &request).unwrap_err();
    assert_eq!(err.status(), ErrorStatus::InsufficientHistory);
}

#[test]
fn repeated_runs_are_byte_identical() {
    let closes: Vec<Decimal> = (0..120)
        .map(|i| dec!(100) + Decimal::from((i * 37) % 23) - Decimal::from(i % 7))
        .collect();
    let provider = provider_with("IDEM", &closes);
    let request = BacktestRequest::new(dec!(12345.67), as_of()).with_windows(3, 12);

    let first = serde_json::to_string(&run_backtest(&provider, "IDEM", &request).unwrap()).unwrap();
    let second = serde_json::to_string(&run_backtest(&provider, "IDEM", &request).unwrap()).unwrap();
    assert_eq!(first, second);

    let detailed_a = serde_json::to_vec(&run_backtest_detailed(&provider, "IDEM", &request).unwrap()).unwrap();
    let detailed_b = serde_json::to_vec(&run_backtest_detailed(&provider, "IDEM", &request).unwrap()).unwrap();
    assert_eq!(detailed_a, detailed_b);
}
