//! Backtest runner: wires together provider, signal, simulator, and metrics.
//!
//! Two entry points:
//! - `run_backtest()`: the three-field report. Used by callers that only need
//!   the summary.
//! - `run_backtest_detailed()`: the report plus positions, trades, and the
//!   equity curve. Used by the CLI `--detailed` flag.
//!
//! Validation order: capital, windows, symbol, fetch, empty series, series
//! integrity, history length. The first failing check decides the error.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crosslab_core::data::PriceSeriesProvider;
use crosslab_core::domain::{validate_series, OpenPosition, PositionState, Trade};
use crosslab_core::engine::run_engine;
use crosslab_core::signal::MaCrossover;

use crate::config::BacktestConfig;
use crate::error::BacktestError;
use crate::metrics::BacktestReport;

/// Parameters for one backtest, independent of the symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub initial_capital: Decimal,
    pub short_window: usize,
    pub long_window: usize,
    /// Last date of history the provider may return.
    pub as_of: NaiveDate,
}

impl BacktestRequest {
    /// Request with the default 20/50 windows.
    pub fn new(initial_capital: Decimal, as_of: NaiveDate) -> Self {
        Self {
            initial_capital,
            short_window: MaCrossover::DEFAULT_SHORT_WINDOW,
            long_window: MaCrossover::DEFAULT_LONG_WINDOW,
            as_of,
        }
    }

    /// Request using the windows from `[strategy]`.
    pub fn from_config(config: &BacktestConfig, initial_capital: Decimal, as_of: NaiveDate) -> Self {
        Self::new(initial_capital, as_of)
            .with_windows(config.strategy.short_window, config.strategy.long_window)
    }

    pub fn with_windows(mut self, short_window: usize, long_window: usize) -> Self {
        self.short_window = short_window;
        self.long_window = long_window;
        self
    }
}

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestRun {
    pub symbol: String,
    pub short_window: usize,
    pub long_window: usize,
    pub initial_capital: Decimal,
    pub bar_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub positions: Vec<PositionState>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<Decimal>,
    pub final_equity: Decimal,
    /// Position still held at the last bar; marked to market, not a trade.
    pub open_position: Option<OpenPosition>,
    pub report: BacktestReport,
}

/// Run a backtest and return only the report.
pub fn run_backtest(
    provider: &dyn PriceSeriesProvider,
    symbol: &str,
    request: &BacktestRequest,
) -> Result<BacktestReport, BacktestError> {
    run_backtest_detailed(provider, symbol, request).map(|run| run.report)
}

/// Run a backtest and return the full run record.
pub fn run_backtest_detailed(
    provider: &dyn PriceSeriesProvider,
    symbol: &str,
    request: &BacktestRequest,
) -> Result<BacktestRun, BacktestError> {
    if request.initial_capital <= Decimal::ZERO {
        return Err(BacktestError::InvalidCapital {
            capital: request.initial_capital,
        });
    }
    let signal = MaCrossover::new(request.short_window, request.long_window)?;

    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(BacktestError::NoData {
            symbol: symbol.to_string(),
        });
    }

    info!(
        symbol,
        provider = provider.name(),
        short = request.short_window,
        long = request.long_window,
        capital = %request.initial_capital,
        "starting backtest"
    );

    let bars = provider.get_price_series(symbol, request.as_of)?;
    let (first_date, last_date) = match (bars.first(), bars.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => {
            return Err(BacktestError::NoData {
                symbol: symbol.to_string(),
            })
        }
    };
    validate_series(&bars).map_err(|source| BacktestError::MalformedSeries {
        symbol: symbol.to_string(),
        source,
    })?;
    if bars.len() < request.long_window {
        return Err(BacktestError::InsufficientHistory {
            symbol: symbol.to_string(),
            bars: bars.len(),
            required: request.long_window,
        });
    }
    debug!(symbol, bars = bars.len(), %first_date, %last_date, "series validated");

    let run = run_engine(&bars, &signal, request.initial_capital)?;
    let sim = run.simulation;
    let report = BacktestReport::compute(
        request.initial_capital,
        sim.final_equity,
        &sim.equity_curve,
        &sim.trades,
    )
    .ok_or_else(|| BacktestError::ReportOverflow {
        symbol: symbol.to_string(),
    })?;

    info!(
        symbol,
        total_return_pct = %report.total_return_pct,
        max_drawdown_pct = %report.max_drawdown_pct,
        trades = report.number_of_trades,
        open = sim.open_position.is_some(),
        "backtest complete"
    );

    Ok(BacktestRun {
        symbol: symbol.to_string(),
        short_window: request.short_window,
        long_window: request.long_window,
        initial_capital: request.initial_capital,
        bar_count: bars.len(),
        first_date,
        last_date,
        positions: run.positions,
        trades: sim.trades,
        equity_curve: sim.equity_curve,
        final_equity: sim.final_equity,
        open_position: sim.open_position,
        report,
    })
}
