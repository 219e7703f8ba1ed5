//! Trade simulator: walks the bars once, acting on position transitions.
//!
//! Flat→Long buys with all available cash at the bar's close; Long→Flat sells
//! the whole holding at the bar's close and records a closed trade. Equity is
//! marked to the close on every bar. No costs, slippage, shorting or leverage.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::domain::{Bar, OpenPosition, Portfolio, PositionState, Trade};

/// Errors from the simulator. All indicate a caller bug or malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("position states ({positions}) do not match bar count ({bars})")]
    LengthMismatch { bars: usize, positions: usize },

    #[error("initial capital must be positive, got {0}")]
    NonPositiveCapital(Decimal),

    #[error("bar {index} has a non-positive close")]
    NonPositiveClose { index: usize },

    #[error("arithmetic overflow at bar {index}")]
    Overflow { index: usize },
}

/// Output of one simulation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    /// Closed round trips in exit order.
    pub trades: Vec<Trade>,
    /// One equity value per bar: cash + shares × close.
    pub equity_curve: Vec<Decimal>,
    /// Equity at the last bar, or the initial capital for an empty series.
    pub final_equity: Decimal,
    /// Holding still open when the series ended (not counted as a trade).
    pub open_position: Option<OpenPosition>,
}

/// Simulate all-in long-only trading over `bars` driven by `positions`.
pub fn simulate(
    bars: &[Bar],
    positions: &[PositionState],
    initial_capital: Decimal,
) -> Result<SimulationResult, SimulationError> {
    if bars.len() != positions.len() {
        return Err(SimulationError::LengthMismatch {
            bars: bars.len(),
            positions: positions.len(),
        });
    }
    if initial_capital <= Decimal::ZERO {
        return Err(SimulationError::NonPositiveCapital(initial_capital));
    }

    let mut portfolio = Portfolio::new(initial_capital);
    let mut open: Option<OpenPosition> = None;
    let mut trades = Vec::new();
    let mut equity_curve = Vec::with_capacity(bars.len());
    let mut previous = PositionState::Flat;

    for (index, (bar, &state)) in bars.iter().zip(positions).enumerate() {
        if bar.close <= Decimal::ZERO {
            return Err(SimulationError::NonPositiveClose { index });
        }

        match (previous, state) {
            (PositionState::Flat, PositionState::Long) => {
                let shares = portfolio
                    .buy_all(bar.close)
                    .ok_or(SimulationError::Overflow { index })?;
                debug!(index, date = %bar.date, price = %bar.close, %shares, "enter long");
                open = Some(OpenPosition {
                    entry_bar: index,
                    entry_date: bar.date,
                    entry_price: bar.close,
                    shares,
                });
            }
            (PositionState::Long, PositionState::Flat) => {
                if let Some(entry) = open.take() {
                    portfolio
                        .sell_all(bar.close)
                        .ok_or(SimulationError::Overflow { index })?;
                    let trade = close_trade(entry, index, bar)
                        .ok_or(SimulationError::Overflow { index })?;
                    debug!(index, date = %bar.date, price = %bar.close, pnl = %trade.pnl, "exit long");
                    trades.push(trade);
                }
            }
            _ => {}
        }

        let equity = portfolio
            .equity(bar.close)
            .ok_or(SimulationError::Overflow { index })?;
        equity_curve.push(equity);
        previous = state;
    }

    let final_equity = equity_curve.last().copied().unwrap_or(initial_capital);

    Ok(SimulationResult {
        trades,
        equity_curve,
        final_equity,
        open_position: open,
    })
}

fn close_trade(entry: OpenPosition, exit_bar: usize, exit: &Bar) -> Option<Trade> {
    let pnl = (exit.close - entry.entry_price).checked_mul(entry.shares)?;
    Some(Trade {
        entry_bar: entry.entry_bar,
        entry_date: entry.entry_date,
        entry_price: entry.entry_price,
        exit_bar,
        exit_date: exit.date,
        exit_price: exit.close,
        shares: entry.shares,
        pnl,
    })
}
