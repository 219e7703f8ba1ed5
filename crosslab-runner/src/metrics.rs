//! Performance metrics: pure functions that reduce a simulation to a report.
//!
//! Every metric is a pure function: equity curve and/or trade list in, scalar out.
//! No dependencies on the runner, data pipeline, or engine state.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crosslab_core::domain::Trade;

/// Decimal places kept on reported percentages.
pub const PERCENT_DP: u32 = 2;

/// Smallest non-zero drawdown that can be reported.
///
/// A curve that falls at all never reports `0.00`, even when the dip
/// rounds below one basis point.
pub const MIN_REPORTED_DRAWDOWN_PCT: Decimal = Decimal::from_parts(1, 0, 0, false, PERCENT_DP);

/// The caller-facing backtest report. All three fields are always populated.
///
/// `max_drawdown_pct` is zero exactly when the equity curve never falls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestReport {
    #[serde(rename = "Total Return (%)", with = "rust_decimal::serde::float")]
    pub total_return_pct: Decimal,
    #[serde(rename = "Max Drawdown (%)", with = "rust_decimal::serde::float")]
    pub max_drawdown_pct: Decimal,
    #[serde(rename = "Number of Trades")]
    pub number_of_trades: usize,
}

impl BacktestReport {
    /// Compute the report from a finished simulation.
    ///
    /// `None` when the return percentage does not fit in a `Decimal`.
    pub fn compute(
        initial_capital: Decimal,
        final_equity: Decimal,
        equity_curve: &[Decimal],
        trades: &[Trade],
    ) -> Option<Self> {
        Some(Self {
            total_return_pct: total_return_pct(initial_capital, final_equity)?,
            max_drawdown_pct: max_drawdown_pct(equity_curve),
            number_of_trades: trades.len(),
        })
    }
}

// ─── Individual metric functions ────────────────────────────────────

fn round_pct(fraction: Decimal) -> Option<Decimal> {
    Some(
        fraction
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(PERCENT_DP, RoundingStrategy::MidpointAwayFromZero),
    )
}

/// Total return as a fraction: (final - initial) / initial.
///
/// Returns 0 for non-positive initial capital, `None` on overflow.
pub fn total_return(initial_capital: Decimal, final_equity: Decimal) -> Option<Decimal> {
    if initial_capital <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    final_equity
        .checked_sub(initial_capital)?
        .checked_div(initial_capital)
}

/// Total return in percent, rounded to two places.
pub fn total_return_pct(initial_capital: Decimal, final_equity: Decimal) -> Option<Decimal> {
    round_pct(total_return(initial_capital, final_equity)?)
}

/// Maximum drawdown as a fraction of the running peak, in [0, 1].
///
/// Single pass tracking the running peak. Zero for an empty or
/// non-decreasing curve.
pub fn max_drawdown(equity_curve: &[Decimal]) -> Decimal {
    let mut peak = match equity_curve.first() {
        Some(&first) => first,
        None => return Decimal::ZERO,
    };
    let mut max_dd = Decimal::ZERO;

    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        }
        if peak > Decimal::ZERO {
            let dd = (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// Maximum drawdown in percent, rounded to two places.
///
/// A non-zero drawdown that would round to `0.00` reports
/// [`MIN_REPORTED_DRAWDOWN_PCT`] instead.
pub fn max_drawdown_pct(equity_curve: &[Decimal]) -> Decimal {
    let fraction = max_drawdown(equity_curve);
    if fraction.is_zero() {
        return Decimal::ZERO;
    }
    // fraction <= 1, so the percentage always fits.
    let pct = (fraction * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(PERCENT_DP, RoundingStrategy::MidpointAwayFromZero);
    pct.max(MIN_REPORTED_DRAWDOWN_PCT)
}
