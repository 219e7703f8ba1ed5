//! Portfolio: cash plus a single long-only holding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on share quantities.
///
/// Entries buy `cash / price` shares truncated to this scale and keep the
/// remainder as cash, so `cash + shares * price` equals the pre-trade cash
/// exactly on the entry bar.
pub const SHARE_SCALE: u32 = 8;

/// Running portfolio state for one backtest.
///
/// The accounting identity holds at every bar:
/// `equity == cash + shares * close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portfolio {
    pub cash: Decimal,
    pub shares: Decimal,
}

impl Portfolio {
    pub fn new(initial_capital: Decimal) -> Self {
        Self {
            cash: initial_capital,
            shares: Decimal::ZERO,
        }
    }

    /// Mark-to-market equity at `price`. `None` if the value leaves the
    /// representable `Decimal` range.
    pub fn equity(&self, price: Decimal) -> Option<Decimal> {
        self.shares.checked_mul(price)?.checked_add(self.cash)
    }

    /// Deploy all available cash into shares at `price`. Returns the shares
    /// bought, or `None` on overflow (the portfolio is left unchanged).
    ///
    /// `price` must be positive; the caller validates the series first.
    pub fn buy_all(&mut self, price: Decimal) -> Option<Decimal> {
        let shares = self
            .cash
            .checked_div(price)?
            .round_dp_with_strategy(SHARE_SCALE, RoundingStrategy::ToZero);
        let cost = shares.checked_mul(price)?;
        let held = self.shares.checked_add(shares)?;
        self.cash -= cost;
        self.shares = held;
        Some(shares)
    }

    /// Liquidate the whole holding at `price`. Returns the sale proceeds, or
    /// `None` on overflow (the portfolio is left unchanged).
    pub fn sell_all(&mut self, price: Decimal) -> Option<Decimal> {
        let proceeds = self.shares.checked_mul(price)?;
        self.cash = self.cash.checked_add(proceeds)?;
        self.shares = Decimal::ZERO;
        Some(proceeds)
    }
}
