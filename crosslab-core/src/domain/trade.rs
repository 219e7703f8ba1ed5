//! Trade: a closed long round trip, entry to exit.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A completed round-trip trade.
///
/// Positions still open when the series ends are never recorded as trades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    // ── Entry ──
    pub entry_bar: usize,
    pub entry_date: NaiveDate,
    pub entry_price: Decimal,

    // ── Exit ──
    pub exit_bar: usize,
    pub exit_date: NaiveDate,
    pub exit_price: Decimal,

    // ── Size ──
    pub shares: Decimal,

    // ── PnL ──
    pub pnl: Decimal,
}

/// A long position still open at the end of the series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub entry_bar: usize,
    pub entry_date: NaiveDate,
    pub entry_price: Decimal,
    pub shares: Decimal,
}
