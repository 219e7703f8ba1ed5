//! Moving average crossover: golden cross and death cross detection.
//!
//! Goes Long when the short SMA crosses above the long SMA (golden cross) and
//! Flat when it crosses below (death cross). Long-only: there is no short side.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::SignalGenerator;
use crate::domain::{Bar, PositionState};
use crate::indicators::{Indicator, Sma};

/// Rejected window parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("moving-average windows must be positive (short={short}, long={long})")]
    ZeroWindow { short: usize, long: usize },

    #[error("short window ({short}) must be smaller than long window ({long})")]
    NotIncreasing { short: usize, long: usize },
}

/// Per-bar signal output: both averages and the derived position state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalFrame {
    pub short_ma: Vec<Option<Decimal>>,
    pub long_ma: Vec<Option<Decimal>>,
    pub positions: Vec<PositionState>,
}

/// Simple-moving-average crossover signal.
///
/// # Decision rule
/// A decision at bar `i` needs both averages defined at `i` and at `i - 1`,
/// so the first decision bar is `long_window`. Before that every bar is Flat.
/// At a decision bar:
/// - short > long: Long (a golden cross when coming from Flat)
/// - short < long: Flat (a death cross when coming from Long)
/// - short == long: the previous state holds
///
/// The warm-up counts as the "short <= long" side, so an uptrend already in
/// place at the first decision bar enters Long there.
#[derive(Debug, Clone)]
pub struct MaCrossover {
    short: Sma,
    long: Sma,
}

impl MaCrossover {
    pub const DEFAULT_SHORT_WINDOW: usize = 20;
    pub const DEFAULT_LONG_WINDOW: usize = 50;

    pub fn new(short_window: usize, long_window: usize) -> Result<Self, WindowError> {
        if short_window == 0 || long_window == 0 {
            return Err(WindowError::ZeroWindow {
                short: short_window,
                long: long_window,
            });
        }
        if short_window >= long_window {
            return Err(WindowError::NotIncreasing {
                short: short_window,
                long: long_window,
            });
        }
        Ok(Self {
            short: Sma::new(short_window),
            long: Sma::new(long_window),
        })
    }

    pub fn default_params() -> Self {
        Self {
            short: Sma::new(Self::DEFAULT_SHORT_WINDOW),
            long: Sma::new(Self::DEFAULT_LONG_WINDOW),
        }
    }

    pub fn short_window(&self) -> usize {
        self.short.period()
    }

    pub fn long_window(&self) -> usize {
        self.long.period()
    }

    /// Compute both averages and the position state for every bar.
    pub fn evaluate(&self, bars: &[Bar]) -> SignalFrame {
        let short_ma = self.short.compute(bars);
        let long_ma = self.long.compute(bars);

        let mut state = PositionState::Flat;
        let positions = (0..bars.len())
            .map(|i| {
                if let Some(relation) = Self::relation(&short_ma, &long_ma, i) {
                    match relation {
                        Ordering::Greater => state = PositionState::Long,
                        Ordering::Less => state = PositionState::Flat,
                        Ordering::Equal => {}
                    }
                }
                state
            })
            .collect();

        SignalFrame {
            short_ma,
            long_ma,
            positions,
        }
    }

    /// Short-vs-long ordering at a decision bar, `None` before the first one.
    fn relation(
        short_ma: &[Option<Decimal>],
        long_ma: &[Option<Decimal>],
        i: usize,
    ) -> Option<Ordering> {
        if i == 0 {
            return None;
        }
        let (short_cur, long_cur) = (short_ma[i]?, long_ma[i]?);
        // Both averages must also be defined on the previous bar.
        short_ma[i - 1]?;
        long_ma[i - 1]?;
        Some(short_cur.cmp(&long_cur))
    }
}

impl SignalGenerator for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn warmup_bars(&self) -> usize {
        self.long_window()
    }

    fn positions(&self, bars: &[Bar]) -> Vec<PositionState> {
        self.evaluate(bars).positions
    }
}
