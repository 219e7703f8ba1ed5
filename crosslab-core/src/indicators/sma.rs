//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a trailing window, computed with a
//! sliding sum over a queue of the window's closes.
//! Lookback: period - 1 (first defined value at index period-1).

use std::collections::VecDeque;

use rust_decimal::Decimal;

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<Decimal>> {
        let divisor = Decimal::from(self.period);
        let mut window: VecDeque<Decimal> = VecDeque::with_capacity(self.period + 1);
        let mut sum = Some(Decimal::ZERO);

        bars.iter()
            .map(|bar| {
                window.push_back(bar.close);
                sum = sum.and_then(|s| s.checked_add(bar.close));
                if window.len() > self.period {
                    if let Some(leaving) = window.pop_front() {
                        sum = sum.and_then(|s| s.checked_sub(leaving));
                    }
                }
                // A window whose sum leaves the Decimal range has no average;
                // retry from the queue until it fits again.
                if sum.is_none() {
                    sum = window
                        .iter()
                        .try_fold(Decimal::ZERO, |acc, &close| acc.checked_add(close));
                }
                if window.len() == self.period {
                    sum.and_then(|s| s.checked_div(divisor))
                } else {
                    None
                }
            })
            .collect()
    }
}
