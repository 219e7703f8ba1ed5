//! Look-ahead contamination tests for the SMA and the crossover signal.
//!
//! Invariant: no value at bar t may depend on price data from bar t+1 or later.
//!
//! Method: compute on a truncated series (bars 0..100) and the full series
//! (bars 0..200). Assert bars 0..100 are identical between both runs. Any
//! difference means future data is leaking into past values.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crosslab_core::domain::Bar;
use crosslab_core::indicators::{Indicator, Sma};
use crosslab_core::signal::{MaCrossover, SignalGenerator};

/// Generate N bars of synthetic OHLCV data with realistic variation.
fn make_test_bars(n: usize) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut bars = Vec::with_capacity(n);
    let mut cents: i64 = 10_000;

    for i in 0..n {
        // Deterministic pseudo-random walk using a simple LCG
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
        let change = (seed % 200) as i64 - 100; // -1.00 to +0.99
        cents = (cents + change).max(1_000);

        let close = Decimal::new(cents, 2);
        let open = Decimal::new(cents - 50, 2);
        bars.push(Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high: close + Decimal::new(200, 2),
            low: open - Decimal::new(200, 2),
            close,
            volume: 1000 + (i as u64 * 100),
        });
    }

    bars
}

const TRUNCATED: usize = 100;
const FULL: usize = 200;

#[test]
fn sma_has_no_lookahead() {
    let bars = make_test_bars(FULL);
    for period in [1usize, 2, 5, 20, 50] {
        let sma = Sma::new(period);
        let truncated = sma.compute(&bars[..TRUNCATED]);
        let full = sma.compute(&bars);
        assert_eq!(
            truncated,
            full[..TRUNCATED],
            "sma_{period} leaks future data"
        );
    }
}

#[test]
fn crossover_positions_have_no_lookahead() {
    let bars = make_test_bars(FULL);
    for (short, long) in [(1usize, 2usize), (5, 20), (20, 50)] {
        let signal = MaCrossover::new(short, long).unwrap();
        let truncated = signal.positions(&bars[..TRUNCATED]);
        let full = signal.positions(&bars);
        assert_eq!(
            truncated,
            full[..TRUNCATED],
            "ma_crossover({short},{long}) leaks future data"
        );
    }
}

#[test]
fn every_prefix_is_stable() {
    let bars = make_test_bars(80);
    let signal = MaCrossover::new(3, 10).unwrap();
    let full = signal.positions(&bars);
    for end in 1..bars.len() {
        assert_eq!(signal.positions(&bars[..end]), full[..end], "prefix {end}");
    }
}
