//! Backtesting engine: signal pass followed by a single simulation pass.
//!
//! 1. The signal generator maps the whole series to per-bar position states.
//! 2. The simulator walks the bars in order, trading on state transitions and
//!    marking equity to each close.
//!
//! Synchronous and allocation-bounded by the bar count. Each call owns its own
//! state, so independent runs can execute on different threads.

pub mod simulator;

pub use simulator::{simulate, SimulationError, SimulationResult};

use rust_decimal::Decimal;

use crate::domain::{Bar, PositionState};
use crate::signal::SignalGenerator;

/// Output of one engine pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRun {
    pub positions: Vec<PositionState>,
    pub simulation: SimulationResult,
}

/// Run `signal` over `bars` and simulate the resulting positions.
pub fn run_engine(
    bars: &[Bar],
    signal: &dyn SignalGenerator,
    initial_capital: Decimal,
) -> Result<EngineRun, SimulationError> {
    let positions = signal.positions(bars);
    let simulation = simulate(bars, &positions, initial_capital)?;
    Ok(EngineRun {
        positions,
        simulation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_bars;
    use crate::signal::MaCrossover;
    use rust_decimal_macros::dec;

    #[test]
    fn engine_run_wires_signal_into_simulator() {
        let closes: Vec<Decimal> = [10, 9, 8, 7, 6, 7, 9, 12, 15, 13, 10, 7, 5]
            .iter()
            .map(|&v| Decimal::from(v))
            .collect();
        let bars = test_bars(&closes);
        let signal = MaCrossover::new(2, 4).unwrap();

        let run = run_engine(&bars, &signal, dec!(900)).unwrap();

        assert_eq!(run.positions.len(), bars.len());
        assert_eq!(run.simulation.trades.len(), 1);
        let trade = &run.simulation.trades[0];
        // Enter at 9 (bar 6), exit at 10 (bar 10): 100 shares.
        assert_eq!(trade.entry_price, dec!(9));
        assert_eq!(trade.exit_price, dec!(10));
        assert_eq!(run.simulation.final_equity, dec!(1000));
    }
}
