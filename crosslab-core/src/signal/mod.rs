//! Signal generation: turns a price series into a per-bar position state.
//!
//! Signals are portfolio-agnostic: they see bar history only, never cash or
//! holdings. The output is deterministic given the series and parameters.

pub mod ma_crossover;

pub use ma_crossover::{MaCrossover, SignalFrame, WindowError};

use crate::domain::{Bar, PositionState};

/// Trait for signal generators.
pub trait SignalGenerator: Send + Sync {
    /// Human-readable name (e.g., "ma_crossover").
    fn name(&self) -> &str;

    /// Index of the first bar at which the signal can make a decision.
    fn warmup_bars(&self) -> usize;

    /// One position state per input bar, same length as `bars`.
    ///
    /// The state at index `i` may only depend on `bars[0..=i]`.
    fn positions(&self, bars: &[Bar]) -> Vec<PositionState>;
}
