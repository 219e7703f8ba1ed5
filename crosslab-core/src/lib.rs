//! Crosslab Core: domain types, indicators, crossover signal, simulator, market data.
//!
//! This crate contains the heart of the backtesting engine:
//! - Domain types (bars, portfolio, position state, trades)
//! - Simple moving average indicator with look-ahead guard
//! - Moving-average crossover signal
//! - Single-pass, long-only simulator over fixed-precision decimals
//! - Price series providers (Alpha Vantage, CSV cache, in-memory, synthetic)

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod signal;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: all core types are Send + Sync.
    ///
    /// Batch backtests run on a rayon pool and share providers across threads.
    /// If any type fails this check, the build breaks immediately.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Portfolio>();
        require_sync::<domain::Portfolio>();
        require_send::<domain::PositionState>();
        require_sync::<domain::PositionState>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();
        require_send::<domain::OpenPosition>();
        require_sync::<domain::OpenPosition>();

        // Signal and engine types
        require_send::<signal::MaCrossover>();
        require_sync::<signal::MaCrossover>();
        require_send::<engine::SimulationResult>();
        require_sync::<engine::SimulationResult>();
        require_send::<engine::EngineRun>();
        require_sync::<engine::EngineRun>();

        // Providers
        require_send::<data::InMemoryProvider>();
        require_sync::<data::InMemoryProvider>();
        require_send::<data::SyntheticProvider>();
        require_sync::<data::SyntheticProvider>();
        require_send::<data::AlphaVantageProvider>();
        require_sync::<data::AlphaVantageProvider>();
        require_send::<data::CachedProvider>();
        require_sync::<data::CachedProvider>();
    }

    /// Architecture contract: SignalGenerator trait does NOT accept Portfolio.
    ///
    /// `positions()` takes `&[Bar]` only. If a portfolio parameter is ever
    /// added, this stops compiling.
    #[test]
    fn signal_generator_trait_has_no_portfolio_parameter() {
        fn _check_trait_object_builds(
            sig: &dyn signal::SignalGenerator,
            bars: &[domain::Bar],
        ) -> Vec<domain::PositionState> {
            sig.positions(bars)
        }
    }
}
