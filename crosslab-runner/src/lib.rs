//! Crosslab Runner: backtest orchestration, metrics, structured errors, configuration.
//!
//! This crate builds on `crosslab-core` to provide:
//! - Single-backtest runner with validation and structured errors
//! - Report metrics (total return, max drawdown, trade count)
//! - TOML configuration
//! - Parallel batch runs across symbols

pub mod batch;
pub mod config;
pub mod error;
pub mod metrics;
pub mod runner;

pub use batch::{run_batch, BatchEntry};
pub use config::{BacktestConfig, ConfigError};
pub use error::{BacktestError, ErrorStatus, StructuredError};
pub use metrics::BacktestReport;
pub use runner::{run_backtest, run_backtest_detailed, BacktestRequest, BacktestRun};
