//! Backtest errors and the caller-facing `{status, message}` shape.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crosslab_core::data::ProviderError;
use crosslab_core::domain::SeriesError;
use crosslab_core::engine::SimulationError;
use crosslab_core::signal::WindowError;

/// Closed set of failure kinds callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStatus {
    NoData,
    InvalidCapital,
    InvalidWindows,
    InsufficientHistory,
    UpstreamFetchFailure,
    InternalError,
}

impl ErrorStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorStatus::NoData => "no_data",
            ErrorStatus::InvalidCapital => "invalid_capital",
            ErrorStatus::InvalidWindows => "invalid_windows",
            ErrorStatus::InsufficientHistory => "insufficient_history",
            ErrorStatus::UpstreamFetchFailure => "upstream_fetch_failure",
            ErrorStatus::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from a backtest request.
///
/// Expected conditions (bad input, missing data, provider trouble) and
/// internal faults (malformed bars) are separate variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BacktestError {
    #[error("no data available for symbol '{symbol}'")]
    NoData { symbol: String },

    #[error("initial capital must be greater than zero, got {capital}")]
    InvalidCapital { capital: Decimal },

    #[error(transparent)]
    InvalidWindows(#[from] WindowError),

    #[error("insufficient history for {symbol}: {bars} bars, long window needs {required}")]
    InsufficientHistory {
        symbol: String,
        bars: usize,
        required: usize,
    },

    /// Transient provider failure; the provider message is kept verbatim.
    #[error("{0}")]
    UpstreamFetch(ProviderError),

    #[error("malformed price series for {symbol}: {source}")]
    MalformedSeries {
        symbol: String,
        #[source]
        source: SeriesError,
    },

    #[error("simulation failed: {0}")]
    Simulation(#[from] SimulationError),

    #[error("report for {symbol} is out of numeric range")]
    ReportOverflow { symbol: String },
}

impl BacktestError {
    pub fn status(&self) -> ErrorStatus {
        match self {
            BacktestError::NoData { .. } => ErrorStatus::NoData,
            BacktestError::InvalidCapital { .. } => ErrorStatus::InvalidCapital,
            BacktestError::InvalidWindows(_) => ErrorStatus::InvalidWindows,
            BacktestError::InsufficientHistory { .. } => ErrorStatus::InsufficientHistory,
            BacktestError::UpstreamFetch(_) => ErrorStatus::UpstreamFetchFailure,
            BacktestError::MalformedSeries { .. }
            | BacktestError::Simulation(_)
            | BacktestError::ReportOverflow { .. } => ErrorStatus::InternalError,
        }
    }

    pub fn to_structured(&self) -> StructuredError {
        StructuredError {
            status: self.status(),
            message: self.to_string(),
        }
    }
}

impl From<ProviderError> for BacktestError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::NoData { symbol } => BacktestError::NoData { symbol },
            other => BacktestError::UpstreamFetch(other),
        }
    }
}

/// Serializable error record: `{"status": "...", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredError {
    pub status: ErrorStatus,
    pub message: String,
}

impl From<BacktestError> for StructuredError {
    fn from(e: BacktestError) -> Self {
        e.to_structured()
    }
}

impl fmt::Display for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_no_data_maps_to_no_data() {
        let err: BacktestError = ProviderError::no_data("ZZZZ").into();
        assert_eq!(err.status(), ErrorStatus::NoData);
    }

    #[test]
    fn rate_limit_is_not_no_data() {
        let msg = "Our standard API rate limit is 25 requests per day.";
        let err: BacktestError = ProviderError::RateLimited(msg.into()).into();
        assert_eq!(err.status(), ErrorStatus::UpstreamFetchFailure);
        assert_eq!(err.to_string(), msg);
    }

    #[test]
    fn structured_error_json_shape() {
        let err = BacktestError::InvalidCapital {
            capital: Decimal::ZERO,
        };
        let json = serde_json::to_value(err.to_structured()).unwrap();
        assert_eq!(json["status"], "invalid_capital");
        assert_eq!(
            json["message"],
            "initial capital must be greater than zero, got 0"
        );
    }

    #[test]
    fn status_strings_match_serde() {
        for status in [
            ErrorStatus::NoData,
            ErrorStatus::InvalidCapital,
            ErrorStatus::InvalidWindows,
            ErrorStatus::InsufficientHistory,
            ErrorStatus::UpstreamFetchFailure,
            ErrorStatus::InternalError,
        ] {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.as_str());
        }
    }

    #[test]
    fn malformed_series_is_internal() {
        let err = BacktestError::MalformedSeries {
            symbol: "SPY".into(),
            source: SeriesError::NonPositivePrice { index: 3 },
        };
        assert_eq!(err.status(), ErrorStatus::InternalError);
    }

    #[test]
    fn overflow_is_internal() {
        let err = BacktestError::from(SimulationError::Overflow { index: 7 });
        assert_eq!(err.status(), ErrorStatus::InternalError);
        let err = BacktestError::ReportOverflow { symbol: "SPY".into() };
        assert_eq!(err.to_structured().status, ErrorStatus::InternalError);
    }
}
