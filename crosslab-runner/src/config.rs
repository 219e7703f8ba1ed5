//! TOML backtest configuration.
//!
//! Every section and field has a default, so an empty document is valid.
//! The Alpha Vantage API key is not part of the document; callers supply it
//! when building the provider.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crosslab_core::data::alpha_vantage::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crosslab_core::data::{AlphaVantageConfig, HistoryWindow};
use crosslab_core::signal::MaCrossover;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BacktestConfig {
    pub strategy: StrategySection,
    pub data: DataSection,
    pub alpha_vantage: AlphaVantageSection,
}

/// `[strategy]`: moving-average windows in bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategySection {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for StrategySection {
    fn default() -> Self {
        Self {
            short_window: MaCrossover::DEFAULT_SHORT_WINDOW,
            long_window: MaCrossover::DEFAULT_LONG_WINDOW,
        }
    }
}

/// `[data]`: history window and cache location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataSection {
    pub history_days: u32,
    pub cache_dir: PathBuf,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            history_days: HistoryWindow::DEFAULT_DAYS,
            cache_dir: PathBuf::from("data"),
        }
    }
}

/// `[alpha_vantage]`: endpoint and request timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlphaVantageSection {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for AlphaVantageSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl BacktestConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn history_window(&self) -> HistoryWindow {
        HistoryWindow::new(self.data.history_days)
    }

    /// Provider settings for the given API key.
    pub fn alpha_vantage_config(&self, api_key: impl Into<String>) -> AlphaVantageConfig {
        AlphaVantageConfig {
            api_key: api_key.into(),
            base_url: self.alpha_vantage.base_url.clone(),
            timeout_secs: self.alpha_vantage.timeout_secs,
        }
    }
}
