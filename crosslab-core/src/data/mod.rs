//! Market data: provider trait, sources, canonicalization, and the CSV cache.

pub mod alpha_vantage;
pub mod cache;
pub mod cached;
pub mod canonicalize;
pub mod memory;
pub mod provider;
pub mod synthetic;

pub use alpha_vantage::{AlphaVantageConfig, AlphaVantageProvider};
pub use cache::{CacheError, CacheMeta, CacheStatus, CsvCache};
pub use cached::CachedProvider;
pub use canonicalize::canonicalize;
pub use memory::InMemoryProvider;
pub use provider::{HistoryWindow, PriceSeriesProvider, ProviderError};
pub use synthetic::{generate_synthetic_bars, SyntheticProvider};
