//! Configuration types shared across the orchestrator and the request surface.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the per-(instrument, interval) result cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached candle series.
    pub max_entries: u64,
    /// Optional time-to-live for cached series. `None` keeps entries until evicted.
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1024,
            ttl: None,
        }
    }
}

/// Global configuration for the `Candlebin` orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandlebinConfig {
    /// Timeout for a single price store fetch.
    pub store_timeout: Duration,
    /// Optional overall deadline for `candles`/`export` requests.
    pub request_timeout: Option<Duration>,
    /// Result cache sizing.
    pub cache: CacheConfig,
}

impl Default for CandlebinConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            request_timeout: None,
            cache: CacheConfig::default(),
        }
    }
}
