use std::path::PathBuf;
use std::time::Duration;

use candlebin::{CacheConfig, CandlebinConfig};

/// Server configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub database_url: String,
    /// Directory artifacts are written to and served from.
    pub data_dir: PathBuf,
    pub db_max_connections: u32,
    pub store_timeout: Duration,
    pub request_timeout: Option<Duration>,
    pub cache_entries: u64,
    pub cache_ttl: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn str(&self, name: &str, default: &str) -> String {
        (self.lookup)(name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        (self.lookup)(name).and_then(|s| s.trim().parse().ok())
    }

    fn u16(&self, name: &str, default: u16) -> u16 {
        self.parsed(name).unwrap_or(default)
    }

    fn u32(&self, name: &str, default: u32) -> u32 {
        self.parsed(name).unwrap_or(default)
    }

    fn u64(&self, name: &str, default: u64) -> u64 {
        self.parsed(name).unwrap_or(default)
    }

    /// Unset, unparsable or zero means "no limit".
    fn opt_u64(&self, name: &str) -> Option<u64> {
        self.parsed::<u64>(name).filter(|v| *v > 0)
    }
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`; unset or malformed values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = Env { lookup };
        Self {
            bind: env.str("CANDLEBIN_BIND", "0.0.0.0"),
            port: env.u16("CANDLEBIN_PORT", 5000),
            database_url: env.str("CANDLEBIN_DATABASE_URL", "sqlite://candlebin.db"),
            data_dir: PathBuf::from(env.str("CANDLEBIN_DATA_DIR", "data")),
            db_max_connections: env.u32("CANDLEBIN_DB_MAX_CONNECTIONS", 5).max(1),
            store_timeout: Duration::from_millis(
                env.u64("CANDLEBIN_STORE_TIMEOUT_MS", 5000).max(1),
            ),
            request_timeout: env
                .opt_u64("CANDLEBIN_REQUEST_TIMEOUT_MS")
                .map(Duration::from_millis),
            cache_entries: env.u64("CANDLEBIN_CACHE_ENTRIES", 1024),
            cache_ttl: env.opt_u64("CANDLEBIN_CACHE_TTL_SECS").map(Duration::from_secs),
        }
    }

    /// `bind:port`, as accepted by `TcpListener::bind`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Orchestrator settings carried by this configuration.
    pub fn candlebin_config(&self) -> CandlebinConfig {
        CandlebinConfig {
            store_timeout: self.store_timeout,
            request_timeout: self.request_timeout,
            cache: CacheConfig {
                max_entries: self.cache_entries,
                ttl: self.cache_ttl,
            },
        }
    }
}
