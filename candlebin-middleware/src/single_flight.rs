//! Bounded result cache with at-most-one computation per key.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use candlebin_types::{CacheConfig, CandlebinError};
use moka::future::Cache;

/// Result cache that coalesces concurrent computations of the same key.
///
/// The first caller for a missing key runs its `init` future; every caller
/// arriving while it is in flight waits and receives the same outcome. Only
/// successful values are stored, so an error is returned to the waiting
/// callers and the next request retries.
pub struct SingleFlightCache<K, V> {
    inner: Cache<K, V>,
}

impl<K, V> SingleFlightCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Build a cache sized and aged according to `cfg`.
    #[must_use]
    pub fn new(cfg: &CacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(cfg.max_entries);
        if let Some(ttl) = cfg.ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            inner: builder.build(),
        }
    }

    /// Coalesce concurrent computations without keeping their results.
    ///
    /// Callers that join an in-flight computation share its outcome; a value
    /// expires right after it is produced, so a later call always runs `init`
    /// again, even if no caller survived to invalidate it.
    #[must_use]
    pub fn without_retention(max_entries: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(Duration::from_millis(1))
                .build(),
        }
    }

    /// Return the cached value for `key`, computing it with `init` on a miss.
    ///
    /// # Errors
    /// Returns the error produced by `init`, shared with every caller that was
    /// waiting on the same computation.
    pub async fn get_or_try_compute<F>(&self, key: K, init: F) -> Result<V, CandlebinError>
    where
        F: Future<Output = Result<V, CandlebinError>>,
    {
        let entry = self
            .inner
            .entry(key)
            .or_try_insert_with(init)
            .await
            .map_err(|e: Arc<CandlebinError>| (*e).clone())?;

        #[cfg(feature = "tracing")]
        tracing::debug!(hit = !entry.is_fresh(), "single-flight cache lookup");

        Ok(entry.into_value())
    }

    /// Cached value for `key`, without computing it.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key).await
    }

    /// Drop the cached value for `key` so the next request recomputes it.
    pub async fn invalidate(&self, key: &K) {
        self.inner.invalidate(key).await;
    }

    /// Drop every cached value.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Approximate number of cached values.
    ///
    /// Eviction bookkeeping is deferred; call [`Self::run_pending_tasks`]
    /// first for an exact count.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Flush deferred eviction and expiry work.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl<K, V> std::fmt::Debug for SingleFlightCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlightCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
