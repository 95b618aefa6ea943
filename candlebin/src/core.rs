use std::sync::Arc;
use std::time::Duration;

use candlebin_core::{
    ArtifactHandle, ArtifactStore, CacheConfig, CandleSeries, CandlebinConfig, CandlebinError,
    Capability, InstrumentId, PriceStore, SymbolCatalog,
};
use candlebin_middleware::{SingleFlightCache, TimeoutStore};

pub(crate) type SeriesKey = (InstrumentId, i64);

/// Orchestrator that resolves intervals and symbols, fetches raw records,
/// aggregates them into candles and exports the result.
pub struct Candlebin {
    pub(crate) store: Arc<dyn PriceStore>,
    pub(crate) catalog: Arc<dyn SymbolCatalog>,
    pub(crate) artifacts: Option<Arc<dyn ArtifactStore>>,
    pub(crate) cfg: CandlebinConfig,
    pub(crate) series: SingleFlightCache<SeriesKey, Arc<CandleSeries>>,
    pub(crate) exports: SingleFlightCache<String, ArtifactHandle>,
}

/// Builder for constructing a `Candlebin` orchestrator with injected collaborators.
pub struct CandlebinBuilder {
    store: Option<Arc<dyn PriceStore>>,
    catalog: Option<Arc<dyn SymbolCatalog>>,
    artifacts: Option<Arc<dyn ArtifactStore>>,
    cfg: CandlebinConfig,
}

impl Default for CandlebinBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CandlebinBuilder {
    /// Create a new builder with default configuration and no collaborators.
    ///
    /// A price store and a symbol catalog are required; the artifact store is
    /// only needed for [`Candlebin::export`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: None,
            catalog: None,
            artifacts: None,
            cfg: CandlebinConfig::default(),
        }
    }

    /// Set the price store records are fetched from.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn PriceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the catalog symbols are resolved against.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn SymbolCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set the destination for exported artifacts.
    #[must_use]
    pub fn with_artifacts(mut self, artifacts: Arc<dyn ArtifactStore>) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: CandlebinConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the timeout applied to every store and catalog call.
    #[must_use]
    pub const fn store_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.store_timeout = timeout;
        self
    }

    /// Set an overall deadline for `candles` and `export` requests.
    ///
    /// When exceeded, returns a `RequestTimeout` error for the capability.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Set the result cache sizing.
    #[must_use]
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cfg.cache = cache;
        self
    }

    /// Build the `Candlebin` orchestrator.
    ///
    /// The price store is wrapped so that each fetch is bounded by the
    /// configured store timeout.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no price store or no catalog has been set.
    pub fn build(self) -> Result<Candlebin, CandlebinError> {
        let store = self.store.ok_or_else(|| {
            CandlebinError::InvalidArg(
                "no price store registered; add one via with_store(...)".to_string(),
            )
        })?;
        let catalog = self.catalog.ok_or_else(|| {
            CandlebinError::InvalidArg(
                "no symbol catalog registered; add one via with_catalog(...)".to_string(),
            )
        })?;
        if self.cfg.store_timeout.is_zero() {
            return Err(CandlebinError::InvalidArg(
                "store timeout must be greater than zero".to_string(),
            ));
        }

        let store: Arc<dyn PriceStore> = Arc::new(TimeoutStore::new(store, self.cfg.store_timeout));
        let series = SingleFlightCache::new(&self.cfg.cache);
        // Existence of an artifact is answered by the artifact store, never by this cache.
        let exports = SingleFlightCache::without_retention(self.cfg.cache.max_entries);

        Ok(Candlebin {
            store,
            catalog,
            artifacts: self.artifacts,
            cfg: self.cfg,
            series,
            exports,
        })
    }
}

impl Candlebin {
    /// Start building a new `Candlebin` instance.
    ///
    /// ```rust,ignore
    /// let bin = candlebin::Candlebin::builder()
    ///     .with_store(store.clone())
    ///     .with_catalog(store)
    ///     .request_timeout(std::time::Duration::from_secs(10))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> CandlebinBuilder {
        CandlebinBuilder::new()
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &CandlebinConfig {
        &self.cfg
    }

    /// Wrap a collaborator future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candlebin::core::store_call_with_timeout",
            skip(fut),
            fields(
                store = store_name,
                capability = %capability,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn store_call_with_timeout<T, Fut>(
        store_name: &'static str,
        capability: Capability,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, CandlebinError>
    where
        Fut: core::future::Future<Output = Result<T, CandlebinError>>,
    {
        (tokio::time::timeout(timeout, fut).await).unwrap_or_else(|_| {
            Err(CandlebinError::store_timeout(store_name, capability.as_str()))
        })
    }

    /// Bound `fut` by the configured request deadline, if any.
    pub(crate) async fn with_request_deadline<T, Fut>(
        &self,
        capability: Capability,
        fut: Fut,
    ) -> Result<T, CandlebinError>
    where
        Fut: core::future::Future<Output = Result<T, CandlebinError>>,
    {
        if let Some(deadline) = self.cfg.request_timeout {
            (tokio::time::timeout(deadline, fut).await)
                .unwrap_or_else(|_| Err(CandlebinError::request_timeout(capability.as_str())))
        } else {
            fut.await
        }
    }
}
