//! Per-call deadline for price store fetches.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use candlebin_core::{Granularity, InstrumentId, PriceRecord, PriceStore};
use candlebin_types::{CandlebinError, Capability};

/// Wrapper that bounds every `fetch` on the inner store.
///
/// A fetch that does not complete in time is dropped and reported as
/// `StoreTimeout`, tagged with the inner store's name.
pub struct TimeoutStore {
    inner: Arc<dyn PriceStore>,
    timeout: Duration,
}

impl TimeoutStore {
    /// Wrap `inner` with a per-fetch `timeout`.
    pub fn new(inner: Arc<dyn PriceStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Access the inner store.
    pub fn inner(&self) -> &Arc<dyn PriceStore> {
        &self.inner
    }

    /// Configured per-fetch timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl PriceStore for TimeoutStore {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn fetch(
        &self,
        instrument: InstrumentId,
        granularity: Granularity,
    ) -> Result<Vec<PriceRecord>, CandlebinError> {
        match tokio::time::timeout(self.timeout, self.inner.fetch(instrument, granularity)).await {
            Ok(res) => res,
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    store = self.inner.name(),
                    %instrument,
                    %granularity,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "price store fetch timed out"
                );
                Err(CandlebinError::store_timeout(
                    self.inner.name(),
                    Capability::FetchPrices.as_str(),
                ))
            }
        }
    }
}
