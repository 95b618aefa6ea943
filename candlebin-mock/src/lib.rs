use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use candlebin_core::{
    CandlebinError, Granularity, InstrumentId, PriceRecord, PriceStore, Symbol, SymbolCatalog,
};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockStore, MockBehavior};

/// Mock store and catalog for CI-safe tests. Provides deterministic data from static fixtures.
#[derive(Default)]
pub struct MockStore {
    fetches: AtomicUsize,
}

impl MockStore {
    /// Create a mock with its fetch counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of `fetch` calls served so far, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn maybe_fail_or_delay(id: InstrumentId) -> Result<(), CandlebinError> {
        match fixtures::symbol_for(id) {
            Some("FAIL") => Err(CandlebinError::store(
                "candlebin-mock",
                format!("forced failure for instrument {id}"),
            )),
            Some("SLOW") => {
                // Long enough to trip a short store timeout in tests.
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl PriceStore for MockStore {
    fn name(&self) -> &'static str {
        "candlebin-mock"
    }

    async fn fetch(
        &self,
        instrument: InstrumentId,
        granularity: Granularity,
    ) -> Result<Vec<PriceRecord>, CandlebinError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Self::maybe_fail_or_delay(instrument).await?;
        Ok(fixtures::records(instrument, granularity))
    }
}

#[async_trait]
impl SymbolCatalog for MockStore {
    async fn resolve_symbol(&self, symbol: &Symbol) -> Result<InstrumentId, CandlebinError> {
        fixtures::instrument_for(symbol.as_str())
            .ok_or_else(|| CandlebinError::unknown_symbol(symbol.as_str()))
    }
}
