use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use candlebin_core::{
    CandlebinError, Granularity, InstrumentId, PriceRecord, PriceStore, Symbol, SymbolCatalog,
};

/// Instruction for how a method should behave for a given input.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Sleep for the given duration, then return the value.
    Delay(Duration, T),
    /// Fail immediately with the provided error.
    Fail(CandlebinError),
    /// Hang indefinitely (simulate a stalled store).
    Hang,
}

#[derive(Default)]
struct InternalState {
    symbols: HashMap<Symbol, InstrumentId>,
    fetch_rules: HashMap<(InstrumentId, Granularity), MockBehavior<Vec<PriceRecord>>>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
    fetches: Arc<AtomicUsize>,
}

impl DynamicMockController {
    /// Register `symbol` in the catalog as `id`.
    pub async fn set_symbol(&self, symbol: Symbol, id: InstrumentId) {
        let mut guard = self.state.lock().await;
        guard.symbols.insert(symbol, id);
    }

    /// Set the behavior for `fetch` calls for an instrument and granularity.
    pub async fn set_fetch_behavior(
        &self,
        id: InstrumentId,
        granularity: Granularity,
        behavior: MockBehavior<Vec<PriceRecord>>,
    ) {
        let mut guard = self.state.lock().await;
        guard.fetch_rules.insert((id, granularity), behavior);
    }

    /// Number of `fetch` calls observed so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Clear all configured behaviors, catalog entries, and the fetch counter.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.symbols.clear();
        guard.fetch_rules.clear();
        self.fetches.store(0, Ordering::SeqCst);
    }
}

/// A store and catalog that defer all behavior to an external controller.
///
/// Unscripted instruments have no rows; unregistered symbols are unknown.
pub struct DynamicMockStore {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
    fetches: Arc<AtomicUsize>,
}

impl DynamicMockStore {
    /// Create a new dynamic mock store and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<Self>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let fetches = Arc::new(AtomicUsize::new(0));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
            fetches: Arc::clone(&fetches),
        };
        let me = Arc::new(Self {
            name,
            state,
            fetches,
        });
        (me, controller)
    }
}

#[async_trait]
impl PriceStore for DynamicMockStore {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(
        &self,
        instrument: InstrumentId,
        granularity: Granularity,
    ) -> Result<Vec<PriceRecord>, CandlebinError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        // Snapshot the rule without holding the lock across await points
        let behavior = {
            let guard = self.state.lock().await;
            guard.fetch_rules.get(&(instrument, granularity)).cloned()
        };

        match behavior {
            Some(MockBehavior::Return(rows)) => Ok(rows),
            Some(MockBehavior::Delay(d, rows)) => {
                tokio::time::sleep(d).await;
                Ok(rows)
            }
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => std::future::pending().await,
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl SymbolCatalog for DynamicMockStore {
    async fn resolve_symbol(&self, symbol: &Symbol) -> Result<InstrumentId, CandlebinError> {
        let guard = self.state.lock().await;
        guard
            .symbols
            .get(symbol)
            .copied()
            .ok_or_else(|| CandlebinError::unknown_symbol(symbol.as_str()))
    }
}
