use async_trait::async_trait;

use crate::interval::Granularity;
use crate::{CandlebinError, InstrumentId, PriceRecord, Symbol};

/// Queryable source of time-stamped price records.
///
/// Implementations own their connection lifecycle; the orchestrator only
/// borrows them through `Arc<dyn PriceStore>`.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// A stable identifier for this store (used in error tagging and logs).
    fn name(&self) -> &'static str;

    /// Fetch every record of `instrument` at `granularity`, ordered by time.
    ///
    /// An instrument without data yields an empty vector, not an error.
    async fn fetch(
        &self,
        instrument: InstrumentId,
        granularity: Granularity,
    ) -> Result<Vec<PriceRecord>, CandlebinError>;
}

/// Resolves human-readable symbols to instrument identifiers.
#[async_trait]
pub trait SymbolCatalog: Send + Sync {
    /// Look up the instrument for `symbol`.
    ///
    /// Returns `UnknownSymbol` when the catalog has no such instrument.
    async fn resolve_symbol(&self, symbol: &Symbol) -> Result<InstrumentId, CandlebinError>;
}
