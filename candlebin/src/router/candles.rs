use std::sync::Arc;

use candlebin_core::{
    CandleSeries, CandlebinError, Capability, InstrumentId, IntervalSpec, Symbol, aggregate_for,
    resolve,
};

use crate::Candlebin;

const CATALOG_NAME: &str = "catalog";

impl Candlebin {
    /// Resolve a requested interval in minutes.
    ///
    /// # Errors
    /// Returns `InvalidInterval` if `minutes` is zero or negative.
    pub fn interval(&self, minutes: i64) -> Result<IntervalSpec, CandlebinError> {
        resolve(minutes)
    }

    /// Candles for `symbol` at `minutes`-wide buckets.
    ///
    /// The interval is validated before any collaborator is touched. Results
    /// are cached per (instrument, interval); concurrent requests for the same
    /// pair share one store fetch and one aggregation. An instrument without
    /// data yields an empty series.
    ///
    /// # Errors
    /// - `InvalidInterval` for a non-positive interval.
    /// - `UnknownSymbol` if the catalog does not know `symbol`.
    /// - `DataIntegrity` if a stored record violates price invariants.
    /// - `StoreTimeout`/`RequestTimeout` when a deadline is exceeded.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candlebin::candles",
            skip(self),
            fields(symbol = %symbol, minutes = minutes),
        )
    )]
    pub async fn candles(
        &self,
        symbol: &Symbol,
        minutes: i64,
    ) -> Result<Arc<CandleSeries>, CandlebinError> {
        let spec = resolve(minutes)?;
        self.with_request_deadline(Capability::Candles, self.series_for(symbol, spec))
            .await
    }

    /// Drop the cached series for (`symbol`, `minutes`) so the next request refetches.
    ///
    /// # Errors
    /// Returns `UnknownSymbol` if the catalog does not know `symbol`.
    pub async fn invalidate(&self, symbol: &Symbol, minutes: i64) -> Result<(), CandlebinError> {
        let instrument = self.instrument_for(symbol).await?;
        self.series.invalidate(&(instrument, minutes)).await;
        Ok(())
    }

    pub(crate) async fn instrument_for(
        &self,
        symbol: &Symbol,
    ) -> Result<InstrumentId, CandlebinError> {
        Self::store_call_with_timeout(
            CATALOG_NAME,
            Capability::ResolveSymbol,
            self.cfg.store_timeout,
            self.catalog.resolve_symbol(symbol),
        )
        .await
    }

    pub(crate) async fn series_for(
        &self,
        symbol: &Symbol,
        spec: IntervalSpec,
    ) -> Result<Arc<CandleSeries>, CandlebinError> {
        let instrument = self.instrument_for(symbol).await?;
        self.series
            .get_or_try_compute((instrument, spec.requested_minutes), async {
                let records = self.store.fetch(instrument, spec.source).await?;

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    store = self.store.name(),
                    records = records.len(),
                    source = %spec.source,
                    "fetched price records"
                );

                let candles = aggregate_for(records, &spec)?;
                Ok(Arc::new(CandleSeries {
                    instrument,
                    symbol: symbol.clone(),
                    spec,
                    candles,
                }))
            })
            .await
    }
}
