use core::fmt;
use serde::{Deserialize, Serialize};

/// Capability labels used in timeouts, errors and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Capability {
    /// Resolve a symbol to an instrument identifier.
    ResolveSymbol,
    /// Fetch raw price records from the store.
    FetchPrices,
    /// Produce a resampled candle series.
    Candles,
    /// Produce (or reuse) a delimited result artifact.
    Export,
}

impl Capability {
    /// Stable, kebab-case identifier for logs/errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ResolveSymbol => "resolve-symbol",
            Self::FetchPrices => "fetch-prices",
            Self::Candles => "candles",
            Self::Export => "export",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
