use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the candlebin workspace.
///
/// The first four variants are the resampling engine's own taxonomy; the rest
/// cover collaborator failures (store, artifacts) and request deadlines.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CandlebinError {
    /// Requested interval is non-positive or not a whole number of minutes.
    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    /// Bucket width resolved to a non-positive value.
    #[error("invalid granularity: {0}")]
    InvalidGranularity(String),

    /// The catalog has no instrument for this symbol.
    #[error("unknown symbol: {symbol}")]
    UnknownSymbol {
        /// Symbol as requested by the caller (normalized).
        symbol: String,
    },

    /// A source record violates basic price invariants.
    #[error("data integrity: {0}")]
    DataIntegrity(String),

    /// Invalid input argument (malformed symbol, missing builder component, ...).
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The price store or catalog reported a failure.
    #[error("{store} failed: {msg}")]
    Store {
        /// Store name that failed.
        store: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A single store call exceeded the configured timeout.
    #[error("store timed out: {capability} via {store}")]
    StoreTimeout {
        /// Store name that timed out.
        store: String,
        /// Capability label (e.g. "fetch-prices").
        capability: String,
    },

    /// The overall request exceeded the configured deadline.
    #[error("request timed out: {capability}")]
    RequestTimeout {
        /// Capability label for which the request timed out.
        capability: String,
    },

    /// Writing or reading a result artifact failed.
    #[error("artifact: {0}")]
    Artifact(String),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl CandlebinError {
    /// Helper: build an `UnknownSymbol` error.
    pub fn unknown_symbol(symbol: impl Into<String>) -> Self {
        Self::UnknownSymbol {
            symbol: symbol.into(),
        }
    }

    /// Helper: build a `Store` error with the store name and message.
    pub fn store(store: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Store {
            store: store.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `StoreTimeout` error.
    pub fn store_timeout(store: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::StoreTimeout {
            store: store.into(),
            capability: capability.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    #[must_use]
    pub fn request_timeout(capability: impl Into<String>) -> Self {
        Self::RequestTimeout {
            capability: capability.into(),
        }
    }

    /// Returns true if the caller supplied something unusable.
    ///
    /// Request surfaces map these to a client-error response; everything else
    /// is a server-side failure.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInterval(_) | Self::UnknownSymbol { .. } | Self::InvalidArg(_)
        )
    }

    /// Returns true for store-level and request-level deadline failures.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::StoreTimeout { .. } | Self::RequestTimeout { .. })
    }

    /// Short stable identifier of the error kind, safe to expose to clients.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInterval(_) => "invalid_interval",
            Self::InvalidGranularity(_) => "invalid_granularity",
            Self::UnknownSymbol { .. } => "unknown_symbol",
            Self::DataIntegrity(_) => "data_integrity",
            Self::InvalidArg(_) => "invalid_argument",
            Self::Store { .. } => "store_error",
            Self::StoreTimeout { .. } => "store_timeout",
            Self::RequestTimeout { .. } => "request_timeout",
            Self::Artifact(_) => "artifact_error",
            Self::Other(_) => "internal_error",
        }
    }
}

impl From<std::io::Error> for CandlebinError {
    fn from(e: std::io::Error) -> Self {
        Self::Artifact(e.to_string())
    }
}
