//! candlebin-core
//!
//! Core types, traits, and algorithms shared across the candlebin workspace.
//!
//! - `types`: identifiers, symbols, price records and candles.
//! - `interval`: resolving a requested interval into a source series and bucket width.
//! - `timeseries`: epoch-anchored bucketing and OHLCV aggregation.
//! - `connector`: the `PriceStore` and `SymbolCatalog` traits storage backends implement.
//! - `artifact`: the delimited result table and the `ArtifactStore` trait.
//!
//! Async runtime (Tokio)
//! ---------------------
//! The filesystem artifact store uses `tokio::fs`, so writing or reading
//! artifacts must happen under a Tokio 1.x runtime. The pure functions
//! (`resolve`, `aggregate`, `encode_csv`) have no runtime requirement.
//!
#![warn(missing_docs)]

/// Result artifacts: CSV codec and filesystem store.
pub mod artifact;
/// Storage traits implemented by price backends.
pub mod connector;
pub mod interval;
/// Time-series bucketing and validation.
pub mod timeseries;
pub mod types;

pub use artifact::{
    ARTIFACT_COLUMNS, ArtifactHandle, ArtifactRow, ArtifactStore, FsArtifactStore,
    artifact_name, decode_csv, encode_csv, read_artifact,
};
pub use connector::{PriceStore, SymbolCatalog};
pub use interval::{
    BucketWidth, Granularity, IntervalSpec, MINUTES_PER_DAY, WidthUnit, max_interval_minutes,
    parse_minutes, resolve, resolve_str,
};
pub use timeseries::resample::{EPOCH_SECONDS, aggregate, aggregate_for, bucket_start, epoch};
pub use timeseries::util::{validate_record, validate_series};
pub use types::*;
