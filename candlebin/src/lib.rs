//! Candlebin resamples stored price records into OHLCV candles.
//!
//! Overview
//! - Resolves a requested interval in minutes into a source series (minute or
//!   daily) and a bucket width, failing fast on invalid intervals.
//! - Resolves symbols through an injected `SymbolCatalog` and fetches raw
//!   records from an injected `PriceStore`, each call bounded by a timeout.
//! - Aggregates records into epoch-anchored candles (`candlebin_core::aggregate`).
//! - Caches each (instrument, interval) series with single-flight semantics.
//! - Exports series as `Date,open,high,low,close,volume` artifacts through an
//!   injected `ArtifactStore`, reusing artifacts that already exist.
//!
//! Key behaviors and trade-offs
//! - Errors are never cached: a failed fetch is reported to every waiting
//!   caller and the next request retries.
//! - Artifact reuse is keyed by file name only. Data added to the store after
//!   an artifact was written is not reflected until the artifact is removed.
//! - The optional request deadline bounds the whole call, including time spent
//!   waiting on another caller's in-flight computation.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use candlebin::{Candlebin, Symbol};
//!
//! let bin = Candlebin::builder()
//!     .with_store(store.clone())
//!     .with_catalog(store)
//!     .build()?;
//! let series = bin.candles(&Symbol::new("MSFT")?, 30).await?;
//! for c in &series.candles {
//!     println!("{} {} {} {} {} {}", c.bucket_start, c.open, c.high, c.low, c.close, c.volume);
//! }
//! ```
#![warn(missing_docs)]

mod core;
mod router;

pub use crate::core::{Candlebin, CandlebinBuilder};

pub use candlebin_core::{
    ArtifactHandle, ArtifactStore, BucketWidth, CacheConfig, Candle, CandleSeries,
    CandlebinConfig, CandlebinError, Capability, FsArtifactStore, Granularity, InstrumentId,
    IntervalSpec, PriceRecord, PriceStore, Symbol, SymbolCatalog,
};
