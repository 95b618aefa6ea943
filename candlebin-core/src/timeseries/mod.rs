//! Time-series utilities for the resampling engine.
//!
//! Modules include:
//! - `resample`: epoch-anchored bucketing and OHLCV reduction
//! - `util`: price record invariants
/// Bucketing and OHLCV aggregation.
pub mod resample;
/// Record validation helpers.
pub mod util;
