#![doc = include_str!("../README.md")]
//! candlebin-middleware
//!
//! Re-exports for cache and store wrappers.

mod single_flight;
mod timeout;

pub use crate::single_flight::SingleFlightCache;
pub use crate::timeout::TimeoutStore;
