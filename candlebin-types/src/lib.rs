//! Candlebin-specific error taxonomy and configuration primitives.
#![warn(missing_docs)]

mod capability;
mod config;
mod error;

pub use capability::Capability;
pub use config::{CacheConfig, CandlebinConfig};
pub use error::CandlebinError;
