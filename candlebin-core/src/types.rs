//! Domain values shared by the resolver, the aggregator and the collaborators.

use core::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use candlebin_types::{CacheConfig, CandlebinConfig, CandlebinError, Capability};

use crate::interval::IntervalSpec;

const SYMBOL_MAX_LEN: usize = 32;

/// Opaque instrument identifier issued by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstrumentId(pub i64);

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized ticker symbol.
///
/// Symbols are trimmed and upper-cased, and limited to `[A-Z0-9.^=-]` so that
/// they can be embedded in artifact file names as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Normalize and validate a raw ticker.
    ///
    /// # Errors
    /// Returns `InvalidArg` for empty, overlong or otherwise malformed tickers.
    pub fn new(raw: &str) -> Result<Self, CandlebinError> {
        let s = raw.trim().to_ascii_uppercase();
        if s.is_empty() {
            return Err(CandlebinError::InvalidArg("symbol must not be empty".into()));
        }
        if s.len() > SYMBOL_MAX_LEN {
            return Err(CandlebinError::InvalidArg(format!(
                "symbol longer than {SYMBOL_MAX_LEN} characters"
            )));
        }
        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '-')))
        {
            return Err(CandlebinError::InvalidArg(format!(
                "symbol contains unsupported character {bad:?}"
            )));
        }
        if s.starts_with('.') {
            return Err(CandlebinError::InvalidArg(
                "symbol must not start with '.'".into(),
            ));
        }
        Ok(Self(s))
    }

    /// Returns the normalized ticker.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = CandlebinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = CandlebinError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<Symbol> for String {
    fn from(s: Symbol) -> Self {
        s.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One observation of an instrument at a point in time.
///
/// `open`/`close` are point observations; `high`/`low` are extrema over the
/// record's own native span. Daily records carry midnight timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Instrument this record belongs to.
    pub instrument_id: InstrumentId,
    /// Wall-clock time of the observation.
    pub timestamp: NaiveDateTime,
    /// Opening price.
    pub open: Decimal,
    /// Highest price over the record's span.
    pub high: Decimal,
    /// Lowest price over the record's span.
    pub low: Decimal,
    /// Closing price.
    pub close: Decimal,
    /// Traded quantity.
    pub volume: Decimal,
}

/// OHLCV reduction of every record falling into one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Start of the bucket; the candle's identity.
    pub bucket_start: NaiveDateTime,
    /// `open` of the chronologically first record.
    pub open: Decimal,
    /// Maximum `high` in the bucket.
    pub high: Decimal,
    /// Minimum `low` in the bucket.
    pub low: Decimal,
    /// `close` of the chronologically last record.
    pub close: Decimal,
    /// Sum of volumes.
    pub volume: Decimal,
    /// Number of records that contributed to this candle.
    pub samples: usize,
}

/// A resampled series for one (instrument, interval) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandleSeries {
    /// Instrument identifier resolved from `symbol`.
    pub instrument: InstrumentId,
    /// Symbol the series was requested for.
    pub symbol: Symbol,
    /// Resolved interval.
    pub spec: IntervalSpec,
    /// Candles in strictly increasing `bucket_start` order.
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    /// Number of candles in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// True when the instrument had no data at the source granularity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}
