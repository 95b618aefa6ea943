//! Interval resolution: requested minutes → source granularity + bucket width.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CandlebinError;
use crate::timeseries::resample::EPOCH_SECONDS;

/// Minutes in one trading day as far as bucketing is concerned.
pub const MINUTES_PER_DAY: i64 = 1440;

/// Native sampling resolution of the stored price records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// Intraday records (date + time of day).
    SubDay,
    /// One record per trading day (date only).
    Daily,
}

impl Granularity {
    /// Stable lowercase label for logs and store queries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SubDay => "sub-day",
            Self::Daily => "daily",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit a bucket width is expressed in; matches the source timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidthUnit {
    /// Minutes, for sub-day sources.
    Minutes,
    /// Days, for daily sources.
    Days,
}

impl WidthUnit {
    const fn seconds(self) -> i64 {
        match self {
            Self::Minutes => 60,
            Self::Days => 86_400,
        }
    }
}

/// Width of an aggregation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketWidth {
    /// Number of `unit`s per bucket.
    pub count: i64,
    /// Unit of `count`.
    pub unit: WidthUnit,
}

impl BucketWidth {
    /// Width of `count` minutes.
    #[must_use]
    pub const fn minutes(count: i64) -> Self {
        Self {
            count,
            unit: WidthUnit::Minutes,
        }
    }

    /// Width of `count` days.
    #[must_use]
    pub const fn days(count: i64) -> Self {
        Self {
            count,
            unit: WidthUnit::Days,
        }
    }

    /// Bucket width in seconds.
    ///
    /// # Errors
    /// Returns `InvalidGranularity` if the width is non-positive or does not fit
    /// in seconds.
    pub fn seconds(self) -> Result<i64, CandlebinError> {
        if self.count <= 0 {
            return Err(CandlebinError::InvalidGranularity(format!(
                "bucket width must be positive, got {}",
                self.count
            )));
        }
        self.count.checked_mul(self.unit.seconds()).ok_or_else(|| {
            CandlebinError::InvalidGranularity(format!("bucket width {} too large", self.count))
        })
    }
}

impl fmt::Display for BucketWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match (self.unit, self.count) {
            (WidthUnit::Minutes, 1) => "minute",
            (WidthUnit::Minutes, _) => "minutes",
            (WidthUnit::Days, 1) => "day",
            (WidthUnit::Days, _) => "days",
        };
        write!(f, "{} {unit}", self.count)
    }
}

/// Result of resolving a requested interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntervalSpec {
    /// Interval as requested, in minutes.
    pub requested_minutes: i64,
    /// Which stored series to read.
    pub source: Granularity,
    /// Bucket width in the source's time unit.
    pub width: BucketWidth,
}

impl IntervalSpec {
    /// Human-readable bucket label, e.g. `"15 minutes"` or `"2 days"`.
    #[must_use]
    pub fn label(&self) -> String {
        self.width.to_string()
    }
}

/// Largest interval [`resolve`] accepts, in minutes.
///
/// One bucket on either side of the epoch must stay inside the representable
/// date range.
#[must_use]
pub fn max_interval_minutes() -> i64 {
    let below = EPOCH_SECONDS - DateTime::<Utc>::MIN_UTC.timestamp();
    let above = DateTime::<Utc>::MAX_UTC.timestamp() - EPOCH_SECONDS;
    below.min(above) / 60
}

/// Resolve a requested interval in minutes.
///
/// Whole multiples of one day read the daily series with a width in days;
/// everything else reads the sub-day series with a width in minutes.
///
/// # Errors
/// Returns `InvalidInterval` if `requested_minutes` is zero, negative or
/// above [`max_interval_minutes`].
///
/// ```
/// use candlebin_core::{resolve, Granularity, BucketWidth};
/// let spec = resolve(2880).unwrap();
/// assert_eq!(spec.source, Granularity::Daily);
/// assert_eq!(spec.width, BucketWidth::days(2));
/// let spec = resolve(90).unwrap();
/// assert_eq!(spec.source, Granularity::SubDay);
/// assert_eq!(spec.width, BucketWidth::minutes(90));
/// ```
pub fn resolve(requested_minutes: i64) -> Result<IntervalSpec, CandlebinError> {
    if requested_minutes <= 0 {
        return Err(CandlebinError::InvalidInterval(format!(
            "interval must be a positive number of minutes, got {requested_minutes}"
        )));
    }
    let max = max_interval_minutes();
    if requested_minutes > max {
        return Err(CandlebinError::InvalidInterval(format!(
            "interval of {requested_minutes} minutes exceeds the maximum of {max}"
        )));
    }
    let (source, width) = if requested_minutes % MINUTES_PER_DAY == 0 {
        (
            Granularity::Daily,
            BucketWidth::days(requested_minutes / MINUTES_PER_DAY),
        )
    } else {
        (Granularity::SubDay, BucketWidth::minutes(requested_minutes))
    };
    Ok(IntervalSpec {
        requested_minutes,
        source,
        width,
    })
}

/// Parse a raw interval (e.g. a query parameter) as a whole number of minutes.
///
/// Only plain decimal integers are accepted; fractional or sub-minute values
/// such as `"1.5"` are rejected rather than rounded.
///
/// # Errors
/// Returns `InvalidInterval` for empty, non-numeric, fractional or
/// non-positive input.
pub fn parse_minutes(raw: &str) -> Result<i64, CandlebinError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(CandlebinError::InvalidInterval(
            "interval must not be empty".into(),
        ));
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CandlebinError::InvalidInterval(format!(
            "interval must be a whole number of minutes, got {s:?}"
        )));
    }
    let minutes: i64 = s
        .parse()
        .map_err(|_| CandlebinError::InvalidInterval(format!("interval {s:?} out of range")))?;
    if minutes == 0 {
        return Err(CandlebinError::InvalidInterval(
            "interval must be a positive number of minutes, got 0".into(),
        ));
    }
    Ok(minutes)
}

/// [`parse_minutes`] followed by [`resolve`].
///
/// # Errors
/// Returns `InvalidInterval` if the input is not a positive whole number of
/// minutes or is above [`max_interval_minutes`].
pub fn resolve_str(raw: &str) -> Result<IntervalSpec, CandlebinError> {
    resolve(parse_minutes(raw)?)
}
