use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;

use crate::interval::{BucketWidth, IntervalSpec};
use crate::timeseries::util::validate_series;
use crate::{Candle, CandlebinError, PriceRecord};

/// Unix seconds of the bucket anchor, 2001-01-01T00:00:00.
pub const EPOCH_SECONDS: i64 = 978_307_200;

/// The bucket anchor, 2001-01-01T00:00:00.
#[must_use]
pub fn epoch() -> NaiveDateTime {
    // EPOCH_SECONDS is well inside chrono's representable range.
    DateTime::from_timestamp(EPOCH_SECONDS, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default()
}

fn bucket_key(ts: NaiveDateTime, step: i64) -> i64 {
    (ts.and_utc().timestamp() - EPOCH_SECONDS).div_euclid(step)
}

fn key_start(key: i64, step: i64) -> Result<NaiveDateTime, CandlebinError> {
    key.checked_mul(step)
        .and_then(|offset| offset.checked_add(EPOCH_SECONDS))
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| {
            CandlebinError::DataIntegrity(format!(
                "bucket {key} of {step}s falls outside the supported date range"
            ))
        })
}

/// Start of the epoch-anchored bucket containing `ts`.
///
/// Equals `floor((ts - epoch) / width) * width + epoch`; a timestamp exactly on a
/// boundary starts its own bucket.
///
/// # Errors
/// - `InvalidGranularity` if `width` is non-positive or does not fit in seconds.
/// - `DataIntegrity` if the bucket start is not a representable date.
pub fn bucket_start(ts: NaiveDateTime, width: BucketWidth) -> Result<NaiveDateTime, CandlebinError> {
    let step = width.seconds()?;
    key_start(bucket_key(ts, step), step)
}

struct BucketAgg {
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
    samples: usize,
}

impl BucketAgg {
    fn start(r: &PriceRecord) -> Self {
        Self {
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
            samples: 1,
        }
    }

    fn push(&mut self, r: &PriceRecord) -> Result<(), CandlebinError> {
        if r.high > self.high {
            self.high = r.high;
        }
        if r.low < self.low {
            self.low = r.low;
        }
        self.close = r.close;
        self.volume = self.volume.checked_add(r.volume).ok_or_else(|| {
            CandlebinError::DataIntegrity(format!("volume overflow at {}", r.timestamp))
        })?;
        self.samples += 1;
        Ok(())
    }

    fn finish(self, key: i64, step: i64) -> Result<Candle, CandlebinError> {
        Ok(Candle {
            bucket_start: key_start(key, step)?,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            samples: self.samples,
        })
    }
}

/// Aggregate price records into epoch-anchored OHLCV candles.
///
/// - Records are stable-sorted by timestamp; equal timestamps keep input order.
/// - Open  = open of the first record in the bucket
/// - High  = max high
/// - Low   = min low
/// - Close = close of the last record in the bucket
/// - Volume = sum of volumes
/// - One candle per non-empty bucket, ascending by `bucket_start`.
///
/// The caller is responsible for passing records of a single instrument.
///
/// # Errors
/// - `InvalidGranularity` if `width` is non-positive.
/// - `DataIntegrity` if any record has a negative volume or `high < low`, or
///   falls in a bucket that starts before the earliest representable date.
///
/// ```
/// use candlebin_core::{aggregate, BucketWidth, InstrumentId, PriceRecord};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// let at = |m: u32| NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, m, 0).unwrap();
/// let rec = |m: u32, v: i64| PriceRecord {
///     instrument_id: InstrumentId(1), timestamp: at(m),
///     open: Decimal::ONE, high: Decimal::from(2), low: Decimal::ONE, close: Decimal::from(2),
///     volume: Decimal::from(v),
/// };
/// let out = aggregate(vec![rec(31, 10), rec(30, 5)], BucketWidth::minutes(5)).unwrap();
/// assert_eq!(out.len(), 1);
/// assert_eq!(out[0].volume, Decimal::from(15));
/// assert!(aggregate(vec![rec(30, -1)], BucketWidth::minutes(5)).is_err());
/// ```
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "candlebin::core::aggregate",
        skip(records),
        fields(records = records.len(), width = %width),
    )
)]
pub fn aggregate(
    mut records: Vec<PriceRecord>,
    width: BucketWidth,
) -> Result<Vec<Candle>, CandlebinError> {
    let step = width.seconds()?;
    validate_series(&records)?;

    // Stable: ties keep read order, which decides first/last within a bucket.
    records.sort_by_key(|r| r.timestamp);

    let mut out: Vec<Candle> = Vec::new();
    let mut iter = records.into_iter();
    let Some(first) = iter.next() else {
        return Ok(out);
    };
    let mut cur_key = bucket_key(first.timestamp, step);
    let mut agg = BucketAgg::start(&first);

    for r in iter {
        let key = bucket_key(r.timestamp, step);
        if key == cur_key {
            agg.push(&r)?;
        } else {
            out.push(agg.finish(cur_key, step)?);
            cur_key = key;
            agg = BucketAgg::start(&r);
        }
    }
    out.push(agg.finish(cur_key, step)?);

    #[cfg(feature = "tracing")]
    tracing::debug!(candles = out.len(), "aggregated price records");

    Ok(out)
}

/// [`aggregate`] with the bucket width of a resolved interval.
///
/// # Errors
/// Same as [`aggregate`].
pub fn aggregate_for(
    records: Vec<PriceRecord>,
    spec: &IntervalSpec,
) -> Result<Vec<Candle>, CandlebinError> {
    aggregate(records, spec.width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InstrumentId;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hh, mm, 0)
            .unwrap()
    }

    fn rec(ts: NaiveDateTime, o: i64, h: i64, l: i64, c: i64, v: i64) -> PriceRecord {
        PriceRecord {
            instrument_id: InstrumentId(7),
            timestamp: ts,
            open: Decimal::from(o),
            high: Decimal::from(h),
            low: Decimal::from(l),
            close: Decimal::from(c),
            volume: Decimal::from(v),
        }
    }

    #[test]
    fn epoch_is_2001_01_01() {
        assert_eq!(epoch(), at(2001, 1, 1, 0, 0));
    }

    #[test]
    fn boundary_record_starts_its_bucket() {
        // 2001-01-01 is the anchor, so 09:30 is a 3-minute boundary (570 % 3 == 0).
        let w = BucketWidth::minutes(3);
        assert_eq!(bucket_start(at(2024, 3, 4, 9, 30), w).unwrap(), at(2024, 3, 4, 9, 30));
        assert_eq!(bucket_start(at(2024, 3, 4, 9, 32), w).unwrap(), at(2024, 3, 4, 9, 30));
        assert_eq!(bucket_start(at(2024, 3, 4, 9, 33), w).unwrap(), at(2024, 3, 4, 9, 33));
    }

    #[test]
    fn buckets_before_epoch_floor_downwards() {
        let w = BucketWidth::days(7);
        // 2000-12-31 is one day before the anchor: bucket starts a week before it.
        assert_eq!(bucket_start(at(2000, 12, 31, 0, 0), w).unwrap(), at(2000, 12, 25, 0, 0));
    }

    #[test]
    fn same_timestamp_ties_keep_read_order() {
        let ts = at(2024, 3, 4, 10, 0);
        let out = aggregate(
            vec![rec(ts, 1, 5, 1, 2, 1), rec(ts, 3, 4, 2, 4, 1)],
            BucketWidth::minutes(5),
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].open, Decimal::from(1));
        assert_eq!(out[0].close, Decimal::from(4));
        assert_eq!(out[0].samples, 2);
    }

    #[test]
    fn unsorted_input_is_sorted_before_bucketing() {
        let out = aggregate(
            vec![
                rec(at(2024, 3, 4, 10, 7), 30, 31, 29, 30, 1),
                rec(at(2024, 3, 4, 10, 1), 10, 11, 9, 10, 1),
                rec(at(2024, 3, 4, 10, 3), 20, 21, 19, 20, 1),
            ],
            BucketWidth::minutes(5),
        )
        .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].bucket_start, at(2024, 3, 4, 10, 0));
        assert_eq!(out[0].open, Decimal::from(10));
        assert_eq!(out[0].close, Decimal::from(20));
        assert_eq!(out[1].bucket_start, at(2024, 3, 4, 10, 5));
    }

    #[test]
    fn unrepresentable_bucket_start_is_a_data_error() {
        let width = BucketWidth::minutes(crate::max_interval_minutes());
        let ancient = rec(NaiveDateTime::MIN, 1, 1, 1, 1, 1);
        assert!(matches!(
            aggregate(vec![ancient], width),
            Err(CandlebinError::DataIntegrity(_))
        ));
        let recent = aggregate(vec![rec(at(2024, 3, 4, 9, 30), 1, 1, 1, 1, 1)], width).unwrap();
        assert_eq!(recent[0].bucket_start, epoch());
    }

    #[test]
    fn non_positive_width_is_rejected_even_for_empty_input() {
        assert!(matches!(
            aggregate(Vec::new(), BucketWidth::minutes(0)),
            Err(CandlebinError::InvalidGranularity(_))
        ));
        assert!(matches!(
            aggregate(Vec::new(), BucketWidth::days(-1)),
            Err(CandlebinError::InvalidGranularity(_))
        ));
    }
}
