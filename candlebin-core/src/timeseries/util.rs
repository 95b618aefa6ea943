//! Shared helpers for price record invariants.

use rust_decimal::Decimal;

use crate::{CandlebinError, PriceRecord};

/// Ensure a single record satisfies the basic price invariants.
///
/// # Errors
/// Returns `Err(CandlebinError::DataIntegrity)` if the record's volume is
/// negative or its high is below its low.
pub fn validate_record(r: &PriceRecord) -> Result<(), CandlebinError> {
    if r.volume < Decimal::ZERO {
        return Err(CandlebinError::DataIntegrity(format!(
            "negative volume {} at {}",
            r.volume, r.timestamp
        )));
    }
    if r.high < r.low {
        return Err(CandlebinError::DataIntegrity(format!(
            "high {} below low {} at {}",
            r.high, r.low, r.timestamp
        )));
    }
    Ok(())
}

/// Ensure every record in the series satisfies [`validate_record`].
///
/// # Errors
/// Returns the first `DataIntegrity` violation found, in input order.
pub fn validate_series(records: &[PriceRecord]) -> Result<(), CandlebinError> {
    records.iter().try_for_each(validate_record)
}
