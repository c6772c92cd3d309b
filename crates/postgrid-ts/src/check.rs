//! Input checks shared by every time-series operation.

use chrono::NaiveDateTime;
use postgrid_core::{PostgridError, PostgridResult};

use crate::series::TimeSeries;

/// Values below `-DEFAULT_TOLERANCE` count as negative.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// Fail if the series has no rows or no columns.
pub fn check_time_series(ts: &TimeSeries, label: &str) -> PostgridResult<()> {
    if ts.row_count() == 0 {
        return Err(PostgridError::validation(format!("{label} must have at least one row")));
    }
    if ts.column_count() == 0 {
        return Err(PostgridError::validation(format!(
            "{label} must have at least one column"
        )));
    }
    Ok(())
}

/// [`check_time_series`] plus no value below `-tolerance`.
pub fn check_non_negative(ts: &TimeSeries, label: &str, tolerance: f64) -> PostgridResult<()> {
    check_time_series(ts, label)?;
    for (name, values) in ts.columns() {
        if let Some(v) = values.iter().find(|&&v| v < -tolerance || v.is_nan()) {
            return Err(PostgridError::validation(format!(
                "{label} must be non-negative; column '{name}' contains {v}"
            )));
        }
    }
    Ok(())
}

/// Fail unless `start < end` and both lie within the series' wall-clock range.
pub fn check_date_range_in_time_series(
    ts: &TimeSeries,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> PostgridResult<()> {
    check_time_series(ts, "time series")?;
    if start >= end {
        return Err(PostgridError::validation(format!(
            "start date ({start}) must be before end date ({end})"
        )));
    }
    let local = ts.local_index();
    let (first, last) = match (local.first(), local.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(PostgridError::validation("time series is empty")),
    };
    if start < first || start > last {
        return Err(PostgridError::validation(format!(
            "start date ({start}) is outside the time series range [{first}, {last}]"
        )));
    }
    if end < first || end > last {
        return Err(PostgridError::validation(format!(
            "end date ({end}) is outside the time series range [{first}, {last}]"
        )));
    }
    Ok(())
}
