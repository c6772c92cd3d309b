//! # postgrid-ts: Time-Series Alignment
//!
//! Hourly grid outputs (dispatch, curtailment, emissions) are stored as a
//! [`TimeSeries`]: an ordered UTC index, an optional [`Zone`], and named `f64`
//! columns. Before they reach reporting code they are typically
//!
//! 1. cut down with [`slice_time_series`] (date range, hour window, weekdays),
//! 2. moved to the audience's clock with [`change_time_zone`],
//! 3. aggregated with [`resample_time_series`].
//!
//! Resampling refuses series whose zone observes DST (see [`is_dst`]); use a
//! fixed `Etc/GMT±x` zone instead.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use postgrid_ts::{resample_time_series, Aggregation, Frequency, TimeSeries};
//!
//! let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let ts = TimeSeries::hourly(start, 48, vec![("wind".into(), vec![1.0; 48])]).unwrap();
//!
//! // The partial first and last days are clipped under sum aggregation.
//! let daily = resample_time_series(&ts, Frequency::Day, Aggregation::Sum).unwrap();
//! assert_eq!(daily.row_count(), 1);
//! assert_eq!(daily.column("wind").unwrap(), &[24.0]);
//! ```

pub mod check;
#[cfg(feature = "dataframe")]
pub mod frame;
pub mod resample;
pub mod series;
pub mod slice;
pub mod zone;

pub use check::{
    check_date_range_in_time_series, check_non_negative, check_time_series, DEFAULT_TOLERANCE,
};
pub use resample::{resample_time_series, Aggregation, Frequency};
pub use series::TimeSeries;
pub use slice::{is_24_hour_format, slice_time_series, SliceFilter};
pub use zone::{change_time_zone, is_dst, Zone};
