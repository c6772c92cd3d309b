//! Calendar resampling of hourly series.
//!
//! Periods are left-closed and labelled by their first wall-clock instant:
//! days start at midnight, weeks on Sunday, months on the 1st. Two
//! aggregation rules are supported:
//!
//! * [`Aggregation::Sum`] keeps a period only if every hour of it is present
//!   (24 for a day, 168 for a week, `days_in_month * 24` for a month), so
//!   partial periods at either end of the input are clipped.
//! * [`Aggregation::Mean`] keeps every period the input touches and averages
//!   whatever samples fall in it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use postgrid_core::{PostgridError, PostgridResult};

use crate::check::check_time_series;
use crate::series::TimeSeries;
use crate::zone::is_dst;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Day,
    Week,
    Month,
}

impl Frequency {
    /// First calendar day of the period containing `local`.
    pub fn period_start(&self, local: NaiveDateTime) -> NaiveDate {
        let date = local.date();
        match self {
            Frequency::Day => date,
            Frequency::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
            }
            Frequency::Month => date - Duration::days(i64::from(date.day0())),
        }
    }

    /// Hourly samples in a complete period containing `date`.
    pub fn expected_samples(&self, date: NaiveDate) -> usize {
        match self {
            Frequency::Day => 24,
            Frequency::Week => 7 * 24,
            Frequency::Month => days_in_month(date) * 24,
        }
    }

    fn plural(&self) -> &'static str {
        match self {
            Frequency::Day => "days",
            Frequency::Week => "weeks",
            Frequency::Month => "months",
        }
    }
}

fn days_in_month(date: NaiveDate) -> usize {
    let first = date - Duration::days(i64::from(date.day0()));
    let mut days = 28;
    while (first + Duration::days(days)).month() == first.month() {
        days += 1;
    }
    days as usize
}

impl FromStr for Frequency {
    type Err = PostgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "D" | "day" | "daily" => Ok(Frequency::Day),
            "W" | "week" | "weekly" => Ok(Frequency::Week),
            "M" | "month" | "monthly" => Ok(Frequency::Month),
            other => Err(PostgridError::validation(format!(
                "frequency must be one of 'D', 'W', 'M', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Frequency::Day => "D",
            Frequency::Week => "W",
            Frequency::Month => "M",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
    Mean,
}

impl FromStr for Aggregation {
    type Err = PostgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(Aggregation::Sum),
            "mean" => Ok(Aggregation::Mean),
            other => Err(PostgridError::validation(format!(
                "aggregation method must be 'sum' or 'mean', got '{other}'"
            ))),
        }
    }
}

struct PeriodStats {
    count: usize,
    sums: Vec<f64>,
}

/// Resample an hourly series to daily, weekly or monthly cadence.
///
/// Fails if the series' zone observes DST within the covered range: hour
/// counting would silently misjudge which periods are complete.
pub fn resample_time_series(
    ts: &TimeSeries,
    freq: Frequency,
    agg: Aggregation,
) -> PostgridResult<TimeSeries> {
    check_time_series(ts, "time series")?;
    if is_dst(ts) {
        return Err(PostgridError::validation(
            "DST is not supported. Use Etc/GMT+x or Etc/GMT-x where x is the offset",
        ));
    }

    let columns: Vec<&[f64]> = ts.columns().map(|(_, values)| values).collect();
    let mut periods: BTreeMap<NaiveDate, PeriodStats> = BTreeMap::new();
    for (row, local) in ts.local_index().into_iter().enumerate() {
        let stats = periods
            .entry(freq.period_start(local))
            .or_insert_with(|| PeriodStats {
                count: 0,
                sums: vec![0.0; columns.len()],
            });
        stats.count += 1;
        for (acc, column) in stats.sums.iter_mut().zip(&columns) {
            *acc += column[row];
        }
    }

    let mut index = Vec::with_capacity(periods.len());
    let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(periods.len()); columns.len()];
    let mut clipped = Vec::new();
    for (start, stats) in periods {
        let row: Vec<f64> = match agg {
            Aggregation::Sum => {
                if stats.count != freq.expected_samples(start) {
                    clipped.push(start);
                    continue;
                }
                stats.sums
            }
            Aggregation::Mean => stats
                .sums
                .iter()
                .map(|s| s / stats.count as f64)
                .collect(),
        };
        index.push(period_instant(ts, start)?);
        for (column, value) in values.iter_mut().zip(row) {
            column.push(value);
        }
    }

    if agg == Aggregation::Sum {
        tracing::info!(
            clipped = clipped.len(),
            first = ?clipped.first(),
            last = ?clipped.last(),
            "clip incomplete {}",
            freq.plural()
        );
    }

    let names = ts.column_names().map(str::to_string);
    Ok(TimeSeries::new(index, names.zip(values).collect())?.with_zone(ts.zone()))
}

fn period_instant(
    ts: &TimeSeries,
    start: NaiveDate,
) -> PostgridResult<chrono::DateTime<chrono::Utc>> {
    start
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| ts.instant_at(&midnight))
        .ok_or_else(|| {
            PostgridError::validation(format!(
                "period start {start} does not exist in the series' time zone"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_frequency_and_aggregation() {
        assert_eq!("D".parse::<Frequency>().unwrap(), Frequency::Day);
        assert_eq!("week".parse::<Frequency>().unwrap(), Frequency::Week);
        assert_eq!("M".parse::<Frequency>().unwrap(), Frequency::Month);
        assert!("Q".parse::<Frequency>().is_err());
        assert_eq!("mean".parse::<Aggregation>().unwrap(), Aggregation::Mean);
        assert!("median".parse::<Aggregation>().is_err());
    }

    #[test]
    fn weeks_start_on_sunday() {
        // 2016-01-01 was a Friday.
        let friday = day(2016, 1, 1).and_hms_opt(13, 0, 0).unwrap();
        assert_eq!(Frequency::Week.period_start(friday), day(2015, 12, 27));
        let sunday = day(2016, 1, 3).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(Frequency::Week.period_start(sunday), day(2016, 1, 3));
    }

    #[test]
    fn month_lengths_account_for_leap_years() {
        assert_eq!(Frequency::Month.expected_samples(day(2016, 2, 1)), 29 * 24);
        assert_eq!(Frequency::Month.expected_samples(day(2017, 2, 1)), 28 * 24);
        assert_eq!(Frequency::Month.expected_samples(day(2016, 12, 1)), 31 * 24);
        assert_eq!(Frequency::Month.expected_samples(day(2016, 4, 1)), 30 * 24);
    }

    #[test]
    fn month_length_from_any_day() {
        assert_eq!(Frequency::Month.expected_samples(day(2016, 1, 15)), 31 * 24);
        assert_eq!(Frequency::Month.expected_samples(day(2016, 2, 29)), 29 * 24);
        assert_eq!(Frequency::Month.expected_samples(day(2017, 2, 28)), 28 * 24);
        assert_eq!(Frequency::Month.expected_samples(day(2016, 11, 30)), 30 * 24);
    }

    #[test]
    fn mean_uses_available_samples() {
        let start = day(2016, 1, 1).and_hms_opt(20, 0, 0).unwrap();
        let ts = TimeSeries::hourly(start, 8, vec![("A".into(), (0..8).map(f64::from).collect())])
            .unwrap();
        let out = resample_time_series(&ts, Frequency::Day, Aggregation::Mean).unwrap();
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.column("A").unwrap(), &[1.5, 5.5]);
    }
}
