//! Sub-range extraction with optional time-of-day and weekday filters.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDateTime, NaiveTime};
use postgrid_core::{PostgridError, PostgridResult};

use crate::check::{check_date_range_in_time_series, check_time_series};
use crate::series::TimeSeries;

/// Extra row filters applied by [`slice_time_series`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceFilter {
    between_time: Option<(String, String)>,
    day_of_week: Option<BTreeSet<u32>>,
}

impl SliceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep rows whose wall-clock time is within `[start, end]` (24-hour
    /// `HH:MM`). When `end` precedes `start` the window wraps past midnight.
    pub fn between_time(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.between_time = Some((start.into(), end.into()));
        self
    }

    /// Keep rows on these weekdays, 0 = Monday through 6 = Sunday.
    pub fn day_of_week<I: IntoIterator<Item = u32>>(mut self, days: I) -> Self {
        self.day_of_week = Some(days.into_iter().collect());
        self
    }
}

/// True for `HH:MM` strings between `00:00` and `23:59`.
pub fn is_24_hour_format(value: &str) -> bool {
    parse_time_of_day(value).is_some()
}

fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let (hours, minutes) = value.split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, 0)
}

struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    fn contains(&self, t: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= t && t <= self.end
        } else {
            t >= self.start || t <= self.end
        }
    }
}

fn resolve_window(filter: &SliceFilter) -> PostgridResult<Option<TimeWindow>> {
    let Some((start, end)) = &filter.between_time else {
        return Ok(None);
    };
    match (parse_time_of_day(start), parse_time_of_day(end)) {
        (Some(start), Some(end)) => Ok(Some(TimeWindow { start, end })),
        _ => Err(PostgridError::validation(format!(
            "between_time must be two 24-hour 'HH:MM' strings, got ('{start}', '{end}')"
        ))),
    }
}

fn resolve_days(filter: &SliceFilter) -> PostgridResult<Option<&BTreeSet<u32>>> {
    let Some(days) = &filter.day_of_week else {
        return Ok(None);
    };
    if let Some(bad) = days.iter().find(|&&d| d > 6) {
        return Err(PostgridError::validation(format!(
            "day_of_week values must be in 0..=6 (0 = Monday), got {bad}"
        )));
    }
    Ok(Some(days))
}

/// Rows with wall-clock time in `[start, end]`, narrowed by `filter`.
pub fn slice_time_series(
    ts: &TimeSeries,
    start: NaiveDateTime,
    end: NaiveDateTime,
    filter: &SliceFilter,
) -> PostgridResult<TimeSeries> {
    check_time_series(ts, "time series")?;
    check_date_range_in_time_series(ts, start, end)?;
    let window = resolve_window(filter)?;
    let days = resolve_days(filter)?;

    let keep: Vec<usize> = ts
        .local_index()
        .into_iter()
        .enumerate()
        .filter(|(_, local)| start <= *local && *local <= end)
        .filter(|(_, local)| window.as_ref().map_or(true, |w| w.contains(local.time())))
        .filter(|(_, local)| {
            days.map_or(true, |d| d.contains(&local.weekday().num_days_from_monday()))
        })
        .map(|(row, _)| row)
        .collect();

    tracing::debug!(
        rows_in = ts.row_count(),
        rows_out = keep.len(),
        %start,
        %end,
        "sliced time series"
    );
    Ok(ts.select_rows(&keep))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn year_2016() -> TimeSeries {
        let hours = 366 * 24;
        TimeSeries::hourly(
            at(1, 1, 0),
            hours,
            vec![("A".into(), vec![1.0; hours]), ("B".into(), vec![2.0; hours])],
        )
        .unwrap()
    }

    #[test]
    fn recognises_24_hour_format() {
        assert!(is_24_hour_format("01:00"));
        assert!(is_24_hour_format("23:59"));
        assert!(!is_24_hour_format("24:00"));
        assert!(!is_24_hour_format("16"));
        assert!(!is_24_hour_format("16:00:00"));
        assert!(!is_24_hour_format("ab:cd"));
    }

    #[test]
    fn plain_slice_is_inclusive() {
        let ts = year_2016();
        let sliced = slice_time_series(&ts, at(3, 1, 0), at(3, 2, 0), &SliceFilter::new()).unwrap();
        assert_eq!(sliced.row_count(), 25);
        assert_eq!(sliced.local_index()[0], at(3, 1, 0));
        assert_eq!(*sliced.local_index().last().unwrap(), at(3, 2, 0));
    }

    #[test]
    fn between_time_and_weekdays() {
        let ts = year_2016();
        let filter = SliceFilter::new()
            .between_time("16:00", "17:00")
            .day_of_week([1, 3]);
        let sliced = slice_time_series(&ts, at(3, 1, 0), at(3, 31, 0), &filter).unwrap();
        let local = sliced.local_index();
        assert_eq!(local[0], at(3, 1, 16));
        assert_eq!(*local.last().unwrap(), at(3, 29, 17));
        assert_eq!(sliced.row_count(), 18);
    }

    // TODO: confirm with analysts that a reversed window should wrap past
    // midnight rather than be rejected.
    #[test]
    fn reversed_window_wraps_past_midnight() {
        let ts = year_2016();
        let filter = SliceFilter::new().between_time("22:00", "02:00");
        let sliced = slice_time_series(&ts, at(3, 1, 0), at(3, 1, 23), &filter).unwrap();
        let hours: Vec<u32> = sliced
            .local_index()
            .iter()
            .map(|t| chrono::Timelike::hour(t))
            .collect();
        assert_eq!(hours, vec![0, 1, 2, 22, 23]);
    }

    #[test]
    fn rejects_bad_arguments() {
        let ts = year_2016();
        let (s, e) = (at(3, 1, 0), at(3, 31, 0));
        let bad_time = SliceFilter::new().between_time("24:00", "17:00");
        assert!(slice_time_series(&ts, s, e, &bad_time).is_err());
        let bad_day = SliceFilter::new().day_of_week([6, 7]);
        assert!(slice_time_series(&ts, s, e, &bad_day).is_err());
        assert!(slice_time_series(&ts, e, s, &SliceFilter::new()).is_err());
        let beyond = NaiveDate::from_ymd_opt(2017, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(slice_time_series(&ts, s, beyond, &SliceFilter::new()).is_err());
    }
}
