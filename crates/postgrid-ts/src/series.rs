//! Hourly-indexed table of named `f64` channels.
//!
//! The index is stored as UTC instants; the optional [`Zone`] only changes how
//! those instants read on a wall clock. A series without a zone is naive and
//! its wall clock is UTC.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use postgrid_core::{PostgridError, PostgridResult};

use crate::zone::Zone;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    index: Vec<DateTime<Utc>>,
    zone: Option<Zone>,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl TimeSeries {
    /// Build a naive series. The index must be strictly increasing, every
    /// column must have one value per timestamp and names must be unique.
    pub fn new(
        index: Vec<DateTime<Utc>>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> PostgridResult<Self> {
        if let Some(pos) = index.windows(2).position(|w| w[1] <= w[0]) {
            return Err(PostgridError::validation(format!(
                "time index must be strictly increasing without duplicates (row {})",
                pos + 1
            )));
        }
        let mut seen = HashSet::with_capacity(columns.len());
        let mut names = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len());
        for (name, data) in columns {
            if data.len() != index.len() {
                return Err(PostgridError::validation(format!(
                    "column '{name}' has {} values but the index has {} timestamps",
                    data.len(),
                    index.len()
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(PostgridError::validation(format!(
                    "duplicate column '{name}'"
                )));
            }
            names.push(name);
            values.push(data);
        }
        Ok(Self {
            index,
            zone: None,
            names,
            columns: values,
        })
    }

    /// Naive hourly series of `periods` rows starting at `start` (read as UTC).
    pub fn hourly(
        start: NaiveDateTime,
        periods: usize,
        columns: Vec<(String, Vec<f64>)>,
    ) -> PostgridResult<Self> {
        let first = Utc.from_utc_datetime(&start);
        let index = (0..periods)
            .map(|h| first + Duration::hours(h as i64))
            .collect();
        Self::new(index, columns)
    }

    /// Same series with its wall clock set to `zone`. Instants do not move.
    pub fn with_zone(mut self, zone: Option<Zone>) -> Self {
        self.zone = zone;
        self
    }

    /// New series sharing this index and zone.
    pub fn with_columns(&self, columns: Vec<(String, Vec<f64>)>) -> PostgridResult<Self> {
        Ok(Self::new(self.index.clone(), columns)?.with_zone(self.zone))
    }

    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    pub fn zone(&self) -> Option<Zone> {
        self.zone
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn column_count(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.column_count() == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.columns[idx].as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .zip(&self.columns)
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Wall-clock time of every row in the series' zone.
    pub fn local_index(&self) -> Vec<NaiveDateTime> {
        match self.zone {
            Some(zone) => self.index.iter().map(|t| zone.to_local(t)).collect(),
            None => self.index.iter().map(|t| t.naive_utc()).collect(),
        }
    }

    /// Convert a wall-clock time in this series' zone back to an instant.
    pub fn instant_at(&self, local: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self.zone {
            Some(zone) => zone.from_local(local),
            None => Some(Utc.from_utc_datetime(local)),
        }
    }

    /// Sampling step when every consecutive pair of rows is equally spaced.
    pub fn step(&self) -> Option<Duration> {
        let mut steps = self.index.windows(2).map(|w| w[1] - w[0]);
        let first = steps.next()?;
        steps.all(|s| s == first).then_some(first)
    }

    /// Rows at the given positions. Positions must be increasing so the
    /// index stays ordered.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            index: rows.iter().map(|&r| self.index[r]).collect(),
            zone: self.zone,
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|col| rows.iter().map(|&r| col[r]).collect())
                .collect(),
        }
    }

    /// Named columns, failing if any is missing.
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> PostgridResult<Self> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let values = self.column(name).ok_or_else(|| {
                PostgridError::validation(format!("column '{name}' is not in the time series"))
            })?;
            columns.push((name.to_string(), values.to_vec()));
        }
        self.with_columns(columns)
    }

    /// Apply `f` to every value.
    pub fn map_values<F>(&self, mut f: F) -> Self
    where
        F: FnMut(f64) -> f64,
    {
        Self {
            index: self.index.clone(),
            zone: self.zone,
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|col| col.iter().map(|&v| f(v)).collect())
                .collect(),
        }
    }

    /// Elementwise combination of the columns both series share, in this
    /// series' column order. Both must have the same index.
    pub fn zip_with<F>(&self, other: &TimeSeries, mut f: F) -> PostgridResult<Self>
    where
        F: FnMut(f64, f64) -> f64,
    {
        if self.index != other.index {
            return Err(PostgridError::validation(
                "time series must share the same time index",
            ));
        }
        let columns = self
            .columns()
            .filter_map(|(name, lhs)| {
                other.column(name).map(|rhs| {
                    let values = lhs.iter().zip(rhs).map(|(&a, &b)| f(a, b)).collect();
                    (name.to_string(), values)
                })
            })
            .collect();
        self.with_columns(columns)
    }

    /// Sum columns that map to the same key. Output columns follow the
    /// first appearance of each key.
    pub fn aggregate_columns<F>(&self, mut key_of: F) -> PostgridResult<Self>
    where
        F: FnMut(&str) -> PostgridResult<String>,
    {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut grouped: Vec<(String, Vec<f64>)> = Vec::new();
        for (name, values) in self.columns() {
            let key = key_of(name)?;
            let slot = *positions.entry(key.clone()).or_insert_with(|| {
                grouped.push((key, vec![0.0; values.len()]));
                grouped.len() - 1
            });
            for (acc, v) in grouped[slot].1.iter_mut().zip(values) {
                *acc += v;
            }
        }
        self.with_columns(grouped)
    }

    /// Total of each column.
    pub fn column_sums(&self) -> Vec<(String, f64)> {
        self.columns()
            .map(|(name, values)| (name.to_string(), values.iter().sum()))
            .collect()
    }

    /// Sum across columns for each row.
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.row_count())
            .map(|r| self.columns.iter().map(|col| col[r]).sum())
            .collect()
    }

    /// Sum of every value in the table.
    pub fn total(&self) -> f64 {
        self.columns.iter().flatten().sum()
    }

    pub fn min_value(&self) -> Option<f64> {
        self.columns.iter().flatten().copied().reduce(f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sample() -> TimeSeries {
        TimeSeries::hourly(
            start(),
            3,
            vec![
                ("A".into(), vec![1.0, 2.0, 3.0]),
                ("B".into(), vec![10.0, 20.0, 30.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = TimeSeries::hourly(start(), 3, vec![("A".into(), vec![1.0])]).unwrap_err();
        assert!(err.to_string().contains("column 'A'"));
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let t = Utc.from_utc_datetime(&start());
        let err = TimeSeries::new(vec![t, t], vec![("A".into(), vec![1.0, 2.0])]).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn rejects_duplicate_columns() {
        let err = TimeSeries::hourly(
            start(),
            1,
            vec![("A".into(), vec![1.0]), ("A".into(), vec![2.0])],
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate column"));
    }

    #[test]
    fn hourly_step_is_one_hour() {
        assert_eq!(sample().step(), Some(Duration::hours(1)));
        let single = TimeSeries::hourly(start(), 1, vec![("A".into(), vec![1.0])]).unwrap();
        assert_eq!(single.step(), None);
    }

    #[test]
    fn zip_with_only_keeps_shared_columns() {
        let ts = sample();
        let other = ts.select_columns(&["B"]).unwrap();
        let diff = ts.zip_with(&other, |a, b| a - b).unwrap();
        assert_eq!(diff.column_names().collect::<Vec<_>>(), vec!["B"]);
        assert_eq!(diff.column("B").unwrap(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn aggregate_columns_sums_by_key() {
        let grouped = sample().aggregate_columns(|_| Ok("all".into())).unwrap();
        assert_eq!(grouped.column("all").unwrap(), &[11.0, 22.0, 33.0]);
    }

    #[test]
    fn reductions() {
        let ts = sample();
        assert_eq!(ts.row_sums(), vec![11.0, 22.0, 33.0]);
        assert_eq!(ts.total(), 66.0);
        assert_eq!(ts.min_value(), Some(1.0));
        assert_eq!(
            ts.column_sums(),
            vec![("A".to_string(), 6.0), ("B".to_string(), 60.0)]
        );
    }

    #[test]
    fn select_rows_keeps_zone_and_names() {
        let ts = sample();
        let picked = ts.select_rows(&[0, 2]);
        assert_eq!(picked.column("A").unwrap(), &[1.0, 3.0]);
        assert_eq!(picked.row_count(), 2);
        assert_eq!(picked.zone(), ts.zone());
    }
}
