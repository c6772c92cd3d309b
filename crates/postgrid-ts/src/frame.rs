//! Conversion between [`TimeSeries`] and polars `DataFrame`s for the
//! reporting layer. Timestamps travel as Unix seconds in a `timestamp` column.

use chrono::{TimeZone, Utc};
use polars::prelude::*;
use postgrid_core::{PostgridError, PostgridResult};

use crate::series::TimeSeries;

pub const TIMESTAMP_COLUMN: &str = "timestamp";

fn frame_error(err: PolarsError) -> PostgridError {
    PostgridError::validation(format!("dataframe conversion failed: {err}"))
}

impl TimeSeries {
    pub fn to_dataframe(&self) -> PostgridResult<DataFrame> {
        let mut series = Vec::with_capacity(self.column_count() + 1);
        let stamps: Vec<i64> = self.index().iter().map(|t| t.timestamp()).collect();
        series.push(Series::new(TIMESTAMP_COLUMN, stamps));
        for (name, values) in self.columns() {
            series.push(Series::new(name, values.to_vec()));
        }
        DataFrame::new(series).map_err(frame_error)
    }

    /// Naive series from a frame with a Unix-seconds `timestamp` column and
    /// numeric value columns. Nulls are rejected.
    pub fn from_dataframe(df: &DataFrame) -> PostgridResult<Self> {
        let stamps = df
            .column(TIMESTAMP_COLUMN)
            .map_err(frame_error)?
            .cast(&DataType::Int64)
            .map_err(frame_error)?;
        let mut index = Vec::with_capacity(df.height());
        for secs in stamps.i64().map_err(frame_error)?.into_iter() {
            let secs = secs.ok_or_else(|| {
                PostgridError::validation("timestamp column contains null values")
            })?;
            let instant = Utc.timestamp_opt(secs, 0).single().ok_or_else(|| {
                PostgridError::validation(format!("timestamp {secs} is out of range"))
            })?;
            index.push(instant);
        }

        let mut columns = Vec::new();
        for name in df.get_column_names() {
            if name == TIMESTAMP_COLUMN {
                continue;
            }
            let values = df
                .column(name)
                .map_err(frame_error)?
                .cast(&DataType::Float64)
                .map_err(frame_error)?;
            let values = values
                .f64()
                .map_err(frame_error)?
                .into_iter()
                .map(|v| {
                    v.ok_or_else(|| {
                        PostgridError::validation(format!("column '{name}' contains null values"))
                    })
                })
                .collect::<PostgridResult<Vec<f64>>>()?;
            columns.push((name.to_string(), values));
        }
        TimeSeries::new(index, columns)
    }
}
