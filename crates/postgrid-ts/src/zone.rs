//! Time zones and DST detection.
//!
//! A [`Zone`] is either a fixed UTC offset (`+05:30`) or an IANA zone
//! (`Etc/GMT+8`, `US/Pacific`). Calendar resampling counts hours per period,
//! so a series whose zone actually shifts its clock inside the covered range
//! cannot be resampled; [`is_dst`] is the gate for that.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use postgrid_core::{PostgridError, PostgridResult};

use crate::check::check_time_series;
use crate::series::TimeSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Fixed(FixedOffset),
    Named(Tz),
}

impl Zone {
    /// Parse a fixed `±HH:MM` offset or an IANA zone identifier.
    pub fn parse(name: &str) -> PostgridResult<Self> {
        let trimmed = name.trim();
        if let Some(offset) = parse_fixed_offset(trimmed) {
            return Ok(Zone::Fixed(offset));
        }
        trimmed
            .parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| PostgridError::validation(format!("unknown time zone '{name}'")))
    }

    /// Total UTC offset in effect at `instant`.
    pub fn utc_offset(&self, instant: &DateTime<Utc>) -> FixedOffset {
        match self {
            Zone::Fixed(offset) => *offset,
            Zone::Named(tz) => tz.offset_from_utc_datetime(&instant.naive_utc()).fix(),
        }
    }

    /// Daylight-saving part of the offset at `instant`; zero outside DST.
    pub fn dst_offset(&self, instant: &DateTime<Utc>) -> Duration {
        match self {
            Zone::Fixed(_) => Duration::zero(),
            Zone::Named(tz) => tz
                .offset_from_utc_datetime(&instant.naive_utc())
                .dst_offset(),
        }
    }

    pub fn to_local(&self, instant: &DateTime<Utc>) -> NaiveDateTime {
        let offset = self.utc_offset(instant).local_minus_utc();
        instant.naive_utc() + Duration::seconds(i64::from(offset))
    }

    /// Instant for a wall-clock time; the earlier one when the time is ambiguous.
    pub fn from_local(&self, local: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Zone::Fixed(offset) => offset
                .from_local_datetime(local)
                .single()
                .map(|t| t.with_timezone(&Utc)),
            Zone::Named(tz) => tz
                .from_local_datetime(local)
                .earliest()
                .map(|t| t.with_timezone(&Utc)),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Fixed(offset) => write!(f, "{offset}"),
            Zone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

fn parse_fixed_offset(value: &str) -> Option<FixedOffset> {
    let sign = match value.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let (hours, minutes) = value[1..].split_once(':')?;
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// True if the series is zone-aware and at least one of its timestamps falls
/// inside daylight-saving time.
pub fn is_dst(ts: &TimeSeries) -> bool {
    match ts.zone() {
        None => false,
        Some(zone) => ts
            .index()
            .iter()
            .any(|t| zone.dst_offset(t) != Duration::zero()),
    }
}

/// Move an hourly series to a new zone. Naive series are taken to be UTC.
///
/// Only the wall clock changes; every row keeps its instant. Series that have
/// already been resampled are rejected because their period boundaries belong
/// to the old zone.
pub fn change_time_zone(ts: &TimeSeries, zone: &str) -> PostgridResult<TimeSeries> {
    check_time_series(ts, "time series")?;
    if ts.step() != Some(Duration::hours(1)) {
        return Err(PostgridError::validation(
            "frequency of time series must be 1h",
        ));
    }
    let target = Zone::parse(zone)?;
    tracing::debug!(
        from = %ts.zone().map_or_else(|| "UTC".to_string(), |z| z.to_string()),
        to = %target,
        rows = ts.row_count(),
        "changing time zone"
    );
    Ok(ts.clone().with_zone(Some(target)))
}
