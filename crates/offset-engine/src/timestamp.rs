//! The point-in-time value offsets operate on.
//!
//! A [`Timestamp`] is a nanosecond-precision wall-clock reading
//! (`chrono::NaiveDateTime`) with an optional IANA timezone, or the
//! not-a-time sentinel [`Timestamp::NAT`]. Calendar offsets work on the wall
//! clock; fixed-duration offsets shift the absolute instant.
//!
//! Two representations matter to the offset machinery:
//!
//! - the **precise** one, an `i64` count of nanoseconds since the Unix epoch
//!   (roughly years 1677 to 2262), see [`Timestamp::epoch_nanos`];
//! - the **wide** one, chrono's full date range at microsecond precision,
//!   used as a fallback when a result does not fit the precise range.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta,
    TimeZone, Timelike,
};
use chrono_tz::Tz;

use crate::error::{OffsetError, Result};

/// A wall-clock instant with an optional timezone, or NaT.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    inner: Option<Stamp>,
}

#[derive(Debug, Clone, Copy)]
struct Stamp {
    wall: NaiveDateTime,
    tz: Option<Tz>,
}

impl Timestamp {
    /// The not-a-time sentinel. Every offset operation returns it unchanged.
    pub const NAT: Timestamp = Timestamp { inner: None };

    /// Wrap a timezone-naive wall-clock reading.
    pub fn from_naive(wall: NaiveDateTime) -> Self {
        Self {
            inner: Some(Stamp { wall, tz: None }),
        }
    }

    /// Midnight of `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::from_naive(date.and_time(NaiveTime::MIN))
    }

    /// Midnight of the given civil date.
    ///
    /// # Errors
    ///
    /// Returns [`OffsetError::InvalidTimestamp`] if the fields do not form a
    /// valid date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        Self::from_ymd_hms(year, month, day, 0, 0, 0)
    }

    /// Construct from civil date and clock fields.
    ///
    /// # Errors
    ///
    /// Returns [`OffsetError::InvalidTimestamp`] if any field is out of range.
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .map(Self::from_naive)
            .ok_or_else(|| {
                OffsetError::InvalidTimestamp(format!(
                    "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
                ))
            })
    }

    /// A naive timestamp `nanos` nanoseconds after the Unix epoch.
    pub fn from_epoch_nanos(nanos: i64) -> Self {
        Self::from_naive(DateTime::from_timestamp_nanos(nanos).naive_utc())
    }

    pub fn is_nat(&self) -> bool {
        self.inner.is_none()
    }

    /// The wall-clock reading, `None` for NaT.
    pub fn naive(&self) -> Option<NaiveDateTime> {
        self.inner.map(|s| s.wall)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.naive().map(|w| w.date())
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.naive().map(|w| w.time())
    }

    pub fn tz(&self) -> Option<Tz> {
        self.inner.and_then(|s| s.tz)
    }

    pub fn year(&self) -> Option<i32> {
        self.naive().map(|w| w.year())
    }

    pub fn month(&self) -> Option<u32> {
        self.naive().map(|w| w.month())
    }

    pub fn day(&self) -> Option<u32> {
        self.naive().map(|w| w.day())
    }

    /// Day of the week, 0 = Monday … 6 = Sunday.
    pub fn weekday(&self) -> Option<u32> {
        self.naive().map(|w| w.weekday().num_days_from_monday())
    }

    /// The sub-microsecond part of the fractional second (0..=999).
    pub fn nanosecond(&self) -> u32 {
        self.naive().map_or(0, |w| sub_micro_nanos(w))
    }

    /// Replace the wall-clock reading, keeping the timezone.
    pub fn with_naive(self, wall: NaiveDateTime) -> Self {
        match self.inner {
            Some(s) => Self {
                inner: Some(Stamp { wall, tz: s.tz }),
            },
            None => Self::NAT,
        }
    }

    /// Snap to midnight of the same wall-clock day.
    pub fn normalize(self) -> Self {
        match self.naive() {
            Some(w) => self.with_naive(midnight(w)),
            None => self,
        }
    }

    pub fn is_normalized(&self) -> bool {
        self.time().is_some_and(|t| t == NaiveTime::MIN)
    }

    /// Attach (`Some`) or strip (`None`) a timezone without changing the wall
    /// clock.
    pub fn tz_localize(self, tz: Option<Tz>) -> Self {
        match self.inner {
            Some(s) => Self {
                inner: Some(Stamp { wall: s.wall, tz }),
            },
            None => Self::NAT,
        }
    }

    /// Express the same instant in another timezone.
    ///
    /// # Errors
    ///
    /// Returns [`OffsetError::InvalidTimestamp`] if the timestamp is naive.
    pub fn tz_convert(self, tz: Tz) -> Result<Self> {
        let Some(s) = self.inner else {
            return Ok(Self::NAT);
        };
        let Some(from) = s.tz else {
            return Err(OffsetError::InvalidTimestamp(format!(
                "cannot convert naive timestamp {self} to {tz}; localize it first"
            )));
        };
        let wall = resolve_local(&from, &s.wall).with_timezone(&tz).naive_local();
        Ok(Self {
            inner: Some(Stamp { wall, tz: Some(tz) }),
        })
    }

    /// The UTC reading for aware timestamps, the wall clock for naive ones.
    pub fn utc_naive(&self) -> Option<NaiveDateTime> {
        let s = self.inner?;
        Some(match s.tz {
            Some(tz) => resolve_local(&tz, &s.wall).naive_utc(),
            None => s.wall,
        })
    }

    /// Nanoseconds since the Unix epoch in the precise representation.
    ///
    /// # Errors
    ///
    /// Returns [`OffsetError::OutOfBounds`] when the instant lies outside the
    /// `i64` nanosecond range, and [`OffsetError::InvalidTimestamp`] for NaT.
    pub fn epoch_nanos(&self) -> Result<i64> {
        let utc = self
            .utc_naive()
            .ok_or_else(|| OffsetError::InvalidTimestamp("NaT has no epoch value".into()))?;
        utc.and_utc()
            .timestamp_nanos_opt()
            .ok_or_else(|| OffsetError::OutOfBounds(utc.to_string()))
    }

    fn cmp_key(&self) -> Option<(bool, NaiveDateTime)> {
        let s = self.inner?;
        Some((s.tz.is_some(), self.utc_naive()?))
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

/// NaT is unordered, and naive timestamps do not compare with aware ones.
impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let (a_aware, a) = self.cmp_key()?;
        let (b_aware, b) = other.cmp_key()?;
        if a_aware != b_aware {
            return None;
        }
        Some(a.cmp(&b))
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(wall: NaiveDateTime) -> Self {
        Self::from_naive(wall)
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(s) = self.inner else {
            return f.write_str("NaT");
        };
        write!(f, "{}", s.wall.format("%Y-%m-%d %H:%M:%S"))?;
        let frac = s.wall.nanosecond();
        if frac != 0 {
            if frac % 1_000 == 0 {
                write!(f, ".{:06}", frac / 1_000)?;
            } else {
                write!(f, ".{frac:09}")?;
            }
        }
        if let Some(tz) = s.tz {
            let local = resolve_local(&tz, &s.wall);
            f.write_str(&format_utc_offset(&local))?;
        }
        Ok(())
    }
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Accepts `NaT`, `YYYY-MM-DD`, `YYYY-MM-DD[T ]HH:MM[:SS[.f]]`, RFC 3339
/// (localized to UTC), and any of the naive forms followed by a space and an
/// IANA timezone name.
impl FromStr for Timestamp {
    type Err = OffsetError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("nat") {
            return Ok(Self::NAT);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::from_naive(dt.naive_utc()).tz_localize(Some(Tz::UTC)));
        }
        if let Some(wall) = parse_naive(s) {
            return Ok(Self::from_naive(wall));
        }
        if let Some((head, zone)) = s.rsplit_once(' ') {
            if let (Some(wall), Ok(tz)) = (parse_naive(head), parse_timezone(zone)) {
                return Ok(Self::from_naive(wall).tz_localize(Some(tz)));
            }
        }
        Err(OffsetError::InvalidTimestamp(format!("'{s}'")))
    }
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parse an IANA timezone string into `Tz`.
pub(crate) fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| OffsetError::InvalidTimestamp(format!("invalid timezone '{s}'")))
}

/// Resolve a wall-clock reading in `tz` to a single instant.
///
/// Ambiguous readings (DST fall-back) take the earlier instant; readings in a
/// DST gap are interpreted with the offset in force before the gap, which
/// lands them just after it.
pub(crate) fn resolve_local(tz: &Tz, wall: &NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(wall) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let before = wall
                .checked_sub_signed(TimeDelta::days(1))
                .and_then(|w| tz.offset_from_local_datetime(&w).earliest())
                .map_or(0, |o| o.fix().local_minus_utc());
            let utc = wall
                .checked_sub_signed(TimeDelta::seconds(i64::from(before)))
                .unwrap_or(*wall);
            tz.from_utc_datetime(&utc)
        }
    }
}

/// Format the UTC offset as a string (e.g., "-05:00", "+09:00").
fn format_utc_offset<T: TimeZone>(dt: &DateTime<T>) -> String {
    let offset_secs = dt.offset().fix().local_minus_utc();
    let sign = if offset_secs >= 0 { "+" } else { "-" };
    let abs_secs = offset_secs.unsigned_abs();
    let hours = abs_secs / 3600;
    let minutes = (abs_secs % 3600) / 60;
    format!("{sign}{hours:02}:{minutes:02}")
}

pub(crate) fn midnight(wall: NaiveDateTime) -> NaiveDateTime {
    wall.date().and_time(NaiveTime::MIN)
}

pub(crate) fn sub_micro_nanos(wall: NaiveDateTime) -> u32 {
    wall.nanosecond() % 1_000
}

/// Drop the sub-microsecond digits, as the wide representation cannot hold
/// them.
pub(crate) fn truncate_to_micros(wall: NaiveDateTime) -> NaiveDateTime {
    wall - TimeDelta::nanoseconds(i64::from(sub_micro_nanos(wall)))
}

/// Whether `wall` fits the precise nanosecond representation.
pub(crate) fn check_precise(wall: NaiveDateTime) -> Result<()> {
    wall.and_utc()
        .timestamp_nanos_opt()
        .map(|_| ())
        .ok_or_else(|| OffsetError::OutOfBounds(wall.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_date_only() {
        let t = ts("2020-01-15");
        assert_eq!(t.year(), Some(2020));
        assert_eq!(t.month(), Some(1));
        assert_eq!(t.day(), Some(15));
        assert!(t.is_normalized());
        assert!(t.tz().is_none());
    }

    #[test]
    fn test_parse_with_time_and_fraction() {
        let t = ts("2020-01-15T09:30:00.000000005");
        assert_eq!(t.nanosecond(), 5);
        assert!(!t.is_normalized());
        assert_eq!(t.to_string(), "2020-01-15 09:30:00.000000005");
    }

    #[test]
    fn test_parse_with_zone_name() {
        let t = ts("2020-07-01 09:00 America/New_York");
        assert_eq!(t.tz(), Some(chrono_tz::America::New_York));
        assert_eq!(t.to_string(), "2020-07-01 09:00:00-04:00");
    }

    #[test]
    fn test_parse_rfc3339_is_utc() {
        let t = ts("2026-03-15T14:00:00-04:00");
        assert_eq!(t.tz(), Some(Tz::UTC));
        assert_eq!(t.naive().unwrap().to_string(), "2026-03-15 18:00:00");
    }

    #[test]
    fn test_parse_nat_and_garbage() {
        assert!(ts("NaT").is_nat());
        assert!("not-a-date".parse::<Timestamp>().is_err());
    }

    #[test]
    fn test_nat_is_unordered() {
        let nat = Timestamp::NAT;
        let other = Timestamp::NAT;
        assert!(nat != other);
        assert!(nat.partial_cmp(&ts("2020-01-01")).is_none());
        assert_eq!(nat.to_string(), "NaT");
    }

    #[test]
    fn test_naive_and_aware_do_not_compare() {
        let naive = ts("2020-01-01");
        let aware = naive.tz_localize(Some(Tz::UTC));
        assert!(naive.partial_cmp(&aware).is_none());
    }

    #[test]
    fn test_aware_compare_by_instant() {
        let ny = ts("2020-01-01 09:00 America/New_York");
        let utc = ts("2020-01-01 14:00 UTC");
        assert!(ny == utc);
    }

    #[test]
    fn test_tz_localize_keeps_wall_clock() {
        let t = ts("2020-01-01 09:00").tz_localize(Some(chrono_tz::Asia::Tokyo));
        assert_eq!(t.naive().unwrap().to_string(), "2020-01-01 09:00:00");
        assert!(t.tz_localize(None).tz().is_none());
    }

    #[test]
    fn test_tz_convert_keeps_instant() {
        let t = ts("2026-03-15 14:00 UTC")
            .tz_convert(chrono_tz::America::New_York)
            .unwrap();
        assert_eq!(t.naive().unwrap().to_string(), "2026-03-15 10:00:00");
        assert!(ts("2026-03-15").tz_convert(Tz::UTC).is_err());
    }

    #[test]
    fn test_gap_reading_resolves_after_gap() {
        // 2026-03-08 02:30 does not exist in New York.
        let wall = NaiveDate::from_ymd_opt(2026, 3, 8)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let resolved = resolve_local(&chrono_tz::America::New_York, &wall);
        assert_eq!(resolved.naive_local().to_string(), "2026-03-08 03:30:00");
    }

    #[test]
    fn test_epoch_nanos_bounds() {
        assert_eq!(ts("1970-01-01").epoch_nanos().unwrap(), 0);
        let far = ts("2300-01-01");
        assert!(matches!(far.epoch_nanos(), Err(OffsetError::OutOfBounds(_))));
        assert_eq!(Timestamp::from_epoch_nanos(86_400_000_000_000), ts("1970-01-02"));
    }

    #[test]
    fn test_normalize_and_truncate() {
        let t = ts("2020-01-15T09:30:00.123456789");
        assert_eq!(t.normalize(), ts("2020-01-15"));
        let trunc = truncate_to_micros(t.naive().unwrap());
        assert_eq!(trunc.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_from_ymd_rejects_invalid() {
        assert!(Timestamp::from_ymd(2021, 2, 29).is_err());
        assert!(Timestamp::from_ymd(2020, 2, 29).is_ok());
    }
}
