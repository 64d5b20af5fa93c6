//! Civil-calendar helpers shared by the anchored offsets.
//!
//! All helpers take and return wall-clock `NaiveDateTime` values and keep the
//! time of day unless stated otherwise. Weekdays are numbered 0 = Monday …
//! 6 = Sunday throughout.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::{OffsetError, Result};

pub(crate) const MONTH_ALIASES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

pub(crate) const WEEKDAY_ALIASES: [&str; 7] = ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

/// Where [`shift_month`] places the day within the target month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DayOpt {
    /// Keep the input day, clamped to the target month's length.
    Keep,
    Start,
    End,
    /// A fixed day, clamped to the target month's length.
    Day(u32),
}

/// Length of the month in days.
pub(crate) fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let leap = ymd(year, month, 1)?.leap_year();
    Ok(match month {
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => 31,
    })
}

pub(crate) fn weekday_num(dt: NaiveDateTime) -> u32 {
    dt.weekday().num_days_from_monday()
}

/// Weekday of the first day of the month.
pub(crate) fn first_weekday(year: i32, month: u32) -> Result<u32> {
    Ok(ymd(year, month, 1)?.weekday().num_days_from_monday())
}

/// Day of the first weekday (Mon–Fri) of the month.
pub(crate) fn first_bday(year: i32, month: u32) -> Result<u32> {
    Ok(match first_weekday(year, month)? {
        5 => 3,
        6 => 2,
        _ => 1,
    })
}

/// Day of the last weekday (Mon–Fri) of the month.
pub(crate) fn last_bday(year: i32, month: u32) -> Result<u32> {
    let dim = days_in_month(year, month)?;
    let last_wd = ymd(year, month, dim)?.weekday().num_days_from_monday();
    Ok(dim - last_wd.saturating_sub(4))
}

pub(crate) fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| overflow(format!("{year:04}-{month:02}-{day:02}")))
}

/// Replace the civil date, keeping the time of day.
pub(crate) fn with_ymd(dt: NaiveDateTime, year: i32, month: u32, day: u32) -> Result<NaiveDateTime> {
    Ok(ymd(year, month, day)?.and_time(dt.time()))
}

/// Replace the day of the month, keeping everything else.
pub(crate) fn with_day(dt: NaiveDateTime, day: u32) -> Result<NaiveDateTime> {
    with_ymd(dt, dt.year(), dt.month(), day)
}

/// Move `dt` by `months` calendar months, placing the day per `day`.
pub(crate) fn shift_month(dt: NaiveDateTime, months: i64, day: DayOpt) -> Result<NaiveDateTime> {
    let total = i64::from(dt.year()) * 12 + i64::from(dt.month()) - 1 + months;
    let year = i32::try_from(total.div_euclid(12))
        .map_err(|_| overflow(format!("{dt} shifted by {months} months")))?;
    let month = (total.rem_euclid(12) + 1) as u32;
    let dim = days_in_month(year, month)?;
    let target = match day {
        DayOpt::Keep => dt.day().min(dim),
        DayOpt::Start => 1,
        DayOpt::End => dim,
        DayOpt::Day(d) => d.min(dim),
    };
    with_ymd(dt, year, month, target)
}

pub(crate) fn add_days(dt: NaiveDateTime, days: i64) -> Result<NaiveDateTime> {
    let delta = TimeDelta::try_days(days).ok_or_else(|| overflow(format!("{days} days")))?;
    add_delta(dt, delta)
}

pub(crate) fn add_weeks(dt: NaiveDateTime, weeks: i64) -> Result<NaiveDateTime> {
    let days = weeks
        .checked_mul(7)
        .ok_or_else(|| overflow(format!("{weeks} weeks")))?;
    add_days(dt, days)
}

pub(crate) fn add_delta(dt: NaiveDateTime, delta: TimeDelta) -> Result<NaiveDateTime> {
    dt.checked_add_signed(delta)
        .ok_or_else(|| overflow(format!("{dt} + {delta}")))
}

pub(crate) fn overflow(what: impl std::fmt::Display) -> OffsetError {
    OffsetError::Overflow(format!("date out of range: {what}"))
}

/// Move forward to the next `weekday` (no-op when already on it).
pub(crate) fn roll_to_weekday(dt: NaiveDateTime, weekday: u32) -> Result<NaiveDateTime> {
    let diff = (i64::from(weekday) - i64::from(weekday_num(dt))).rem_euclid(7);
    add_days(dt, diff)
}

/// Move backward to the previous `weekday` (no-op when already on it).
pub(crate) fn roll_back_to_weekday(dt: NaiveDateTime, weekday: u32) -> Result<NaiveDateTime> {
    let diff = (i64::from(weekday_num(dt)) - i64::from(weekday)).rem_euclid(7);
    add_days(dt, -diff)
}

pub(crate) fn validate_weekday(weekday: u32) -> Result<u32> {
    if weekday > 6 {
        return Err(OffsetError::InvalidParameter(format!(
            "Day must be 0<=day<=6, got {weekday}"
        )));
    }
    Ok(weekday)
}

pub(crate) fn validate_month(month: u32) -> Result<u32> {
    if !(1..=12).contains(&month) {
        return Err(OffsetError::InvalidParameter(format!(
            "Month must go from 1 to 12, got {month}"
        )));
    }
    Ok(month)
}

pub(crate) fn month_alias(month: u32) -> &'static str {
    MONTH_ALIASES[(month.clamp(1, 12) - 1) as usize]
}

pub(crate) fn weekday_alias(weekday: u32) -> &'static str {
    WEEKDAY_ALIASES[weekday.min(6) as usize]
}

pub(crate) fn parse_month_alias(s: &str) -> Result<u32> {
    MONTH_ALIASES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(s))
        .map(|i| i as u32 + 1)
        .ok_or_else(|| OffsetError::InvalidParameter(format!("invalid month alias '{s}'")))
}

pub(crate) fn parse_weekday_alias(s: &str) -> Result<u32> {
    WEEKDAY_ALIASES
        .iter()
        .position(|w| w.eq_ignore_ascii_case(s))
        .map(|i| i as u32)
        .ok_or_else(|| OffsetError::InvalidParameter(format!("invalid weekday alias '{s}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2020, 2).unwrap(), 29);
        assert_eq!(days_in_month(2021, 2).unwrap(), 28);
        assert_eq!(days_in_month(1900, 2).unwrap(), 28);
        assert_eq!(days_in_month(2000, 2).unwrap(), 29);
        assert_eq!(days_in_month(2021, 4).unwrap(), 30);
        assert_eq!(days_in_month(2021, 12).unwrap(), 31);
    }

    #[test]
    fn test_month_helpers_reject_years_outside_chrono() {
        let year = NaiveDate::MAX.year() + 1;
        assert!(matches!(days_in_month(year, 1), Err(OffsetError::Overflow(_))));
        assert!(matches!(first_weekday(year, 1), Err(OffsetError::Overflow(_))));
        assert!(first_bday(year, 1).is_err());
        assert!(last_bday(year, 1).is_err());
    }

    #[test]
    fn test_first_weekday() {
        // 2024-09-01 is a Sunday, 2020-01-01 a Wednesday.
        assert_eq!(first_weekday(2024, 9).unwrap(), 6);
        assert_eq!(first_weekday(2020, 1).unwrap(), 2);
    }

    #[test]
    fn test_first_and_last_bday() {
        // February 2020 starts on a Saturday and ends on a Saturday.
        assert_eq!(first_bday(2020, 2).unwrap(), 3);
        assert_eq!(last_bday(2020, 2).unwrap(), 28);
        // March 2020 starts on a Sunday, ends on a Tuesday.
        assert_eq!(first_bday(2020, 3).unwrap(), 2);
        assert_eq!(last_bday(2020, 3).unwrap(), 31);
        // May 2020 ends on a Sunday.
        assert_eq!(last_bday(2020, 5).unwrap(), 29);
    }

    #[test]
    fn test_shift_month_clamps_day() {
        let jan31 = dt(2020, 1, 31);
        assert_eq!(shift_month(jan31, 1, DayOpt::Keep).unwrap(), dt(2020, 2, 29));
        assert_eq!(shift_month(jan31, -2, DayOpt::Keep).unwrap(), dt(2019, 11, 30));
        assert_eq!(shift_month(jan31, 13, DayOpt::Start).unwrap(), dt(2021, 2, 1));
        assert_eq!(shift_month(jan31, 1, DayOpt::End).unwrap(), dt(2020, 2, 29));
        assert_eq!(shift_month(jan31, 0, DayOpt::Day(15)).unwrap(), dt(2020, 1, 15));
        assert_eq!(shift_month(jan31, 1, DayOpt::Day(31)).unwrap(), dt(2020, 2, 29));
    }

    #[test]
    fn test_shift_month_keeps_time() {
        let shifted = shift_month(dt(2020, 1, 15), 1, DayOpt::Keep).unwrap();
        assert_eq!(shifted.time(), dt(2020, 1, 15).time());
    }

    #[test]
    fn test_shift_month_overflow() {
        let far = NaiveDate::MAX.and_hms_opt(0, 0, 0).unwrap();
        assert!(matches!(
            shift_month(far, 1, DayOpt::Keep),
            Err(OffsetError::Overflow(_))
        ));
    }

    #[test]
    fn test_roll_to_weekday() {
        // 2020-01-15 is a Wednesday.
        assert_eq!(roll_to_weekday(dt(2020, 1, 15), 4).unwrap(), dt(2020, 1, 17));
        assert_eq!(roll_to_weekday(dt(2020, 1, 15), 2).unwrap(), dt(2020, 1, 15));
        assert_eq!(roll_back_to_weekday(dt(2020, 1, 15), 4).unwrap(), dt(2020, 1, 10));
    }

    #[test]
    fn test_aliases_round_trip() {
        for m in 1..=12 {
            assert_eq!(parse_month_alias(month_alias(m)).unwrap(), m);
        }
        for w in 0..7 {
            assert_eq!(parse_weekday_alias(weekday_alias(w)).unwrap(), w);
        }
        assert!(parse_month_alias("FOO").is_err());
        assert_eq!(parse_weekday_alias("fri").unwrap(), 4);
    }

    #[test]
    fn test_validation() {
        assert!(validate_weekday(7).is_err());
        assert!(validate_month(0).is_err());
        assert!(validate_month(13).is_err());
        assert_eq!(validate_month(12).unwrap(), 12);
    }
}
