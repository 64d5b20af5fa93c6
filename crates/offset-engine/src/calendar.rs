//! Business-day calendars.
//!
//! A [`BusinessDayCalendar`] is built from a [`Weekmask`] and a holiday list
//! and answers two questions: is this date a business day, and which date lies
//! `n` business days away. Custom-business offsets persist only the inputs
//! (a [`CalendarSpec`]) and derive the calendar lazily.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::dates::WEEKDAY_ALIASES;
use crate::error::{OffsetError, Result};

/// Which direction to move a non-business date before counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Roll {
    Forward,
    Backward,
}

/// The oracle custom-business offsets delegate day counting to.
pub trait BusinessCalendar {
    fn is_business_day(&self, date: NaiveDate) -> bool;

    /// Move `date` onto a business day per `roll` if it is not one, then
    /// step `n` business days.
    fn offset_business_days(&self, date: NaiveDate, n: i64, roll: Roll) -> Result<NaiveDate>;
}

/// The set of weekdays that count as business days, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Weekmask([bool; 7]);

impl Weekmask {
    pub const WEEKDAYS: Weekmask = Weekmask([true, true, true, true, true, false, false]);

    /// # Errors
    ///
    /// Returns [`OffsetError::InvalidParameter`] if no day is set.
    pub fn new(days: [bool; 7]) -> Result<Self> {
        if !days.contains(&true) {
            return Err(OffsetError::InvalidParameter(
                "weekmask must contain at least one business day".into(),
            ));
        }
        Ok(Self(days))
    }

    pub fn contains(&self, weekday: u32) -> bool {
        self.0.get(weekday as usize).copied().unwrap_or(false)
    }

    pub fn days_per_week(&self) -> i64 {
        self.0.iter().filter(|d| **d).count() as i64
    }
}

impl Default for Weekmask {
    fn default() -> Self {
        Self::WEEKDAYS
    }
}

/// Accepts either seven `0`/`1` digits (`"1111100"`) or whitespace-separated
/// day abbreviations (`"Mon Tue Wed Thu Fri"`).
impl FromStr for Weekmask {
    type Err = OffsetError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut days = [false; 7];
        if s.len() == 7 && s.chars().all(|c| c == '0' || c == '1') {
            for (slot, c) in days.iter_mut().zip(s.chars()) {
                *slot = c == '1';
            }
        } else {
            for token in s.split_whitespace() {
                let idx = WEEKDAY_ALIASES
                    .iter()
                    .position(|d| d.eq_ignore_ascii_case(token))
                    .ok_or_else(|| {
                        OffsetError::InvalidParameter(format!(
                            "invalid weekmask day '{token}' in '{s}'"
                        ))
                    })?;
                days[idx] = true;
            }
        }
        Self::new(days)
    }
}

impl fmt::Display for Weekmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = WEEKDAY_ALIASES
            .iter()
            .zip(self.0)
            .filter(|(_, on)| *on)
            .map(|(name, _)| title_case(name))
            .collect();
        f.write_str(&names.join(" "))
    }
}

fn title_case(alias: &str) -> String {
    let mut chars = alias.chars();
    match chars.next() {
        Some(first) => first.to_string() + &chars.as_str().to_ascii_lowercase(),
        None => String::new(),
    }
}

impl TryFrom<String> for Weekmask {
    type Error = OffsetError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Weekmask> for String {
    fn from(mask: Weekmask) -> Self {
        mask.to_string()
    }
}

/// Weekmask and holiday calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessDayCalendar {
    weekmask: Weekmask,
    /// Sorted, deduplicated, and restricted to weekmask days.
    holidays: Vec<NaiveDate>,
}

impl BusinessDayCalendar {
    pub fn new(weekmask: Weekmask, holidays: &[NaiveDate]) -> Self {
        let mut holidays: Vec<NaiveDate> = holidays
            .iter()
            .copied()
            .filter(|d| weekmask.contains(d.weekday().num_days_from_monday()))
            .collect();
        holidays.sort_unstable();
        holidays.dedup();
        Self { weekmask, holidays }
    }

    pub fn weekmask(&self) -> Weekmask {
        self.weekmask
    }

    pub fn holidays(&self) -> &[NaiveDate] {
        &self.holidays
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.binary_search(&date).is_ok()
    }

    fn on_mask(&self, date: NaiveDate) -> bool {
        self.weekmask
            .contains(date.weekday().num_days_from_monday())
    }

    /// Holidays in the half-open range between `from` (exclusive) and `to`
    /// (inclusive), in either direction.
    fn holidays_between(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        let start = self.holidays.partition_point(|h| *h <= lo);
        let end = self.holidays.partition_point(|h| *h <= hi);
        let mut count = (end - start) as i64;
        // Direction decides which endpoint is excluded.
        if from > to {
            if self.is_holiday(to) {
                count += 1;
            }
            if self.is_holiday(from) {
                count -= 1;
            }
        }
        count
    }

    fn step(date: NaiveDate, dir: i64) -> Result<NaiveDate> {
        date.checked_add_signed(TimeDelta::days(dir))
            .ok_or_else(|| OffsetError::Overflow(format!("date out of range: {date} + {dir} days")))
    }

    /// Step to the next date in direction `dir` that is on the weekmask,
    /// ignoring holidays.
    fn next_on_mask(&self, mut date: NaiveDate, dir: i64) -> Result<NaiveDate> {
        loop {
            date = Self::step(date, dir)?;
            if self.on_mask(date) {
                return Ok(date);
            }
        }
    }

    fn roll(&self, mut date: NaiveDate, roll: Roll) -> Result<NaiveDate> {
        let dir = match roll {
            Roll::Forward => 1,
            Roll::Backward => -1,
        };
        while !self.is_business_day(date) {
            date = Self::step(date, dir)?;
        }
        Ok(date)
    }
}

impl Default for BusinessDayCalendar {
    fn default() -> Self {
        Self::new(Weekmask::WEEKDAYS, &[])
    }
}

impl BusinessCalendar for BusinessDayCalendar {
    fn is_business_day(&self, date: NaiveDate) -> bool {
        self.on_mask(date) && !self.is_holiday(date)
    }

    fn offset_business_days(&self, date: NaiveDate, n: i64, roll: Roll) -> Result<NaiveDate> {
        let start = self.roll(date, roll)?;
        if n == 0 {
            return Ok(start);
        }
        let dir = n.signum();
        let per_week = self.weekmask.days_per_week();

        // Jump whole weeks on the weekmask alone, then walk the remainder.
        let weeks = n.abs() / per_week;
        let days = weeks
            .checked_mul(7 * dir)
            .and_then(TimeDelta::try_days)
            .ok_or_else(|| OffsetError::Overflow(format!("{n} business days from {date}")))?;
        let mut cur = start
            .checked_add_signed(days)
            .ok_or_else(|| OffsetError::Overflow(format!("{n} business days from {date}")))?;
        for _ in 0..n.abs() % per_week {
            cur = self.next_on_mask(cur, dir)?;
        }

        // Each holiday crossed costs one more business day.
        let mut owed = self.holidays_between(start, cur);
        while owed > 0 {
            cur = self.next_on_mask(cur, dir)?;
            if !self.is_holiday(cur) {
                owed -= 1;
            }
        }
        Ok(cur)
    }
}

/// A once-initialised derived value that never takes part in equality,
/// hashing, or serialization.
#[derive(Debug)]
pub(crate) struct Memo<T>(OnceLock<T>);

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self(OnceLock::new())
    }
}

impl<T> Memo<T> {
    pub(crate) fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        self.0.get_or_init(init)
    }
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self(OnceLock::new())
    }
}

impl<T> PartialEq for Memo<T> {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl<T> Eq for Memo<T> {}

impl<T> Hash for Memo<T> {
    fn hash<H: Hasher>(&self, _: &mut H) {}
}

/// The persisted description of a custom business calendar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "CalendarParams", into = "CalendarParams")]
pub struct CalendarSpec {
    weekmask: Weekmask,
    holidays: Vec<NaiveDate>,
    calendar: Memo<BusinessDayCalendar>,
}

#[derive(Serialize, Deserialize)]
struct CalendarParams {
    #[serde(default)]
    weekmask: Weekmask,
    #[serde(default)]
    holidays: Vec<NaiveDate>,
}

impl From<CalendarParams> for CalendarSpec {
    fn from(p: CalendarParams) -> Self {
        Self::new(p.weekmask, p.holidays)
    }
}

impl From<CalendarSpec> for CalendarParams {
    fn from(spec: CalendarSpec) -> Self {
        Self {
            weekmask: spec.weekmask,
            holidays: spec.holidays,
        }
    }
}

impl CalendarSpec {
    pub fn new(weekmask: Weekmask, mut holidays: Vec<NaiveDate>) -> Self {
        holidays.sort_unstable();
        holidays.dedup();
        Self {
            weekmask,
            holidays,
            calendar: Memo::default(),
        }
    }

    pub fn weekmask(&self) -> Weekmask {
        self.weekmask
    }

    pub fn holidays(&self) -> &[NaiveDate] {
        &self.holidays
    }

    /// The derived calendar, built on first use.
    pub fn calendar(&self) -> &BusinessDayCalendar {
        self.calendar
            .get_or_init(|| BusinessDayCalendar::new(self.weekmask, &self.holidays))
    }
}

impl Default for CalendarSpec {
    fn default() -> Self {
        Self::new(Weekmask::WEEKDAYS, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn naive_offset(cal: &BusinessDayCalendar, date: NaiveDate, n: i64, roll: Roll) -> NaiveDate {
        let mut cur = date;
        let back = matches!(roll, Roll::Backward);
        while !cal.is_business_day(cur) {
            cur += TimeDelta::days(if back { -1 } else { 1 });
        }
        let dir = n.signum();
        let mut left = n.abs();
        while left > 0 {
            cur += TimeDelta::days(dir);
            if cal.is_business_day(cur) {
                left -= 1;
            }
        }
        cur
    }

    #[test]
    fn test_weekmask_parse_forms() {
        let a: Weekmask = "Mon Tue Wed Thu Fri".parse().unwrap();
        let b: Weekmask = "1111100".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Weekmask::WEEKDAYS);
        let sun_thu: Weekmask = "Sun Mon Tue Wed Thu".parse().unwrap();
        assert!(sun_thu.contains(6));
        assert!(!sun_thu.contains(4));
        assert_eq!(sun_thu.to_string(), "Mon Tue Wed Thu Sun");
    }

    #[test]
    fn test_weekmask_rejects_empty_and_garbage() {
        assert!("0000000".parse::<Weekmask>().is_err());
        assert!("".parse::<Weekmask>().is_err());
        assert!("Mon Funday".parse::<Weekmask>().is_err());
    }

    #[test]
    fn test_holidays_sorted_and_deduped() {
        let cal = BusinessDayCalendar::new(
            Weekmask::WEEKDAYS,
            &[d(2020, 12, 25), d(2020, 1, 1), d(2020, 12, 25), d(2020, 12, 26)],
        );
        // 2020-12-26 is a Saturday and drops out.
        assert_eq!(cal.holidays(), &[d(2020, 1, 1), d(2020, 12, 25)]);
    }

    #[test]
    fn test_is_business_day() {
        let cal = BusinessDayCalendar::new(Weekmask::WEEKDAYS, &[d(2020, 1, 1)]);
        assert!(!cal.is_business_day(d(2020, 1, 1)));
        assert!(cal.is_business_day(d(2020, 1, 2)));
        assert!(!cal.is_business_day(d(2020, 1, 4)));
    }

    #[test]
    fn test_offset_skips_holidays() {
        let cal = BusinessDayCalendar::new(Weekmask::WEEKDAYS, &[d(2013, 5, 1)]);
        // 2013-04-30 (Tue) + 1 skips the May Day holiday.
        assert_eq!(
            cal.offset_business_days(d(2013, 4, 30), 1, Roll::Backward).unwrap(),
            d(2013, 5, 2)
        );
        assert_eq!(
            cal.offset_business_days(d(2013, 5, 2), -1, Roll::Forward).unwrap(),
            d(2013, 4, 30)
        );
    }

    #[test]
    fn test_offset_rolls_first() {
        let cal = BusinessDayCalendar::default();
        // 2020-01-04 is a Saturday.
        assert_eq!(
            cal.offset_business_days(d(2020, 1, 4), 0, Roll::Forward).unwrap(),
            d(2020, 1, 6)
        );
        assert_eq!(
            cal.offset_business_days(d(2020, 1, 4), 0, Roll::Backward).unwrap(),
            d(2020, 1, 3)
        );
        assert_eq!(
            cal.offset_business_days(d(2020, 1, 4), 1, Roll::Backward).unwrap(),
            d(2020, 1, 6)
        );
    }

    #[test]
    fn test_offset_matches_naive_stepping() {
        let cal = BusinessDayCalendar::new(
            "Sun Mon Tue Wed Thu".parse().unwrap(),
            &[d(2021, 3, 1), d(2021, 3, 2), d(2021, 3, 14), d(2021, 4, 4), d(2021, 2, 21)],
        );
        let start = d(2021, 2, 15);
        for offset in 0..40 {
            let date = start + TimeDelta::days(offset);
            for n in -30..=30 {
                for roll in [Roll::Forward, Roll::Backward] {
                    assert_eq!(
                        cal.offset_business_days(date, n, roll).unwrap(),
                        naive_offset(&cal, date, n, roll),
                        "{date} {n} {roll:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_calendar_spec_equality_ignores_memo() {
        let a = CalendarSpec::new(Weekmask::WEEKDAYS, vec![d(2020, 1, 1)]);
        let b = a.clone();
        // Force derivation on one side only.
        assert!(!a.calendar().is_business_day(d(2020, 1, 1)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_calendar_spec_serde_rebuilds_calendar() {
        let spec = CalendarSpec::new(
            "1111100".parse().unwrap(),
            vec![d(2020, 12, 25), d(2020, 1, 1)],
        );
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(
            json,
            r#"{"weekmask":"Mon Tue Wed Thu Fri","holidays":["2020-01-01","2020-12-25"]}"#
        );
        let back: CalendarSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
        assert!(!back.calendar().is_business_day(d(2020, 12, 25)));
    }

    #[test]
    fn test_bad_weekmask_fails_deserialization() {
        let err = serde_json::from_str::<CalendarSpec>(r#"{"weekmask":"0000000"}"#);
        assert!(err.is_err());
    }
}
