//! Keyword-driven relative offsets.
//!
//! [`RelativeDelta`] is the typed keyword set behind [`DateOffset`]. Plural
//! fields shift, singular fields replace. A shift applies, in order: the
//! absolute replacements, the year/month shift with the day clamped to the
//! target month, the day/week/clock delta, then the weekday jump.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::dates::{self, DayOpt};
use crate::error::{OffsetError, Result};
use crate::offset::Rule;

/// "The nth `weekday` on or after" (`nth > 0`) or "on or before" (`nth < 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekdayRule {
    pub weekday: u32,
    pub nth: i64,
}

impl WeekdayRule {
    pub fn next(weekday: u32) -> Self {
        Self { weekday, nth: 1 }
    }

    pub fn previous(weekday: u32) -> Self {
        Self { weekday, nth: -1 }
    }

    fn jump_days(&self, from: u32) -> i64 {
        let target = i64::from(self.weekday);
        let from = i64::from(from);
        let whole_weeks = (self.nth.abs() - 1) * 7;
        if self.nth > 0 {
            whole_weeks + (7 - from + target).rem_euclid(7)
        } else {
            -(whole_weeks + (from - target).rem_euclid(7))
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelativeDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weeks: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub microseconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nanoseconds: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday: Option<WeekdayRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minute: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub microsecond: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nanosecond: Option<u32>,
}

/// Keywords with a vectorized implementation.
const FAST_KEYWORDS: [&str; 8] = [
    "years",
    "months",
    "weeks",
    "days",
    "hours",
    "minutes",
    "seconds",
    "microseconds",
];

impl RelativeDelta {
    /// Names of the keywords that are set, in canonical order.
    pub fn keywords(&self) -> Vec<&'static str> {
        self.entries().into_iter().map(|(k, _)| k).collect()
    }

    fn entries(&self) -> Vec<(&'static str, String)> {
        fn push<T: fmt::Display>(out: &mut Vec<(&'static str, String)>, key: &'static str, v: Option<T>) {
            if let Some(v) = v {
                out.push((key, v.to_string()));
            }
        }
        let mut out = Vec::new();
        push(&mut out, "years", self.years);
        push(&mut out, "months", self.months);
        push(&mut out, "weeks", self.weeks);
        push(&mut out, "days", self.days);
        push(&mut out, "hours", self.hours);
        push(&mut out, "minutes", self.minutes);
        push(&mut out, "seconds", self.seconds);
        push(&mut out, "microseconds", self.microseconds);
        push(&mut out, "nanoseconds", self.nanoseconds);
        push(&mut out, "year", self.year);
        push(&mut out, "month", self.month);
        push(&mut out, "day", self.day);
        if let Some(w) = self.weekday {
            out.push((
                "weekday",
                format!("{}({:+})", dates::weekday_alias(w.weekday), w.nth),
            ));
        }
        push(&mut out, "hour", self.hour);
        push(&mut out, "minute", self.minute);
        push(&mut out, "second", self.second);
        push(&mut out, "microsecond", self.microsecond);
        push(&mut out, "nanosecond", self.nanosecond);
        out
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn has_absolute(&self) -> bool {
        self.year.is_some()
            || self.month.is_some()
            || self.day.is_some()
            || self.weekday.is_some()
            || self.hour.is_some()
            || self.minute.is_some()
            || self.second.is_some()
            || self.microsecond.is_some()
            || self.nanosecond.is_some()
    }

    /// Whether the shift needs wall-clock field arithmetic rather than a
    /// fixed duration.
    pub fn uses_calendar_fields(&self) -> bool {
        self.years.is_some()
            || self.months.is_some()
            || self.weeks.is_some()
            || self.days.is_some()
            || self.has_absolute()
    }

    fn touches_nanos(&self) -> bool {
        self.nanoseconds.is_some() || self.nanosecond.is_some()
    }

    fn validate(&self) -> Result<()> {
        let check = |ok: bool, what: String| {
            if ok {
                Ok(())
            } else {
                Err(OffsetError::InvalidParameter(what))
            }
        };
        if let Some(m) = self.month {
            dates::validate_month(m)?;
        }
        if let Some(d) = self.day {
            check((1..=31).contains(&d), format!("day must be in 1..=31, got {d}"))?;
        }
        if let Some(w) = self.weekday {
            dates::validate_weekday(w.weekday)?;
            check(w.nth != 0, "weekday occurrence cannot be 0".into())?;
        }
        if let Some(h) = self.hour {
            check(h < 24, format!("hour must be in 0..24, got {h}"))?;
        }
        if let Some(m) = self.minute {
            check(m < 60, format!("minute must be in 0..60, got {m}"))?;
        }
        if let Some(s) = self.second {
            check(s < 60, format!("second must be in 0..60, got {s}"))?;
        }
        if let Some(us) = self.microsecond {
            check(us < 1_000_000, format!("microsecond must be in 0..1000000, got {us}"))?;
        }
        if let Some(ns) = self.nanosecond {
            check(ns < 1_000, format!("nanosecond must be in 0..1000, got {ns}"))?;
        }
        Ok(())
    }

    /// Months contributed by `years` and `months`.
    fn total_months(&self) -> Result<i64> {
        self.years
            .unwrap_or(0)
            .checked_mul(12)
            .and_then(|m| m.checked_add(self.months.unwrap_or(0)))
            .ok_or_else(|| OffsetError::Overflow(format!("{self} in months")))
    }

    /// The day/week/clock part as one duration, scaled by `factor`.
    fn clock_delta(&self, factor: i64, with_weeks: bool) -> Result<TimeDelta> {
        let overflow = || OffsetError::Overflow(format!("{factor} * ({self})"));
        let weeks = if with_weeks { self.weeks.unwrap_or(0) } else { 0 };
        let parts: [(i64, i128); 7] = [
            (weeks, 7 * 86_400_000_000_000),
            (self.days.unwrap_or(0), 86_400_000_000_000),
            (self.hours.unwrap_or(0), 3_600_000_000_000),
            (self.minutes.unwrap_or(0), 60_000_000_000),
            (self.seconds.unwrap_or(0), 1_000_000_000),
            (self.microseconds.unwrap_or(0), 1_000),
            (self.nanoseconds.unwrap_or(0), 1),
        ];
        let mut total: i128 = 0;
        for (value, unit) in parts {
            let scaled = i128::from(value)
                .checked_mul(unit)
                .and_then(|v| v.checked_mul(i128::from(factor)))
                .ok_or_else(overflow)?;
            total = total.checked_add(scaled).ok_or_else(overflow)?;
        }
        crate::tick::delta_from_nanos(total)
    }

    /// Add the delta once, negated when `sign` is negative. Absolute fields
    /// and the weekday rule are not negated.
    pub(crate) fn add_to(&self, wall: NaiveDateTime, sign: i64) -> Result<NaiveDateTime> {
        let year = self.year.unwrap_or(wall.year());
        let month = self.month.unwrap_or(wall.month());
        let months = self.total_months()? * sign;
        let anchor = dates::with_ymd(wall, year, month, 1)?;
        let shifted = dates::shift_month(anchor, months, DayOpt::Start)?;
        let dim = dates::days_in_month(shifted.year(), shifted.month())?;
        let day = self.day.unwrap_or(wall.day()).min(dim);
        let mut out = dates::with_day(shifted, day)?;

        let time = out.time();
        let micro = self
            .microsecond
            .unwrap_or(time.nanosecond() / 1_000);
        let nano = self.nanosecond.unwrap_or(time.nanosecond() % 1_000);
        let time = chrono::NaiveTime::from_hms_nano_opt(
            self.hour.unwrap_or(time.hour()),
            self.minute.unwrap_or(time.minute()),
            self.second.unwrap_or(time.second()),
            micro * 1_000 + nano,
        )
        .ok_or_else(|| OffsetError::InvalidParameter(format!("invalid clock fields in {self}")))?;
        out = out.date().and_time(time);

        out = dates::add_delta(out, self.clock_delta(sign, true)?)?;

        if let Some(rule) = self.weekday {
            out = dates::add_days(out, rule.jump_days(dates::weekday_num(out)))?;
        }
        Ok(out)
    }
}

impl fmt::Display for RelativeDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// The generic offset: `n` repetitions of a [`RelativeDelta`], or `n` days
/// when no keyword is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateOffset {
    n: i64,
    #[serde(default)]
    normalize: bool,
    #[serde(default)]
    delta: RelativeDelta,
}

impl DateOffset {
    /// # Errors
    ///
    /// Returns [`OffsetError::InvalidParameter`] when an absolute field is out
    /// of range.
    pub fn new(n: i64, delta: RelativeDelta) -> Result<Self> {
        delta.validate()?;
        Ok(Self {
            n,
            normalize: false,
            delta,
        })
    }

    /// `n` calendar days.
    pub fn days(n: i64) -> Self {
        Self {
            n,
            normalize: false,
            delta: RelativeDelta::default(),
        }
    }

    pub fn normalized(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn delta(&self) -> &RelativeDelta {
        &self.delta
    }

    fn fixed_step(&self) -> Result<TimeDelta> {
        if self.delta.is_empty() {
            Ok(TimeDelta::days(1))
        } else {
            self.delta.clock_delta(1, true)
        }
    }
}

impl Rule for DateOffset {
    fn n(&self) -> i64 {
        self.n
    }

    fn set_n(&mut self, n: i64) {
        self.n = n;
    }

    fn normalize(&self) -> bool {
        self.normalize
    }

    fn set_normalize(&mut self, normalize: bool) {
        self.normalize = normalize;
    }

    fn name(&self) -> &'static str {
        "DateOffset"
    }

    fn prefix(&self) -> Option<&'static str> {
        None
    }

    fn attrs(&self) -> Vec<String> {
        if self.delta.is_empty() {
            Vec::new()
        } else {
            vec![self.delta.to_string()]
        }
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        if !self.delta.uses_calendar_fields() {
            let step = self.fixed_step()?;
            let total = step
                .checked_mul(i32::try_from(n).map_err(|_| {
                    OffsetError::Overflow(format!("{n} repetitions of {step}"))
                })?)
                .ok_or_else(|| OffsetError::Overflow(format!("{n} repetitions of {step}")))?;
            return dates::add_delta(wall, total);
        }
        let sign = n.signum();
        let mut out = wall;
        for _ in 0..n.unsigned_abs() {
            out = self.delta.add_to(out, sign)?;
        }
        Ok(out)
    }

    fn contains(&self, _wall: NaiveDateTime) -> Result<bool> {
        Ok(true)
    }

    fn adjust_dst(&self) -> bool {
        self.delta.uses_calendar_fields()
    }

    fn keeps_nanos(&self) -> bool {
        self.delta.touches_nanos()
    }

    fn vectorized(&self) -> Result<()> {
        if !self.delta.uses_calendar_fields() {
            return Ok(());
        }
        let unsupported: Vec<&str> = self
            .delta
            .keywords()
            .into_iter()
            .filter(|k| !FAST_KEYWORDS.contains(k))
            .collect();
        if unsupported.is_empty() {
            Ok(())
        } else {
            Err(OffsetError::NoVectorizedImplementation(format!(
                "DateOffset with relativedelta keyword(s) {} not able to be applied vectorized",
                unsupported.join(", ")
            )))
        }
    }

    fn index_shift(&self, wall: NaiveDateTime) -> Result<NaiveDateTime> {
        if !self.delta.uses_calendar_fields() {
            return self.shift(wall, self.n);
        }
        let overflow = || OffsetError::Overflow(format!("{} * ({})", self.n, self.delta));
        let months = self
            .delta
            .total_months()?
            .checked_mul(self.n)
            .ok_or_else(overflow)?;
        let mut out = wall;
        if months != 0 {
            out = dates::shift_month(out, months, DayOpt::Keep)?;
        }
        let weeks = self
            .delta
            .weeks
            .unwrap_or(0)
            .checked_mul(self.n)
            .ok_or_else(overflow)?;
        if weeks != 0 {
            out = dates::add_weeks(out, weeks)?;
        }
        dates::add_delta(out, self.delta.clock_delta(self.n, false)?)
    }

    fn validate(&self) -> Result<()> {
        self.delta.validate()
    }
}
