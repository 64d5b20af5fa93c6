//! Business-day and business-hour offsets.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::calendar::{BusinessCalendar, BusinessDayCalendar, CalendarSpec, Roll};
use crate::dates::{add_days, add_delta, add_weeks, weekday_num};
use crate::error::{OffsetError, Result};
use crate::offset::{n_and_normalize, Rule};
use crate::timestamp::{sub_micro_nanos, truncate_to_micros};

static WEEKDAY_CALENDAR: LazyLock<BusinessDayCalendar> =
    LazyLock::new(BusinessDayCalendar::default);

/// `n` business days (Monday to Friday), plus an optional fixed `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusinessDay {
    n: i64,
    #[serde(default)]
    normalize: bool,
    #[serde(default, rename = "offset_nanos", with = "delta_nanos")]
    offset: TimeDelta,
}

impl BusinessDay {
    pub fn new(n: i64) -> Self {
        Self {
            n,
            normalize: false,
            offset: TimeDelta::zero(),
        }
    }

    pub fn with_offset(mut self, offset: TimeDelta) -> Self {
        self.offset = offset;
        self
    }

    pub fn offset(&self) -> TimeDelta {
        self.offset
    }

    pub(crate) fn plus_offset(&self, delta: TimeDelta) -> Result<Self> {
        let offset = self
            .offset
            .checked_add(&delta)
            .ok_or_else(|| OffsetError::Overflow(format!("{} + {delta}", self.offset)))?;
        Ok(self.clone().with_offset(offset))
    }
}

impl Rule for BusinessDay {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "BusinessDay"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("B")
    }

    fn offset_str(&self) -> String {
        format_offset(self.offset)
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let is_weekend = |dt: NaiveDateTime| weekday_num(dt) > 4;
        let mut n = n;
        if n == 0 && is_weekend(wall) {
            n = 1;
        }

        let mut result = wall;
        if n.abs() > 5 {
            let weeks = n.div_euclid(5);
            result = add_weeks(result, weeks)?;
            if n < 0 && is_weekend(result) {
                n += 1;
            }
            n -= 5 * weeks;
            if n == 0 && is_weekend(result) {
                n -= 1;
            }
        }

        while n != 0 {
            let step = n.signum();
            result = add_days(result, step)?;
            if !is_weekend(result) {
                n -= step;
            }
        }
        add_delta(result, self.offset)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(weekday_num(wall) < 5)
    }

    fn vectorized(&self) -> Result<()> {
        Ok(())
    }
}

/// `n` business days under a custom weekmask and holiday list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomBusinessDay {
    n: i64,
    #[serde(default)]
    normalize: bool,
    #[serde(default)]
    calendar: CalendarSpec,
    #[serde(default, rename = "offset_nanos", with = "delta_nanos")]
    offset: TimeDelta,
}

impl CustomBusinessDay {
    pub fn new(n: i64, calendar: CalendarSpec) -> Self {
        Self {
            n,
            normalize: false,
            calendar,
            offset: TimeDelta::zero(),
        }
    }

    pub fn with_offset(mut self, offset: TimeDelta) -> Self {
        self.offset = offset;
        self
    }

    pub fn offset(&self) -> TimeDelta {
        self.offset
    }

    pub fn calendar(&self) -> &CalendarSpec {
        &self.calendar
    }

    pub(crate) fn plus_offset(&self, delta: TimeDelta) -> Result<Self> {
        let offset = self
            .offset
            .checked_add(&delta)
            .ok_or_else(|| OffsetError::Overflow(format!("{} + {delta}", self.offset)))?;
        Ok(self.clone().with_offset(offset))
    }
}

impl Rule for CustomBusinessDay {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "CustomBusinessDay"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("C")
    }

    fn offset_str(&self) -> String {
        format_offset(self.offset)
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let out = step_business_days(self.calendar.calendar(), wall, n)?;
        add_delta(out, self.offset)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(self.calendar.calendar().is_business_day(wall.date()))
    }
}

/// Step `n` business days from `wall`, keeping the time of day. A
/// non-business start counts from the business day behind it (forward
/// steps) or ahead of it (backward and zero steps).
fn step_business_days(
    calendar: &BusinessDayCalendar,
    wall: NaiveDateTime,
    n: i64,
) -> Result<NaiveDateTime> {
    let roll = if n <= 0 { Roll::Forward } else { Roll::Backward };
    let date = calendar.offset_business_days(wall.date(), n, roll)?;
    Ok(date.and_time(wall.time()))
}

/// `+1D2H30Min`-style rendering of a business-day time offset.
fn format_offset(offset: TimeDelta) -> String {
    if offset.is_zero() {
        return String::new();
    }
    let (sign, abs) = if offset < TimeDelta::zero() {
        ('-', -offset)
    } else {
        ('+', offset)
    };
    let mut out = String::from(sign);
    let days = abs.num_days();
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    let mut secs = abs.num_seconds() - days * 86_400;
    let hours = secs / 3_600;
    if hours != 0 {
        out.push_str(&format!("{hours}H"));
        secs -= hours * 3_600;
    }
    let minutes = secs / 60;
    if minutes != 0 {
        out.push_str(&format!("{minutes}Min"));
        secs -= minutes * 60;
    }
    if secs != 0 {
        out.push_str(&format!("{secs}s"));
    }
    let micros = abs.subsec_nanos() / 1_000;
    if micros > 0 {
        out.push_str(&format!("{micros}us"));
    }
    out
}

/// Serde adapter storing a `TimeDelta` as whole nanoseconds.
mod delta_nanos {
    use chrono::TimeDelta;
    use serde::{de, ser, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        delta: &TimeDelta,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let nanos = delta
            .num_nanoseconds()
            .ok_or_else(|| <S::Error as ser::Error>::custom("offset exceeds the nanosecond range"))?;
        serializer.serialize_i64(nanos)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<TimeDelta, D::Error> {
        let nanos = i64::deserialize(deserializer)?;
        if nanos == i64::MIN {
            return Err(de::Error::custom("offset exceeds the nanosecond range"));
        }
        Ok(TimeDelta::nanoseconds(nanos))
    }
}

fn default_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_end() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn validate_hours(start: NaiveTime, end: NaiveTime) -> Result<()> {
    for t in [start, end] {
        if t.second() != 0 || t.nanosecond() != 0 {
            return Err(OffsetError::InvalidParameter(format!(
                "business hours must be whole minutes, got {t}"
            )));
        }
    }
    if start == end {
        return Err(OffsetError::InvalidParameter(
            "start and end must not be the same".into(),
        ));
    }
    Ok(())
}

/// The business-hour arithmetic for one window and one sign of `n`.
///
/// Opening and closing lookups step by one business day in the direction
/// of `n`; `prev_opening` steps against it.
struct Hours<'a> {
    n: i64,
    start: NaiveTime,
    end: NaiveTime,
    calendar: &'a BusinessDayCalendar,
}

impl Hours<'_> {
    fn daytime(&self) -> bool {
        self.start < self.end
    }

    fn span(&self) -> TimeDelta {
        let span = self.end - self.start;
        if self.daytime() {
            span
        } else {
            span + TimeDelta::days(1)
        }
    }

    fn dir(&self) -> i64 {
        if self.n >= 0 {
            1
        } else {
            -1
        }
    }

    fn is_bday(&self, dt: NaiveDateTime) -> bool {
        self.calendar.is_business_day(dt.date())
    }

    fn opening_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.start)
    }

    fn next_opening(&self, dt: NaiveDateTime) -> Result<NaiveDateTime> {
        let t = dt.time();
        let step = !self.is_bday(dt)
            || (self.n >= 0 && self.start < t)
            || (self.n < 0 && t < self.start);
        let dt = if step {
            step_business_days(self.calendar, dt, self.dir())?
        } else {
            dt
        };
        Ok(self.opening_on(dt.date()))
    }

    fn prev_opening(&self, dt: NaiveDateTime) -> Result<NaiveDateTime> {
        let t = dt.time();
        let step = !self.is_bday(dt)
            || (self.n >= 0 && t < self.start)
            || (self.n < 0 && t > self.start);
        let dt = if step {
            step_business_days(self.calendar, dt, -self.dir())?
        } else {
            dt
        };
        Ok(self.opening_on(dt.date()))
    }

    /// Inside a window: no further than one window's length past the
    /// relevant opening. Windows may straddle midnight onto a non-business
    /// day.
    fn in_window(&self, dt: NaiveDateTime) -> Result<bool> {
        let opening = if self.n >= 0 {
            self.prev_opening(dt)?
        } else {
            self.next_opening(dt)?
        };
        Ok(dt - opening <= self.span())
    }

    fn outside_clock(&self, t: NaiveTime) -> bool {
        if self.daytime() {
            t < self.start || self.end < t
        } else {
            self.end < t && t < self.start
        }
    }

    fn apply(&self, wall: NaiveDateTime, nanos: u32) -> Result<NaiveDateTime> {
        let one_second = TimeDelta::seconds(1);
        let window = self.span();
        let n = self.n;

        let mut other = wall;
        if n >= 0 {
            if other.time() == self.end || !self.in_window(other)? {
                other = self.next_opening(other)?;
            }
        } else {
            if other.time() == self.start {
                other = add_delta(other, -one_second)?;
            }
            if !self.in_window(other)? {
                other = add_delta(self.next_opening(other)?, window)?;
            }
        }

        let window_minutes = window.num_minutes();
        let minutes = n
            .checked_abs()
            .and_then(|a| a.checked_mul(60))
            .ok_or_else(|| OffsetError::Overflow(format!("{n} business hours")))?;
        let (mut days, mut rest) = (minutes / window_minutes, minutes % window_minutes);
        if n < 0 {
            days = -days;
            rest = -rest;
        }

        if days != 0 {
            other = if self.is_bday(other) {
                step_business_days(self.calendar, other, days)?
            } else {
                let remain = other - self.prev_opening(other)?;
                let skipped = step_business_days(self.calendar, other, days)?;
                add_delta(self.next_opening(skipped)?, remain)?
            };
        }

        let mut result = add_delta(other, TimeDelta::minutes(rest))?;
        if self.outside_clock(result.time()) {
            if n >= 0 {
                let edge = add_delta(self.prev_opening(other)?, window)?;
                let remain = result - edge;
                result = add_delta(self.next_opening(other)?, remain)?;
            } else {
                let edge = self.next_opening(other)?;
                let remain = result - edge;
                result = add_delta(self.next_opening(result)?, window + remain)?;
            }
        }

        if n >= 0 {
            if result.time() == self.end {
                result = self.next_opening(result)?;
            }
        } else if result.time() == self.start && nanos == 0 {
            let before = add_delta(result, -one_second)?;
            result = add_delta(self.next_opening(before)?, window)?;
        }
        Ok(result)
    }

    fn roll_back(&self, wall: NaiveDateTime) -> Result<NaiveDateTime> {
        let opening = if self.n >= 0 {
            self.prev_opening(wall)?
        } else {
            self.next_opening(wall)?
        };
        add_delta(opening, self.span())
    }

    fn roll_forward(&self, wall: NaiveDateTime) -> Result<NaiveDateTime> {
        if self.n >= 0 {
            self.next_opening(wall)
        } else {
            self.prev_opening(wall)
        }
    }
}

/// Implements the business-hour half of [`Rule`] for a struct with `start`,
/// `end` and a `hours(n)` constructor.
macro_rules! business_hour_rule {
    () => {
        fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
            let nanos = sub_micro_nanos(wall);
            let out = self.hours(n).apply(truncate_to_micros(wall), nanos)?;
            add_delta(out, TimeDelta::nanoseconds(i64::from(nanos)))
        }

        fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
            self.hours(self.n).in_window(wall)
        }

        fn roll_back(&self, wall: NaiveDateTime) -> Result<NaiveDateTime> {
            if self.is_member(wall)? {
                return Ok(wall);
            }
            self.hours(self.n).roll_back(truncate_to_micros(wall))
        }

        fn roll_forward(&self, wall: NaiveDateTime) -> Result<NaiveDateTime> {
            if self.is_member(wall)? {
                return Ok(wall);
            }
            self.hours(self.n).roll_forward(truncate_to_micros(wall))
        }

        fn attrs(&self) -> Vec<String> {
            vec![format!(
                "{}={}-{}",
                self.prefix().unwrap_or_default(),
                self.start.format("%H:%M"),
                self.end.format("%H:%M")
            )]
        }

        fn keeps_nanos(&self) -> bool {
            true
        }

        fn validate(&self) -> Result<()> {
            validate_hours(self.start, self.end)
        }
    };
}

/// `n` business hours within a daily `start`–`end` window on weekdays.
/// A window with `start > end` runs overnight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusinessHour {
    n: i64,
    #[serde(default)]
    normalize: bool,
    #[serde(default = "default_start")]
    start: NaiveTime,
    #[serde(default = "default_end")]
    end: NaiveTime,
}

impl BusinessHour {
    /// `n` hours within 09:00–17:00.
    pub fn new(n: i64) -> Self {
        Self {
            n,
            normalize: false,
            start: default_start(),
            end: default_end(),
        }
    }

    /// # Errors
    ///
    /// Returns [`OffsetError::InvalidParameter`] if `start == end` or either
    /// bound is not a whole minute.
    pub fn with_hours(n: i64, start: NaiveTime, end: NaiveTime) -> Result<Self> {
        validate_hours(start, end)?;
        Ok(Self {
            n,
            normalize: false,
            start,
            end,
        })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    fn hours(&self, n: i64) -> Hours<'_> {
        Hours {
            n,
            start: self.start,
            end: self.end,
            calendar: &WEEKDAY_CALENDAR,
        }
    }
}

impl Rule for BusinessHour {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "BusinessHour"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("BH")
    }

    business_hour_rule!();
}

/// [`BusinessHour`] over a custom business-day calendar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomBusinessHour {
    n: i64,
    #[serde(default)]
    normalize: bool,
    #[serde(default = "default_start")]
    start: NaiveTime,
    #[serde(default = "default_end")]
    end: NaiveTime,
    #[serde(default)]
    calendar: CalendarSpec,
}

impl CustomBusinessHour {
    pub fn new(n: i64, calendar: CalendarSpec) -> Self {
        Self {
            n,
            normalize: false,
            start: default_start(),
            end: default_end(),
            calendar,
        }
    }

    /// # Errors
    ///
    /// Same as [`BusinessHour::with_hours`].
    pub fn with_hours(
        n: i64,
        start: NaiveTime,
        end: NaiveTime,
        calendar: CalendarSpec,
    ) -> Result<Self> {
        validate_hours(start, end)?;
        Ok(Self {
            n,
            normalize: false,
            start,
            end,
            calendar,
        })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn calendar(&self) -> &CalendarSpec {
        &self.calendar
    }

    fn hours(&self, n: i64) -> Hours<'_> {
        Hours {
            n,
            start: self.start,
            end: self.end,
            calendar: self.calendar.calendar(),
        }
    }
}

impl Rule for CustomBusinessHour {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "CustomBusinessHour"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("CBH")
    }

    business_hour_rule!();
}
