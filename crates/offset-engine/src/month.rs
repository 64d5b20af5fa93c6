//! Month-anchored offsets: calendar month ends and starts, their business
//! and custom-business counterparts, and the twice-monthly anchors.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::calendar::{BusinessCalendar, BusinessDayCalendar, CalendarSpec, Roll};
use crate::dates::{
    days_in_month, first_bday, last_bday, roll_back_to_weekday, shift_month, weekday_num,
    with_day, DayOpt,
};
use crate::error::{OffsetError, Result};
use crate::offset::{n_and_normalize, Rule};

/// Move to the previous Friday when `wall` falls on a weekend.
pub(crate) fn back_off_weekend(wall: NaiveDateTime) -> Result<NaiveDateTime> {
    if weekday_num(wall) > 4 {
        roll_back_to_weekday(wall, 4)
    } else {
        Ok(wall)
    }
}

fn roll_on(calendar: &BusinessDayCalendar, wall: NaiveDateTime, roll: Roll) -> Result<NaiveDateTime> {
    let date = calendar.offset_business_days(wall.date(), 0, roll)?;
    Ok(date.and_time(wall.time()))
}

fn is_month_end(wall: NaiveDateTime) -> Result<bool> {
    Ok(wall.day() == days_in_month(wall.year(), wall.month())?)
}

/// The last calendar day of the month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthEnd {
    n: i64,
    #[serde(default)]
    normalize: bool,
}

impl MonthEnd {
    pub fn new(n: i64) -> Self {
        Self {
            n,
            normalize: false,
        }
    }
}

impl Rule for MonthEnd {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "MonthEnd"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("M")
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let mut n = n;
        let mut wall = wall;
        if !is_month_end(wall)? {
            wall = shift_month(wall, -1, DayOpt::End)?;
            if n <= 0 {
                n += 1;
            }
        }
        shift_month(wall, n, DayOpt::End)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        is_month_end(wall)
    }

    fn vectorized(&self) -> Result<()> {
        Ok(())
    }
}

/// The first calendar day of the month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthBegin {
    n: i64,
    #[serde(default)]
    normalize: bool,
}

impl MonthBegin {
    pub fn new(n: i64) -> Self {
        Self {
            n,
            normalize: false,
        }
    }
}

impl Rule for MonthBegin {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "MonthBegin"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("MS")
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let n = if wall.day() > 1 && n <= 0 { n + 1 } else { n };
        shift_month(wall, n, DayOpt::Start)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(wall.day() == 1)
    }

    fn vectorized(&self) -> Result<()> {
        Ok(())
    }
}

/// The last weekday (Monday to Friday) of the month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusinessMonthEnd {
    n: i64,
    #[serde(default)]
    normalize: bool,
}

impl BusinessMonthEnd {
    pub fn new(n: i64) -> Self {
        Self {
            n,
            normalize: false,
        }
    }
}

impl Rule for BusinessMonthEnd {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "BusinessMonthEnd"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("BM")
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let last = last_bday(wall.year(), wall.month())?;
        let mut n = n;
        if n > 0 && wall.day() < last {
            n -= 1;
        } else if n <= 0 && wall.day() > last {
            n += 1;
        }
        back_off_weekend(shift_month(wall, n, DayOpt::End)?)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(wall.day() == last_bday(wall.year(), wall.month())?)
    }
}

/// The first weekday (Monday to Friday) of the month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusinessMonthBegin {
    n: i64,
    #[serde(default)]
    normalize: bool,
}

impl BusinessMonthBegin {
    pub fn new(n: i64) -> Self {
        Self {
            n,
            normalize: false,
        }
    }
}

impl Rule for BusinessMonthBegin {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "BusinessMonthBegin"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("BMS")
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let first = first_bday(wall.year(), wall.month())?;
        let mut n = n;
        if wall.day() > first && n <= 0 {
            n += 1;
        } else if wall.day() < first && n > 0 {
            n -= 1;
        }
        let target = shift_month(wall, n, DayOpt::Keep)?;
        with_day(target, first_bday(target.year(), target.month())?)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(wall.day() == first_bday(wall.year(), wall.month())?)
    }
}

/// The last business day of the month under a custom calendar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomBusinessMonthEnd {
    n: i64,
    #[serde(default)]
    normalize: bool,
    #[serde(default)]
    calendar: CalendarSpec,
}

impl CustomBusinessMonthEnd {
    pub fn new(n: i64, calendar: CalendarSpec) -> Self {
        Self {
            n,
            normalize: false,
            calendar,
        }
    }

    pub fn calendar(&self) -> &CalendarSpec {
        &self.calendar
    }

    /// This month's calendar end and the business day it rolls back to.
    fn anchors(&self, wall: NaiveDateTime) -> Result<(NaiveDateTime, NaiveDateTime)> {
        let month_end = shift_month(wall, 0, DayOpt::End)?;
        let anchor = roll_on(self.calendar.calendar(), month_end, Roll::Backward)?;
        Ok((month_end, anchor))
    }
}

impl Rule for CustomBusinessMonthEnd {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "CustomBusinessMonthEnd"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("CBM")
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let (month_end, anchor) = self.anchors(wall)?;
        let mut n = n;
        if n == 0 && wall != anchor {
            n = 1;
        }
        if wall < anchor && n >= 1 {
            n -= 1;
        } else if wall > anchor && n <= -1 {
            n += 1;
        }
        let target = shift_month(month_end, n, DayOpt::End)?;
        roll_on(self.calendar.calendar(), target, Roll::Backward)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        let (_, anchor) = self.anchors(wall)?;
        Ok(wall.date() == anchor.date())
    }
}

/// The first business day of the month under a custom calendar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomBusinessMonthBegin {
    n: i64,
    #[serde(default)]
    normalize: bool,
    #[serde(default)]
    calendar: CalendarSpec,
}

impl CustomBusinessMonthBegin {
    pub fn new(n: i64, calendar: CalendarSpec) -> Self {
        Self {
            n,
            normalize: false,
            calendar,
        }
    }

    pub fn calendar(&self) -> &CalendarSpec {
        &self.calendar
    }

    fn anchors(&self, wall: NaiveDateTime) -> Result<(NaiveDateTime, NaiveDateTime)> {
        let month_begin = with_day(wall, 1)?;
        let anchor = roll_on(self.calendar.calendar(), month_begin, Roll::Forward)?;
        Ok((month_begin, anchor))
    }
}

impl Rule for CustomBusinessMonthBegin {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "CustomBusinessMonthBegin"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("CBMS")
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let (month_begin, anchor) = self.anchors(wall)?;
        let mut n = n;
        if n == 0 && wall != anchor {
            n = 1;
        }
        if wall > anchor && n <= -1 {
            n += 1;
        } else if wall < anchor && n >= 1 {
            n -= 1;
        }
        let target = shift_month(month_begin, n, DayOpt::Start)?;
        roll_on(self.calendar.calendar(), target, Roll::Forward)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        let (_, anchor) = self.anchors(wall)?;
        Ok(wall.date() == anchor.date())
    }
}

fn validate_day_of_month(day: u32, min: u32) -> Result<u32> {
    if !(min..=27).contains(&day) {
        return Err(OffsetError::InvalidParameter(format!(
            "day_of_month must be {min}<=day_of_month<=27, got {day}"
        )));
    }
    Ok(day)
}

fn default_day_of_month() -> u32 {
    15
}

/// Off-anchor inputs move to `day_of_month`, adjusting `n` by the step that
/// move represents.
fn semi_month_prepare(
    wall: NaiveDateTime,
    n: i64,
    day_of_month: u32,
    on_anchor: bool,
) -> Result<(NaiveDateTime, i64)> {
    if on_anchor {
        return Ok((wall, n));
    }
    let day = wall.day();
    let dim = days_in_month(wall.year(), wall.month())?;
    let mut n = n;
    if 1 < day && day < day_of_month {
        if n > 0 {
            n -= 1;
        }
        return Ok((with_day(wall, day_of_month)?, n));
    }
    if day_of_month < day && day < dim {
        if n < 0 {
            n += 1;
        } else if n == 0 {
            n = 1;
        }
        return Ok((with_day(wall, day_of_month)?, n));
    }
    Ok((wall, n))
}

/// Twice a month: on `day_of_month` and on the last day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemiMonthEnd {
    n: i64,
    #[serde(default)]
    normalize: bool,
    #[serde(default = "default_day_of_month")]
    day_of_month: u32,
}

impl SemiMonthEnd {
    /// # Errors
    ///
    /// Returns [`OffsetError::InvalidParameter`] unless `1 <= day_of_month <= 27`.
    pub fn new(n: i64, day_of_month: u32) -> Result<Self> {
        Ok(Self {
            n,
            normalize: false,
            day_of_month: validate_day_of_month(day_of_month, 1)?,
        })
    }

    pub fn day_of_month(&self) -> u32 {
        self.day_of_month
    }
}

impl Default for SemiMonthEnd {
    fn default() -> Self {
        Self {
            n: 1,
            normalize: false,
            day_of_month: default_day_of_month(),
        }
    }
}

impl Rule for SemiMonthEnd {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "SemiMonthEnd"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("SM")
    }

    fn code_suffix(&self) -> Option<String> {
        Some(self.day_of_month.to_string())
    }

    fn attrs(&self) -> Vec<String> {
        vec![format!("day_of_month={}", self.day_of_month)]
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let dom = self.day_of_month;
        let (mut wall, mut n) = semi_month_prepare(wall, n, dom, self.contains(wall)?)?;
        if wall.day() < dom {
            wall = with_day(wall, dom)?;
            if n > 0 {
                n -= 1;
            }
        } else if wall.day() > dom {
            wall = with_day(wall, dom)?;
            n = if n == 0 { 1 } else { n + 1 };
        }
        let day = if n.rem_euclid(2) == 1 { 31 } else { dom };
        shift_month(wall, n.div_euclid(2), DayOpt::Day(day))
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        let day = wall.day();
        Ok(day == self.day_of_month || day == days_in_month(wall.year(), wall.month())?)
    }

    fn vectorized(&self) -> Result<()> {
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        validate_day_of_month(self.day_of_month, 1).map(|_| ())
    }
}

/// Twice a month: on the first and on `day_of_month`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemiMonthBegin {
    n: i64,
    #[serde(default)]
    normalize: bool,
    #[serde(default = "default_day_of_month")]
    day_of_month: u32,
}

impl SemiMonthBegin {
    /// # Errors
    ///
    /// Returns [`OffsetError::InvalidParameter`] unless `2 <= day_of_month <= 27`.
    pub fn new(n: i64, day_of_month: u32) -> Result<Self> {
        Ok(Self {
            n,
            normalize: false,
            day_of_month: validate_day_of_month(day_of_month, 2)?,
        })
    }

    pub fn day_of_month(&self) -> u32 {
        self.day_of_month
    }
}

impl Default for SemiMonthBegin {
    fn default() -> Self {
        Self {
            n: 1,
            normalize: false,
            day_of_month: default_day_of_month(),
        }
    }
}

impl Rule for SemiMonthBegin {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "SemiMonthBegin"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("SMS")
    }

    fn code_suffix(&self) -> Option<String> {
        Some(self.day_of_month.to_string())
    }

    fn attrs(&self) -> Vec<String> {
        vec![format!("day_of_month={}", self.day_of_month)]
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let dom = self.day_of_month;
        let (mut wall, mut n) = semi_month_prepare(wall, n, dom, self.contains(wall)?)?;
        if wall.day() < dom {
            wall = with_day(wall, dom)?;
            n = if n == 0 { -1 } else { n - 1 };
        } else if wall.day() > dom {
            wall = with_day(wall, dom)?;
            if n == 0 {
                n = 1;
            } else if n < 0 {
                n += 1;
            }
        }
        let odd = n.rem_euclid(2);
        let day = if odd == 1 { 1 } else { dom };
        shift_month(wall, n.div_euclid(2) + odd, DayOpt::Day(day))
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        let day = wall.day();
        Ok(day == 1 || day == self.day_of_month)
    }

    fn vectorized(&self) -> Result<()> {
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        validate_day_of_month(self.day_of_month, 2).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Weekmask;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn walk(rule: &dyn Rule, start: NaiveDateTime, steps: usize) -> Vec<NaiveDateTime> {
        let mut out = Vec::with_capacity(steps);
        let mut cur = start;
        for _ in 0..steps {
            cur = rule.shift(cur, rule.n()).unwrap();
            out.push(cur);
        }
        out
    }

    #[test]
    fn test_month_end() {
        let m = MonthEnd::new(1);
        assert_eq!(m.shift(d(2020, 1, 15), 1).unwrap(), d(2020, 1, 31));
        assert_eq!(m.shift(d(2020, 1, 31), 1).unwrap(), d(2020, 2, 29));
        assert_eq!(m.shift(d(2020, 1, 15), 0).unwrap(), d(2020, 1, 31));
        assert_eq!(m.shift(d(2020, 1, 31), 0).unwrap(), d(2020, 1, 31));
        assert_eq!(m.shift(d(2020, 1, 15), -1).unwrap(), d(2019, 12, 31));
        assert_eq!(m.shift(d(2020, 3, 31), -1).unwrap(), d(2020, 2, 29));
    }

    #[test]
    fn test_month_begin() {
        let m = MonthBegin::new(1);
        assert_eq!(m.shift(d(2020, 1, 15), 1).unwrap(), d(2020, 2, 1));
        assert_eq!(m.shift(d(2020, 1, 1), 1).unwrap(), d(2020, 2, 1));
        assert_eq!(m.shift(d(2020, 1, 15), 0).unwrap(), d(2020, 2, 1));
        assert_eq!(m.shift(d(2020, 1, 1), 0).unwrap(), d(2020, 1, 1));
        assert_eq!(m.shift(d(2020, 1, 15), -1).unwrap(), d(2020, 1, 1));
        assert_eq!(m.shift(d(2020, 1, 1), -1).unwrap(), d(2019, 12, 1));
    }

    #[test]
    fn test_business_month_end() {
        let m = BusinessMonthEnd::new(1);
        // May 2020 ends on a Sunday; its last business day is the 29th.
        assert_eq!(m.shift(d(2020, 5, 15), 1).unwrap(), d(2020, 5, 29));
        assert_eq!(m.shift(d(2020, 5, 29), 1).unwrap(), d(2020, 6, 30));
        assert_eq!(m.shift(d(2020, 5, 30), 1).unwrap(), d(2020, 6, 30));
        assert_eq!(m.shift(d(2020, 5, 30), -1).unwrap(), d(2020, 5, 29));
        assert_eq!(m.shift(d(2020, 5, 30), 0).unwrap(), d(2020, 6, 30));
        assert!(m.contains(d(2020, 5, 29)).unwrap());
        assert!(!m.contains(d(2020, 5, 31)).unwrap());
    }

    #[test]
    fn test_business_month_begin() {
        let m = BusinessMonthBegin::new(1);
        // February 2020 starts on a Saturday; March on a Sunday.
        assert_eq!(m.shift(d(2020, 2, 1), 1).unwrap(), d(2020, 2, 3));
        assert_eq!(m.shift(d(2020, 2, 3), 1).unwrap(), d(2020, 3, 2));
        assert_eq!(m.shift(d(2020, 2, 10), -1).unwrap(), d(2020, 2, 3));
        assert_eq!(m.shift(d(2020, 2, 10), 0).unwrap(), d(2020, 3, 2));
        assert_eq!(m.shift(d(2020, 2, 1), 0).unwrap(), d(2020, 2, 3));
        assert!(m.contains(d(2020, 3, 2)).unwrap());
        assert!(!m.contains(d(2020, 3, 1)).unwrap());
    }

    #[test]
    fn test_custom_business_month_end_with_holiday() {
        let spec = CalendarSpec::new(Weekmask::WEEKDAYS, vec![NaiveDate::from_ymd_opt(2020, 1, 31).unwrap()]);
        let m = CustomBusinessMonthEnd::new(1, spec);
        assert_eq!(m.shift(d(2020, 1, 15), 1).unwrap(), d(2020, 1, 30));
        assert_eq!(m.shift(d(2020, 1, 30), 1).unwrap(), d(2020, 2, 28));
        assert_eq!(m.shift(d(2020, 1, 31), 1).unwrap(), d(2020, 2, 28));
        assert_eq!(m.shift(d(2020, 1, 31), -1).unwrap(), d(2020, 1, 30));
        assert_eq!(m.shift(d(2020, 1, 15), 0).unwrap(), d(2020, 1, 30));
        assert_eq!(m.shift(d(2020, 1, 30), 0).unwrap(), d(2020, 1, 30));
        assert!(m.contains(d(2020, 1, 30)).unwrap());
        assert!(!m.contains(d(2020, 1, 31)).unwrap());
    }

    #[test]
    fn test_custom_business_month_begin_with_holiday() {
        let spec = CalendarSpec::new(Weekmask::WEEKDAYS, vec![NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()]);
        let m = CustomBusinessMonthBegin::new(1, spec);
        assert_eq!(m.shift(d(2019, 12, 15), 1).unwrap(), d(2020, 1, 2));
        assert_eq!(m.shift(d(2020, 1, 1), 1).unwrap(), d(2020, 1, 2));
        assert_eq!(m.shift(d(2020, 1, 2), 1).unwrap(), d(2020, 2, 3));
        assert_eq!(m.shift(d(2020, 1, 15), -1).unwrap(), d(2020, 1, 2));
        assert_eq!(m.shift(d(2020, 1, 2), -1).unwrap(), d(2019, 12, 2));
        assert_eq!(m.shift(d(2020, 1, 2), 0).unwrap(), d(2020, 1, 2));
        assert!(m.contains(d(2020, 1, 2)).unwrap());
    }

    #[test]
    fn test_semi_month_end_full_year() {
        let m = SemiMonthEnd::default();
        let dates = walk(&m, d(2020, 1, 1), 24);
        assert_eq!(dates.first(), Some(&d(2020, 1, 15)));
        assert_eq!(dates[1], d(2020, 1, 31));
        assert_eq!(dates[2], d(2020, 2, 15));
        assert_eq!(dates[3], d(2020, 2, 29));
        assert_eq!(dates.last(), Some(&d(2020, 12, 31)));
        for pair in dates.chunks(2) {
            assert_eq!(pair[0].day(), 15);
            assert_eq!(pair[1].day(), days_in_month(pair[1].year(), pair[1].month()).unwrap());
        }
    }

    #[test]
    fn test_semi_month_end_negative_and_zero() {
        let m = SemiMonthEnd::default();
        assert_eq!(m.shift(d(2020, 1, 20), -1).unwrap(), d(2020, 1, 15));
        assert_eq!(m.shift(d(2020, 1, 15), -1).unwrap(), d(2019, 12, 31));
        assert_eq!(m.shift(d(2020, 1, 31), -1).unwrap(), d(2020, 1, 15));
        assert_eq!(m.shift(d(2020, 1, 20), 0).unwrap(), d(2020, 1, 31));
        assert_eq!(m.shift(d(2020, 1, 10), 0).unwrap(), d(2020, 1, 15));
        assert_eq!(m.shift(d(2020, 1, 15), 0).unwrap(), d(2020, 1, 15));
        assert_eq!(m.shift(d(2020, 1, 15), 2).unwrap(), d(2020, 2, 15));
    }

    #[test]
    fn test_semi_month_begin() {
        let m = SemiMonthBegin::default();
        assert_eq!(m.shift(d(2020, 1, 1), 1).unwrap(), d(2020, 1, 15));
        assert_eq!(m.shift(d(2020, 1, 15), 1).unwrap(), d(2020, 2, 1));
        assert_eq!(m.shift(d(2020, 1, 20), 1).unwrap(), d(2020, 2, 1));
        assert_eq!(m.shift(d(2020, 1, 10), 1).unwrap(), d(2020, 1, 15));
        assert_eq!(m.shift(d(2020, 1, 20), -1).unwrap(), d(2020, 1, 15));
        assert_eq!(m.shift(d(2020, 1, 10), -1).unwrap(), d(2020, 1, 1));
        assert_eq!(m.shift(d(2020, 1, 1), -1).unwrap(), d(2019, 12, 15));
        assert_eq!(m.shift(d(2020, 1, 10), 0).unwrap(), d(2020, 1, 15));
        assert_eq!(m.shift(d(2020, 1, 20), 0).unwrap(), d(2020, 2, 1));
    }

    #[test]
    fn test_semi_month_validation() {
        assert!(SemiMonthEnd::new(1, 1).is_ok());
        assert!(SemiMonthEnd::new(1, 28).is_err());
        assert!(SemiMonthBegin::new(1, 1).is_err());
        let err = SemiMonthBegin::new(1, 30).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameter: day_of_month must be 2<=day_of_month<=27, got 30"
        );
    }

    #[test]
    fn test_keeps_time_of_day() {
        let wall = d(2020, 1, 15) + chrono::TimeDelta::hours(10);
        let out = MonthEnd::new(1).shift(wall, 1).unwrap();
        assert_eq!(out, d(2020, 1, 31) + chrono::TimeDelta::hours(10));
    }
}
