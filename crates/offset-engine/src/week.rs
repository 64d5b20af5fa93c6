//! Weekly offsets and weekday-of-month anchors.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates::{
    add_weeks, days_in_month, first_weekday, roll_to_weekday, shift_month, validate_weekday,
    weekday_alias, weekday_num, with_day, DayOpt,
};
use crate::error::{OffsetError, Result};
use crate::offset::{n_and_normalize, require_nonzero, Rule};

/// `n` weeks, optionally anchored to a weekday (0 = Monday).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Week {
    n: i64,
    #[serde(default)]
    normalize: bool,
    #[serde(default)]
    weekday: Option<u32>,
}

impl Week {
    /// `n` plain seven-day steps.
    pub fn new(n: i64) -> Self {
        Self {
            n,
            normalize: false,
            weekday: None,
        }
    }

    /// `n` steps between occurrences of `weekday`.
    ///
    /// # Errors
    ///
    /// Returns [`OffsetError::InvalidParameter`] if `weekday > 6`.
    pub fn on(n: i64, weekday: u32) -> Result<Self> {
        Ok(Self {
            n,
            normalize: false,
            weekday: Some(validate_weekday(weekday)?),
        })
    }

    pub fn weekday(&self) -> Option<u32> {
        self.weekday
    }
}

impl Rule for Week {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "Week"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("W")
    }

    fn code_suffix(&self) -> Option<String> {
        self.weekday.map(|w| weekday_alias(w).to_string())
    }

    fn attrs(&self) -> Vec<String> {
        self.weekday
            .map(|w| vec![format!("weekday={w}")])
            .unwrap_or_default()
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let Some(target) = self.weekday else {
            return add_weeks(wall, n);
        };
        let mut wall = wall;
        let mut n = n;
        if weekday_num(wall) != target {
            wall = roll_to_weekday(wall, target)?;
            if n > 0 {
                n -= 1;
            }
        }
        add_weeks(wall, n)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(self.weekday.is_none_or(|w| weekday_num(wall) == w))
    }

    fn vectorized(&self) -> Result<()> {
        Ok(())
    }

    fn is_anchored(&self) -> bool {
        self.n == 1 && self.weekday.is_some()
    }

    fn validate(&self) -> Result<()> {
        if let Some(w) = self.weekday {
            validate_weekday(w)?;
        }
        Ok(())
    }
}

/// Month shift implied by comparing the input day with this month's anchor.
fn months_to_anchor(anchor_day: u32, day: u32, n: i64) -> i64 {
    use std::cmp::Ordering;
    match anchor_day.cmp(&day) {
        Ordering::Greater if n > 0 => n - 1,
        Ordering::Greater => n,
        Ordering::Equal => n,
        Ordering::Less if n > 0 => n,
        Ordering::Less => n + 1,
    }
}

fn validate_week(week: u32) -> Result<u32> {
    if week > 3 {
        return Err(OffsetError::InvalidParameter(format!(
            "Week must be 0<=week<=3, got {week}"
        )));
    }
    Ok(week)
}

/// The `week`-th (0-based) `weekday` of each month, e.g. the second Tuesday.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekOfMonth {
    n: i64,
    #[serde(default)]
    normalize: bool,
    week: u32,
    weekday: u32,
}

impl WeekOfMonth {
    /// # Errors
    ///
    /// Returns [`OffsetError::InvalidParameter`] if `n == 0`, `week > 3` or
    /// `weekday > 6`.
    pub fn new(n: i64, week: u32, weekday: u32) -> Result<Self> {
        require_nonzero(n)?;
        Ok(Self {
            n,
            normalize: false,
            week: validate_week(week)?,
            weekday: validate_weekday(weekday)?,
        })
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn weekday(&self) -> u32 {
        self.weekday
    }

    fn anchor_day(&self, year: i32, month: u32) -> Result<u32> {
        let first = first_weekday(year, month)?;
        Ok(1 + (self.weekday + 7 - first) % 7 + 7 * self.week)
    }
}

impl Rule for WeekOfMonth {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "WeekOfMonth"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("WOM")
    }

    fn code_suffix(&self) -> Option<String> {
        Some(format!("{}{}", self.week + 1, weekday_alias(self.weekday)))
    }

    fn attrs(&self) -> Vec<String> {
        vec![
            format!("week={}", self.week),
            format!("weekday={}", self.weekday),
        ]
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let anchor = self.anchor_day(wall.year(), wall.month())?;
        let months = months_to_anchor(anchor, wall.day(), n);
        let target = shift_month(wall, months, DayOpt::Start)?;
        with_day(target, self.anchor_day(target.year(), target.month())?)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(wall.day() == self.anchor_day(wall.year(), wall.month())?)
    }

    fn validate(&self) -> Result<()> {
        require_nonzero(self.n)?;
        validate_week(self.week)?;
        validate_weekday(self.weekday)?;
        Ok(())
    }
}

/// The last `weekday` of each month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LastWeekOfMonth {
    n: i64,
    #[serde(default)]
    normalize: bool,
    weekday: u32,
}

impl LastWeekOfMonth {
    /// # Errors
    ///
    /// Returns [`OffsetError::InvalidParameter`] if `n == 0` or `weekday > 6`.
    pub fn new(n: i64, weekday: u32) -> Result<Self> {
        require_nonzero(n)?;
        Ok(Self {
            n,
            normalize: false,
            weekday: validate_weekday(weekday)?,
        })
    }

    pub fn weekday(&self) -> u32 {
        self.weekday
    }

    fn anchor_day(&self, year: i32, month: u32) -> Result<u32> {
        let dim = days_in_month(year, month)?;
        let last = (first_weekday(year, month)? + dim - 1) % 7;
        Ok(dim - (last + 7 - self.weekday) % 7)
    }
}

impl Rule for LastWeekOfMonth {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "LastWeekOfMonth"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("LWOM")
    }

    fn code_suffix(&self) -> Option<String> {
        Some(weekday_alias(self.weekday).to_string())
    }

    fn attrs(&self) -> Vec<String> {
        vec![format!("weekday={}", self.weekday)]
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let anchor = self.anchor_day(wall.year(), wall.month())?;
        let months = months_to_anchor(anchor, wall.day(), n);
        let target = shift_month(wall, months, DayOpt::Start)?;
        with_day(target, self.anchor_day(target.year(), target.month())?)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(wall.day() == self.anchor_day(wall.year(), wall.month())?)
    }

    fn validate(&self) -> Result<()> {
        require_nonzero(self.n)?;
        validate_weekday(self.weekday)?;
        Ok(())
    }
}
