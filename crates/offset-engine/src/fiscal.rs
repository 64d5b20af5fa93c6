//! 52/53-week fiscal years (the 4-4-5 calendar) and their quarters.
//!
//! A fiscal year always ends on the same weekday: either the last such
//! weekday of `starting_month`, or the one nearest that month's last day.
//! Years are therefore 52 weeks long, with a 53rd week every five or six
//! years.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::dates::{
    days_in_month, month_alias, overflow, validate_month, validate_weekday, weekday_alias, ymd,
};
use crate::error::{OffsetError, Result};
use crate::offset::{n_and_normalize, require_nonzero, Rule};

fn plus_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    date.checked_add_signed(TimeDelta::days(days))
        .ok_or_else(|| overflow(format!("{date} + {days} days")))
}

/// How a fiscal year-end is picked within `starting_month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variation {
    /// The weekday closest to the last day of the month, possibly in the
    /// following month.
    Nearest,
    /// The last occurrence of the weekday in the month.
    Last,
}

impl Variation {
    /// Single-letter form used in rule codes.
    pub fn code(self) -> &'static str {
        match self {
            Variation::Nearest => "N",
            Variation::Last => "L",
        }
    }

    pub(crate) fn from_code(code: &str) -> Result<Self> {
        match code {
            "N" => Ok(Variation::Nearest),
            "L" => Ok(Variation::Last),
            _ => Err(OffsetError::InvalidParameter(format!(
                "Unable to parse variation code: {code}"
            ))),
        }
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Variation::Nearest => "nearest",
            Variation::Last => "last",
        })
    }
}

/// Fiscal years ending on `weekday` (0 = Monday) at the end of
/// `starting_month`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FY5253 {
    n: i64,
    #[serde(default)]
    normalize: bool,
    weekday: u32,
    starting_month: u32,
    variation: Variation,
}

impl FY5253 {
    /// # Errors
    ///
    /// Returns [`OffsetError::InvalidParameter`] if `n == 0`, `weekday > 6`
    /// or `starting_month` is not a month.
    pub fn new(n: i64, weekday: u32, starting_month: u32, variation: Variation) -> Result<Self> {
        require_nonzero(n)?;
        Ok(Self {
            n,
            normalize: false,
            weekday: validate_weekday(weekday)?,
            starting_month: validate_month(starting_month)?,
            variation,
        })
    }

    pub fn weekday(&self) -> u32 {
        self.weekday
    }

    pub fn starting_month(&self) -> u32 {
        self.starting_month
    }

    pub fn variation(&self) -> Variation {
        self.variation
    }

    /// The fiscal year-end that falls in (or, for [`Variation::Nearest`],
    /// just after) `starting_month` of `date`'s calendar year.
    pub fn year_end(&self, date: NaiveDate) -> Result<NaiveDate> {
        self.year_end_of(i64::from(date.year()))
    }

    fn year_end_of(&self, year: i64) -> Result<NaiveDate> {
        let year = i32::try_from(year).map_err(|_| overflow(format!("fiscal year {year}")))?;
        let last = ymd(
            year,
            self.starting_month,
            days_in_month(year, self.starting_month)?,
        )?;
        let last_wd = last.weekday().num_days_from_monday();
        let back = i64::from((last_wd + 7 - self.weekday) % 7);
        let backward = plus_days(last, -back)?;
        if back == 0 || self.variation == Variation::Last {
            return Ok(backward);
        }
        let ahead = 7 - back;
        if ahead < back {
            plus_days(last, ahead)
        } else {
            Ok(backward)
        }
    }

    fn is_year_end(&self, date: NaiveDate) -> Result<bool> {
        if self.year_end(date)? == date {
            return Ok(true);
        }
        if self.variation == Variation::Nearest {
            // A nearest year-end can spill into the next calendar month, and
            // so into the next calendar year.
            let prev_year = if date.month() == 1 {
                date.year() - 1
            } else {
                date.year()
            };
            return Ok(self.year_end_of(i64::from(prev_year))? == date);
        }
        Ok(false)
    }

    /// Step `n` year-ends from `date`.
    fn step(&self, date: NaiveDate, n: i64) -> Result<NaiveDate> {
        let year = i64::from(date.year());
        let mut ends = Vec::with_capacity(4);
        for y in year - 2..=year + 1 {
            ends.push((y, self.year_end_of(y)?));
        }
        let target = if n > 0 {
            let (y, _) = ends
                .iter()
                .find(|(_, end)| *end > date)
                .copied()
                .ok_or_else(|| overflow(format!("fiscal year after {date}")))?;
            y.checked_add(n - 1)
        } else {
            let (y, _) = ends
                .iter()
                .rev()
                .find(|(_, end)| *end < date)
                .copied()
                .ok_or_else(|| overflow(format!("fiscal year before {date}")))?;
            y.checked_add(n + 1)
        };
        let target = target.ok_or_else(|| overflow(format!("{n} fiscal years from {date}")))?;
        self.year_end_of(target)
    }

    fn suffix(&self) -> String {
        format!(
            "{}-{}-{}",
            self.variation.code(),
            month_alias(self.starting_month),
            weekday_alias(self.weekday)
        )
    }
}

impl Rule for FY5253 {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "FY5253"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("RE")
    }

    fn code_suffix(&self) -> Option<String> {
        Some(self.suffix())
    }

    fn attrs(&self) -> Vec<String> {
        vec![
            format!("startingMonth={}", self.starting_month),
            format!("variation={}", self.variation),
            format!("weekday={}", self.weekday),
        ]
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        Ok(self.step(wall.date(), n)?.and_time(wall.time()))
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        self.is_year_end(wall.date())
    }

    fn validate(&self) -> Result<()> {
        require_nonzero(self.n)?;
        validate_weekday(self.weekday)?;
        validate_month(self.starting_month)?;
        Ok(())
    }
}

/// Fiscal quarters of an [`FY5253`] year: 13 weeks each, except that
/// `qtr_with_extra_week` gets 14 in 53-week years.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FY5253Quarter {
    n: i64,
    #[serde(default)]
    normalize: bool,
    weekday: u32,
    starting_month: u32,
    qtr_with_extra_week: u32,
    variation: Variation,
}

impl FY5253Quarter {
    /// # Errors
    ///
    /// Returns [`OffsetError::InvalidParameter`] on the same conditions as
    /// [`FY5253::new`], or if `qtr_with_extra_week` is not in `1..=4`.
    pub fn new(
        n: i64,
        weekday: u32,
        starting_month: u32,
        qtr_with_extra_week: u32,
        variation: Variation,
    ) -> Result<Self> {
        let year = FY5253::new(n, weekday, starting_month, variation)?;
        Ok(Self {
            n,
            normalize: false,
            weekday: year.weekday,
            starting_month: year.starting_month,
            qtr_with_extra_week: validate_quarter(qtr_with_extra_week)?,
            variation,
        })
    }

    pub fn qtr_with_extra_week(&self) -> u32 {
        self.qtr_with_extra_week
    }

    /// The single-step fiscal year these quarters divide.
    pub fn fiscal_year(&self) -> FY5253 {
        FY5253 {
            n: 1,
            normalize: false,
            weekday: self.weekday,
            starting_month: self.starting_month,
            variation: self.variation,
        }
    }

    /// Whether the fiscal year containing `date` has 53 weeks.
    pub fn year_has_extra_week(&self, date: NaiveDate) -> Result<bool> {
        let (prev, next) = self.bracket(date)?;
        Ok((next - prev).num_days() == 371)
    }

    /// Quarter lengths in weeks for the fiscal year containing `date`.
    pub fn quarter_weeks(&self, date: NaiveDate) -> Result<[i64; 4]> {
        let mut weeks = [13; 4];
        if self.year_has_extra_week(date)? {
            weeks[self.qtr_with_extra_week as usize - 1] = 14;
        }
        Ok(weeks)
    }

    /// The year-ends on either side of `date`; a year-end brackets the year
    /// it closes.
    fn bracket(&self, date: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let year = self.fiscal_year();
        let prev = year.step(date, -1)?;
        if year.is_year_end(date)? {
            Ok((prev, date))
        } else {
            Ok((prev, year.step(date, 1)?))
        }
    }

    fn step(&self, date: NaiveDate, n: i64) -> Result<NaiveDate> {
        let year = self.fiscal_year();
        let mut current = date;
        for _ in 0..n.unsigned_abs() {
            let on_end = year.is_year_end(current)?;
            current = if n > 0 {
                let (start, weeks) = if on_end {
                    (current, self.quarter_weeks(year.step(current, 1)?)?)
                } else {
                    (year.step(current, -1)?, self.quarter_weeks(current)?)
                };
                let mut boundary = start;
                for w in weeks {
                    boundary = plus_days(boundary, 7 * w)?;
                    if boundary > current {
                        break;
                    }
                }
                boundary
            } else {
                let end = if on_end {
                    current
                } else {
                    year.step(current, 1)?
                };
                let weeks = self.quarter_weeks(current)?;
                let mut boundary = end;
                for w in weeks.iter().rev() {
                    boundary = plus_days(boundary, -7 * w)?;
                    if boundary < current {
                        break;
                    }
                }
                boundary
            };
        }
        Ok(current)
    }

    fn is_quarter_end(&self, date: NaiveDate) -> Result<bool> {
        let year = self.fiscal_year();
        if year.is_year_end(date)? {
            return Ok(true);
        }
        let mut boundary = year.step(date, -1)?;
        for w in self.quarter_weeks(date)? {
            boundary = plus_days(boundary, 7 * w)?;
            if boundary == date {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn validate_quarter(qtr: u32) -> Result<u32> {
    if !(1..=4).contains(&qtr) {
        return Err(OffsetError::InvalidParameter(format!(
            "qtr_with_extra_week must be 1<=qtr_with_extra_week<=4, got {qtr}"
        )));
    }
    Ok(qtr)
}

impl Rule for FY5253Quarter {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "FY5253Quarter"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("REQ")
    }

    fn code_suffix(&self) -> Option<String> {
        Some(format!(
            "{}-{}",
            self.fiscal_year().suffix(),
            self.qtr_with_extra_week
        ))
    }

    fn attrs(&self) -> Vec<String> {
        vec![
            format!("qtr_with_extra_week={}", self.qtr_with_extra_week),
            format!("startingMonth={}", self.starting_month),
            format!("variation={}", self.variation),
            format!("weekday={}", self.weekday),
        ]
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        Ok(self.step(wall.date(), n)?.and_time(wall.time()))
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        self.is_quarter_end(wall.date())
    }

    fn validate(&self) -> Result<()> {
        self.fiscal_year().validate()?;
        require_nonzero(self.n)?;
        validate_quarter(self.qtr_with_extra_week)?;
        Ok(())
    }
}
