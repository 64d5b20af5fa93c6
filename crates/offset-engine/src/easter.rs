//! Western Easter Sunday.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates::ymd;
use crate::error::{OffsetError, Result};
use crate::offset::{n_and_normalize, Rule};

/// Years for which the Gregorian computation is valid.
pub const EASTER_YEARS: std::ops::RangeInclusive<i64> = 1583..=4099;

/// Gregorian Easter Sunday of `year`.
///
/// # Errors
///
/// Returns [`OffsetError::InvalidParameter`] outside [`EASTER_YEARS`].
pub fn easter(year: i64) -> Result<NaiveDate> {
    if !EASTER_YEARS.contains(&year) {
        return Err(OffsetError::InvalidParameter(format!(
            "Easter is only computed for years 1583 through 4099, got {year}"
        )));
    }
    let g = year % 19;
    let c = year / 100;
    let h = (c - c / 4 - (8 * c + 13) / 25 + 19 * g + 15) % 30;
    let i = h - (h / 28) * (1 - (h / 28) * (29 / (h + 1)) * ((21 - g) / 11));
    let j = (year + year / 4 + i + 2 - c + c / 4) % 7;
    let p = i - j;
    let day = 1 + (p + 27 + (p + 6) / 40) % 31;
    let month = 3 + (p + 26) / 30;
    ymd(year as i32, month as u32, day as u32)
}

/// Steps between Easter Sundays.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Easter {
    n: i64,
    #[serde(default)]
    normalize: bool,
}

impl Easter {
    pub fn new(n: i64) -> Self {
        Self {
            n,
            normalize: false,
        }
    }
}

impl Rule for Easter {
    n_and_normalize!();

    fn name(&self) -> &'static str {
        "Easter"
    }

    fn prefix(&self) -> Option<&'static str> {
        Some("EASTER")
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let year = i64::from(wall.year());
        let current = easter(year)?;
        let date = wall.date();
        let target = if n >= 0 {
            if date >= current {
                year.checked_add(n)
            } else {
                year.checked_add(n - 1)
            }
        } else if date > current {
            year.checked_add(n + 1)
        } else {
            year.checked_add(n)
        };
        let target = target.ok_or_else(|| {
            OffsetError::Overflow(format!("{n} Easters from {wall}"))
        })?;
        Ok(easter(target)?.and_time(wall.time()))
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(easter(i64::from(wall.year()))? == wall.date())
    }
}
