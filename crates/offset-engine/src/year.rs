//! Year-anchored offsets, parameterized by the anchor `month`.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates::{
    days_in_month, first_bday, last_bday, month_alias, overflow, shift_month, validate_month,
    with_ymd, DayOpt,
};
use crate::error::Result;
use crate::month::back_off_weekend;
use crate::offset::{n_and_normalize, Rule};

fn year_plus(year: i32, delta: i64) -> Result<i32> {
    i64::from(year)
        .checked_add(delta)
        .and_then(|y| i32::try_from(y).ok())
        .ok_or_else(|| overflow(format!("year {year} + {delta}")))
}

macro_rules! year_offset {
    ($(#[$doc:meta])* $name:ident, $default:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name {
            n: i64,
            #[serde(default)]
            normalize: bool,
            month: u32,
        }

        impl $name {
            pub const DEFAULT_MONTH: u32 = $default;

            pub fn new(n: i64) -> Self {
                Self {
                    n,
                    normalize: false,
                    month: Self::DEFAULT_MONTH,
                }
            }

            /// # Errors
            ///
            /// Returns [`crate::OffsetError::InvalidParameter`] unless
            /// `1 <= month <= 12`.
            pub fn with_month(n: i64, month: u32) -> Result<Self> {
                Ok(Self {
                    n,
                    normalize: false,
                    month: validate_month(month)?,
                })
            }

            pub fn month(&self) -> u32 {
                self.month
            }
        }
    };
}

/// Implements the naming half of [`Rule`] shared by the year offsets.
macro_rules! year_naming {
    ($display:literal, $prefix:literal) => {
        n_and_normalize!();

        fn name(&self) -> &'static str {
            $display
        }

        fn prefix(&self) -> Option<&'static str> {
            Some($prefix)
        }

        fn code_suffix(&self) -> Option<String> {
            Some(month_alias(self.month).to_string())
        }

        fn attrs(&self) -> Vec<String> {
            vec![format!("month={}", self.month)]
        }

        fn validate(&self) -> Result<()> {
            validate_month(self.month).map(|_| ())
        }
    };
}

year_offset!(
    /// The last day of `month` each year (December by default).
    YearEnd, 12
);
year_offset!(
    /// The first day of `month` each year (January by default).
    YearBegin, 1
);
year_offset!(
    /// The last weekday of `month` each year.
    BYearEnd, 12
);
year_offset!(
    /// The first weekday of `month` each year.
    BYearBegin, 1
);

impl YearEnd {
    fn end_of(&self, wall: NaiveDateTime, year: i32) -> Result<NaiveDateTime> {
        with_ymd(wall, year, self.month, days_in_month(year, self.month)?)
    }

    /// The next year-end strictly after `wall`.
    fn increment(&self, wall: NaiveDateTime) -> Result<NaiveDateTime> {
        let year = wall.year();
        let year = if wall.month() == self.month {
            if wall.day() == days_in_month(year, self.month)? {
                year_plus(year, 1)?
            } else {
                year
            }
        } else if wall.month() < self.month {
            year
        } else {
            year_plus(year, 1)?
        };
        self.end_of(wall, year)
    }

    /// The previous year-end strictly before `wall`.
    fn decrement(&self, wall: NaiveDateTime) -> Result<NaiveDateTime> {
        let year = if wall.month() > self.month {
            wall.year()
        } else {
            year_plus(wall.year(), -1)?
        };
        self.end_of(wall, year)
    }
}

impl Rule for YearEnd {
    year_naming!("YearEnd", "A");

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        match n {
            0 if self.contains(wall)? => Ok(wall),
            0 => self.increment(wall),
            n if n > 0 => {
                let first = self.increment(wall)?;
                self.end_of(first, year_plus(first.year(), n - 1)?)
            }
            n => {
                let first = self.decrement(wall)?;
                self.end_of(first, year_plus(first.year(), n + 1)?)
            }
        }
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(wall.month() == self.month
            && wall.day() == days_in_month(wall.year(), self.month)?)
    }

    fn vectorized(&self) -> Result<()> {
        Ok(())
    }
}

impl Rule for YearBegin {
    year_naming!("YearBegin", "AS");

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let (month, day) = (wall.month(), wall.day());
        let year = if n > 0 || (n == 0 && (month != self.month || day > 1)) {
            let n = n.max(1);
            let bump = i64::from(month >= self.month);
            year_plus(wall.year(), n - 1 + bump)?
        } else if n < 0 {
            let drop = i64::from(month < self.month || (month == self.month && day == 1));
            year_plus(wall.year(), n + 1 - drop)?
        } else {
            wall.year()
        };
        with_ymd(wall, year, self.month, 1)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(wall.month() == self.month && wall.day() == 1)
    }

    fn vectorized(&self) -> Result<()> {
        Ok(())
    }
}

impl Rule for BYearEnd {
    year_naming!("BusinessYearEnd", "BA");

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let last = last_bday(wall.year(), self.month)?;
        let (month, day) = (wall.month(), wall.day());
        let mut years = n;
        if n > 0 {
            if month < self.month || (month == self.month && day < last) {
                years -= 1;
            }
        } else if month > self.month || (month == self.month && day > last) {
            years += 1;
        }
        let months = years
            .checked_mul(12)
            .ok_or_else(|| overflow(format!("{years} years")))?;
        let target = shift_month(wall, months, DayOpt::Keep)?;
        let year = target.year();
        let month_end = days_in_month(year, self.month)?;
        back_off_weekend(with_ymd(target, year, self.month, month_end)?)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(wall.month() == self.month
            && wall.day() == last_bday(wall.year(), self.month)?)
    }
}

impl Rule for BYearBegin {
    year_naming!("BusinessYearBegin", "BAS");

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let first = first_bday(wall.year(), self.month)?;
        let (month, day) = (wall.month(), wall.day());
        let mut years = n;
        if n > 0 {
            if month < self.month || (month == self.month && day < first) {
                years -= 1;
            }
        } else if month > self.month || (month == self.month && day > first) {
            years += 1;
        }
        let months = years
            .checked_mul(12)
            .ok_or_else(|| overflow(format!("{years} years")))?;
        let target = shift_month(wall, months, DayOpt::Keep)?;
        let year = target.year();
        with_ymd(target, year, self.month, first_bday(year, self.month)?)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(wall.month() == self.month
            && wall.day() == first_bday(wall.year(), self.month)?)
    }
}
