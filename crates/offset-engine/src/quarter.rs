//! Quarter-anchored offsets. Quarters are counted from `starting_month`:
//! a month is a quarter month when `(month - starting_month) mod 3 == 0`.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates::{
    days_in_month, first_bday, last_bday, month_alias, shift_month, validate_month, with_day,
    DayOpt,
};
use crate::error::Result;
use crate::month::back_off_weekend;
use crate::offset::{n_and_normalize, Rule};

fn default_starting_month() -> u32 {
    3
}

/// Months since the last quarter month, `0..=2`.
fn months_since(wall: NaiveDateTime, starting_month: u32) -> i64 {
    (i64::from(wall.month()) - i64::from(starting_month)).rem_euclid(3)
}

/// Months until the next quarter month, `0..=2`.
fn months_to_go(wall: NaiveDateTime, starting_month: u32) -> i64 {
    (3 - months_since(wall, starting_month)) % 3
}

macro_rules! quarter_offset {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name {
            n: i64,
            #[serde(default)]
            normalize: bool,
            #[serde(default = "default_starting_month")]
            starting_month: u32,
        }

        impl $name {
            /// Quarters ending in March, June, September and December.
            pub fn new(n: i64) -> Self {
                Self {
                    n,
                    normalize: false,
                    starting_month: default_starting_month(),
                }
            }

            /// # Errors
            ///
            /// Returns [`crate::OffsetError::InvalidParameter`] unless
            /// `1 <= starting_month <= 12`.
            pub fn with_starting_month(n: i64, starting_month: u32) -> Result<Self> {
                Ok(Self {
                    n,
                    normalize: false,
                    starting_month: validate_month(starting_month)?,
                })
            }

            pub fn starting_month(&self) -> u32 {
                self.starting_month
            }
        }
    };
}

/// Implements the naming half of [`Rule`] shared by the quarter offsets.
macro_rules! quarter_naming {
    ($display:literal, $prefix:literal) => {
        n_and_normalize!();

        fn name(&self) -> &'static str {
            $display
        }

        fn prefix(&self) -> Option<&'static str> {
            Some($prefix)
        }

        fn code_suffix(&self) -> Option<String> {
            Some(month_alias(self.starting_month).to_string())
        }

        fn attrs(&self) -> Vec<String> {
            vec![format!("startingMonth={}", self.starting_month)]
        }

        fn validate(&self) -> Result<()> {
            validate_month(self.starting_month).map(|_| ())
        }
    };
}

quarter_offset!(
    /// The last calendar day of each quarter.
    QuarterEnd
);
quarter_offset!(
    /// The first calendar day of each quarter.
    QuarterBegin
);
quarter_offset!(
    /// The last weekday of each quarter.
    BQuarterEnd
);
quarter_offset!(
    /// The first weekday of each quarter.
    BQuarterBegin
);

impl Rule for QuarterEnd {
    quarter_naming!("QuarterEnd", "Q");

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let to_go = months_to_go(wall, self.starting_month);
        let at_end = wall.day() >= days_in_month(wall.year(), wall.month())?;
        let mut n = n;
        if n > 0 && !(at_end && to_go == 0) {
            n -= 1;
        }
        shift_month(wall, to_go + 3 * n, DayOpt::End)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(months_since(wall, self.starting_month) == 0
            && wall.day() == days_in_month(wall.year(), wall.month())?)
    }

    fn vectorized(&self) -> Result<()> {
        Ok(())
    }
}

impl Rule for QuarterBegin {
    quarter_naming!("QuarterBegin", "QS");

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let mut since = months_since(wall, self.starting_month);
        let mut n = n;
        if n <= 0 && since != 0 {
            since -= 3;
        }
        if n <= 0 && since == 0 && wall.day() > 1 {
            n += 1;
        }
        shift_month(wall, 3 * n - since, DayOpt::Start)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(months_since(wall, self.starting_month) == 0 && wall.day() == 1)
    }

    fn vectorized(&self) -> Result<()> {
        Ok(())
    }
}

impl Rule for BQuarterEnd {
    quarter_naming!("BusinessQuarterEnd", "BQ");

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let to_go = months_to_go(wall, self.starting_month);
        let last = last_bday(wall.year(), wall.month())?;
        let mut n = n;
        if n > 0 && !(wall.day() >= last && to_go == 0) {
            n -= 1;
        } else if n <= 0 && wall.day() > last && to_go == 0 {
            n += 1;
        }
        back_off_weekend(shift_month(wall, to_go + 3 * n, DayOpt::End)?)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(months_since(wall, self.starting_month) == 0
            && wall.day() == last_bday(wall.year(), wall.month())?)
    }
}

impl Rule for BQuarterBegin {
    quarter_naming!("BusinessQuarterBegin", "BQS");

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        let first = first_bday(wall.year(), wall.month())?;
        let mut since = months_since(wall, self.starting_month);
        let mut n = n;
        if n <= 0 && since != 0 {
            since -= 3;
        }
        if n <= 0 && since == 0 && wall.day() > first {
            n += 1;
        } else if n > 0 && since == 0 && wall.day() < first {
            n -= 1;
        }
        let target = shift_month(wall, 3 * n - since, DayOpt::Keep)?;
        with_day(target, first_bday(target.year(), target.month())?)
    }

    fn contains(&self, wall: NaiveDateTime) -> Result<bool> {
        Ok(months_since(wall, self.starting_month) == 0
            && wall.day() == first_bday(wall.year(), wall.month())?)
    }
}
