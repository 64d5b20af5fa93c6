//! # offset-engine
//!
//! Calendar offset arithmetic.
//!
//! An [`Offset`] is a composable date increment: business days and hours,
//! month, quarter and year anchors, custom holiday calendars, 52/53-week
//! fiscal years, semi-month and nth-weekday-of-month rules, Easter, and
//! fixed-duration ticks. Offsets can be applied to a [`Timestamp`], test it
//! for membership in their date set, roll it onto that set, and drive
//! [`generate_range`].
//!
//! ```
//! use offset_engine::{BusinessDay, Offset, Timestamp};
//!
//! let friday: Timestamp = "2020-01-03 09:00".parse().unwrap();
//! let bday = Offset::from(BusinessDay::new(1));
//! assert_eq!(bday.apply(friday).unwrap().to_string(), "2020-01-06 09:00:00");
//! ```
//!
//! ## Modules
//!
//! - [`offset`]: the [`Offset`] value and shared timestamp handling
//! - [`tick`]: fixed-duration offsets (day down to nanosecond)
//! - [`relative`]: the generic field-wise [`DateOffset`]
//! - [`business`]: business days and business hours
//! - [`month`], [`week`], [`quarter`], [`year`]: calendar anchors
//! - [`fiscal`]: 52/53-week fiscal years and quarters
//! - [`easter`]: Easter Sunday
//! - [`calendar`]: weekmasks, holidays and the business-day oracle
//! - [`registry`]: rule codes such as `W-MON` or `BQ-DEC`
//! - [`range`]: lazy date sequences
//! - [`timestamp`]: the nanosecond wall-clock instant
//! - [`error`]: Error types

pub mod business;
pub mod calendar;
mod dates;
pub mod easter;
pub mod error;
pub mod fiscal;
pub mod month;
pub mod offset;
pub mod quarter;
pub mod range;
pub mod registry;
pub mod relative;
pub mod tick;
pub mod timestamp;
pub mod week;
pub mod year;

pub use business::{BusinessDay, BusinessHour, CustomBusinessDay, CustomBusinessHour};
pub use calendar::{BusinessCalendar, BusinessDayCalendar, CalendarSpec, Roll, Weekmask};
pub use easter::{easter, Easter};
pub use error::{OffsetError, Result};
pub use fiscal::{Variation, FY5253Quarter, FY5253};
pub use month::{
    BusinessMonthBegin, BusinessMonthEnd, CustomBusinessMonthBegin, CustomBusinessMonthEnd,
    MonthBegin, MonthEnd, SemiMonthBegin, SemiMonthEnd,
};
pub use offset::Offset;
pub use quarter::{BQuarterBegin, BQuarterEnd, QuarterBegin, QuarterEnd};
pub use range::{generate_range, DateRange, RangeSpec};
pub use registry::from_name;
pub use relative::{DateOffset, RelativeDelta, WeekdayRule};
pub use tick::{delta_to_tick, Tick, TickUnit};
pub use timestamp::Timestamp;
pub use week::{LastWeekOfMonth, Week, WeekOfMonth};
pub use year::{BYearBegin, BYearEnd, YearBegin, YearEnd};
