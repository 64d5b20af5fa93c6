//! Fixed-duration offsets.
//!
//! A [`Tick`] is `n` whole units of a fixed length. Ticks compare, order and
//! hash by the duration they realize, so `Tick::hour(1) == Tick::minute(60)`.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::Neg;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::dates::add_delta;
use crate::error::{OffsetError, Result};
use crate::offset::Rule;

const NANOS_PER_MICRO: i128 = 1_000;
const NANOS_PER_MILLI: i128 = 1_000_000;
const NANOS_PER_SECOND: i128 = 1_000_000_000;
const NANOS_PER_MINUTE: i128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: i128 = 24 * NANOS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickUnit {
    Day,
    Hour,
    Minute,
    Second,
    Milli,
    Micro,
    Nano,
}

impl TickUnit {
    pub const ALL: [TickUnit; 7] = [
        TickUnit::Day,
        TickUnit::Hour,
        TickUnit::Minute,
        TickUnit::Second,
        TickUnit::Milli,
        TickUnit::Micro,
        TickUnit::Nano,
    ];

    pub fn nanos(self) -> i64 {
        self.nanos_wide() as i64
    }

    fn nanos_wide(self) -> i128 {
        match self {
            TickUnit::Day => NANOS_PER_DAY,
            TickUnit::Hour => NANOS_PER_HOUR,
            TickUnit::Minute => NANOS_PER_MINUTE,
            TickUnit::Second => NANOS_PER_SECOND,
            TickUnit::Milli => NANOS_PER_MILLI,
            TickUnit::Micro => NANOS_PER_MICRO,
            TickUnit::Nano => 1,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            TickUnit::Day => "D",
            TickUnit::Hour => "H",
            TickUnit::Minute => "T",
            TickUnit::Second => "S",
            TickUnit::Milli => "L",
            TickUnit::Micro => "U",
            TickUnit::Nano => "N",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TickUnit::Day => "Day",
            TickUnit::Hour => "Hour",
            TickUnit::Minute => "Minute",
            TickUnit::Second => "Second",
            TickUnit::Milli => "Milli",
            TickUnit::Micro => "Micro",
            TickUnit::Nano => "Nano",
        }
    }
}

/// `n` units of fixed length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tick {
    n: i64,
    unit: TickUnit,
}

impl Tick {
    pub fn new(n: i64, unit: TickUnit) -> Self {
        Self { n, unit }
    }

    pub fn day(n: i64) -> Self {
        Self::new(n, TickUnit::Day)
    }

    pub fn hour(n: i64) -> Self {
        Self::new(n, TickUnit::Hour)
    }

    pub fn minute(n: i64) -> Self {
        Self::new(n, TickUnit::Minute)
    }

    pub fn second(n: i64) -> Self {
        Self::new(n, TickUnit::Second)
    }

    pub fn milli(n: i64) -> Self {
        Self::new(n, TickUnit::Milli)
    }

    pub fn micro(n: i64) -> Self {
        Self::new(n, TickUnit::Micro)
    }

    pub fn nano(n: i64) -> Self {
        Self::new(n, TickUnit::Nano)
    }

    pub fn n(&self) -> i64 {
        self.n
    }

    pub fn unit(&self) -> TickUnit {
        self.unit
    }

    pub(crate) fn with_n(self, n: i64) -> Self {
        Self { n, ..self }
    }

    fn realized(&self) -> i128 {
        i128::from(self.n) * self.unit.nanos_wide()
    }

    /// The realized duration in nanoseconds.
    ///
    /// # Errors
    ///
    /// Returns [`OffsetError::Overflow`] if it does not fit an `i64`.
    pub fn nanos(&self) -> Result<i64> {
        i64::try_from(self.realized())
            .map_err(|_| OffsetError::Overflow(format!("{} * {} in nanoseconds", self.n, self.unit.name())))
    }

    /// The realized duration.
    pub fn delta(&self) -> Result<TimeDelta> {
        delta_from_nanos(self.realized())
    }

    /// Sum two ticks. Equal units keep the unit; mixed units are rebuilt from
    /// the combined duration.
    pub fn checked_add(self, other: Tick) -> Result<Tick> {
        if self.unit == other.unit {
            let n = self.n.checked_add(other.n).ok_or_else(|| {
                OffsetError::Overflow(format!("{} + {} {}s", self.n, other.n, self.unit.name()))
            })?;
            return Ok(Tick::new(n, self.unit));
        }
        nanos_to_tick(self.realized() + other.realized())
    }

    pub fn checked_sub(self, other: Tick) -> Result<Tick> {
        self.checked_add(-other)
    }

    /// `self + delta` as a plain duration.
    pub fn add_delta(&self, delta: TimeDelta) -> Result<TimeDelta> {
        self.delta()?
            .checked_add(&delta)
            .ok_or_else(|| OffsetError::Overflow(format!("{} + {delta}", self.delta_label())))
    }

    fn delta_label(&self) -> String {
        format!("{} {}", self.n, self.unit.name())
    }
}

impl Neg for Tick {
    type Output = Tick;

    fn neg(self) -> Tick {
        Tick::new(-self.n, self.unit)
    }
}

impl PartialEq for Tick {
    fn eq(&self, other: &Self) -> bool {
        self.realized() == other.realized()
    }
}

impl Eq for Tick {}

impl Hash for Tick {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.realized().hash(state);
    }
}

impl PartialOrd for Tick {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tick {
    fn cmp(&self, other: &Self) -> Ordering {
        self.realized().cmp(&other.realized())
    }
}

/// The tick of the largest unit that represents `delta` exactly.
pub fn delta_to_tick(delta: TimeDelta) -> Result<Tick> {
    let nanos = i128::from(delta.num_seconds()) * NANOS_PER_SECOND
        + i128::from(delta.subsec_nanos());
    nanos_to_tick(nanos)
}

fn nanos_to_tick(nanos: i128) -> Result<Tick> {
    let unit = TickUnit::ALL
        .into_iter()
        .find(|u| nanos % u.nanos_wide() == 0)
        .unwrap_or(TickUnit::Nano);
    let n = i64::try_from(nanos / unit.nanos_wide())
        .map_err(|_| OffsetError::Overflow(format!("{nanos} nanoseconds as a tick")))?;
    Ok(Tick::new(n, unit))
}

pub(crate) fn delta_from_nanos(nanos: i128) -> Result<TimeDelta> {
    let secs = i64::try_from(nanos.div_euclid(NANOS_PER_SECOND))
        .map_err(|_| OffsetError::Overflow(format!("{nanos} nanoseconds")))?;
    let sub = nanos.rem_euclid(NANOS_PER_SECOND) as u32;
    TimeDelta::new(secs, sub).ok_or_else(|| OffsetError::Overflow(format!("{nanos} nanoseconds")))
}

impl Rule for Tick {
    fn n(&self) -> i64 {
        self.n
    }

    fn set_n(&mut self, n: i64) {
        self.n = n;
    }

    fn name(&self) -> &'static str {
        self.unit.name()
    }

    fn prefix(&self) -> Option<&'static str> {
        Some(self.unit.prefix())
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime> {
        add_delta(wall, self.with_n(n).delta()?)
    }

    fn contains(&self, _wall: NaiveDateTime) -> Result<bool> {
        Ok(true)
    }

    fn adjust_dst(&self) -> bool {
        false
    }

    fn keeps_nanos(&self) -> bool {
        true
    }

    fn vectorized(&self) -> Result<()> {
        Ok(())
    }

    fn is_anchored(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(t: &Tick) -> u64 {
        let mut h = DefaultHasher::new();
        t.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_cross_unit_equality() {
        assert_eq!(Tick::hour(1), Tick::minute(60));
        assert_eq!(Tick::day(1), Tick::hour(24));
        assert_eq!(Tick::second(1), Tick::nano(1_000_000_000));
        assert_ne!(Tick::hour(1), Tick::minute(61));
        assert_eq!(hash_of(&Tick::hour(1)), hash_of(&Tick::minute(60)));
    }

    #[test]
    fn test_ordering_by_duration() {
        assert!(Tick::hour(1) > Tick::minute(59));
        assert!(Tick::milli(1) < Tick::micro(1_001));
        assert!(Tick::day(-1) < Tick::nano(0));
    }

    #[test]
    fn test_same_unit_addition_keeps_unit() {
        let sum = Tick::hour(2).checked_add(Tick::hour(3)).unwrap();
        assert_eq!(sum.unit(), TickUnit::Hour);
        assert_eq!(sum.n(), 5);
    }

    #[test]
    fn test_mixed_unit_addition_rebuilds() {
        let sum = Tick::hour(1).checked_add(Tick::minute(30)).unwrap();
        assert_eq!(sum, Tick::minute(90));
        assert_eq!(sum.unit(), TickUnit::Minute);
        assert_eq!(sum.n(), 90);

        let sum = Tick::second(1).checked_add(Tick::milli(500)).unwrap();
        assert_eq!(sum.unit(), TickUnit::Milli);
        assert_eq!(sum.n(), 1_500);

        let sum = Tick::day(1).checked_add(Tick::hour(-24)).unwrap();
        assert_eq!(sum.unit(), TickUnit::Day);
        assert_eq!(sum.n(), 0);
    }

    #[test]
    fn test_delta_to_tick_picks_largest_exact_unit() {
        assert_eq!(delta_to_tick(TimeDelta::days(2)).unwrap().unit(), TickUnit::Day);
        assert_eq!(delta_to_tick(TimeDelta::hours(25)).unwrap().unit(), TickUnit::Hour);
        let t = delta_to_tick(TimeDelta::seconds(90)).unwrap();
        assert_eq!((t.unit(), t.n()), (TickUnit::Second, 90));
        let t = delta_to_tick(TimeDelta::microseconds(1_500)).unwrap();
        assert_eq!((t.unit(), t.n()), (TickUnit::Micro, 1_500));
        let t = delta_to_tick(TimeDelta::nanoseconds(-7)).unwrap();
        assert_eq!((t.unit(), t.n()), (TickUnit::Nano, -7));
    }

    #[test]
    fn test_nanos_and_overflow() {
        assert_eq!(Tick::minute(2).nanos().unwrap(), 120_000_000_000);
        assert!(matches!(
            Tick::day(i64::MAX).nanos(),
            Err(OffsetError::Overflow(_))
        ));
    }

    #[test]
    fn test_add_delta() {
        let d = Tick::hour(1).add_delta(TimeDelta::minutes(5)).unwrap();
        assert_eq!(d, TimeDelta::minutes(65));
    }

    #[test]
    fn test_negation() {
        assert_eq!(-Tick::hour(2), Tick::minute(-120));
        assert_eq!(
            Tick::hour(1).checked_sub(Tick::minute(30)).unwrap(),
            Tick::minute(30)
        );
    }

    #[test]
    fn test_delta_from_nanos_negative() {
        assert_eq!(delta_from_nanos(-1).unwrap(), TimeDelta::nanoseconds(-1));
        assert_eq!(
            delta_from_nanos(-NANOS_PER_DAY * 3).unwrap(),
            TimeDelta::days(-3)
        );
    }
}
