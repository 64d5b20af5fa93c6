//! The [`Offset`] value and the machinery every variant shares.
//!
//! Each variant is a plain struct implementing the crate-internal [`Rule`]
//! trait on wall-clock readings. [`Offset`] wraps those rules with timestamp
//! handling: NaT propagation, timezone stripping and reattachment,
//! `normalize`, sub-microsecond preservation, and recovery from results that
//! leave the nanosecond range.

use std::fmt;
use std::ops::Neg;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::business::{BusinessDay, BusinessHour, CustomBusinessDay, CustomBusinessHour};
use crate::easter::Easter;
use crate::error::{OffsetError, Result};
use crate::fiscal::{FY5253Quarter, FY5253};
use crate::month::{
    BusinessMonthBegin, BusinessMonthEnd, CustomBusinessMonthBegin, CustomBusinessMonthEnd,
    MonthBegin, MonthEnd, SemiMonthBegin, SemiMonthEnd,
};
use crate::quarter::{BQuarterBegin, BQuarterEnd, QuarterBegin, QuarterEnd};
use crate::relative::DateOffset;
use crate::tick::{delta_to_tick, Tick};
use crate::timestamp::{check_precise, midnight, sub_micro_nanos, truncate_to_micros, Timestamp};
use crate::week::{LastWeekOfMonth, Week, WeekOfMonth};
use crate::year::{BYearBegin, BYearEnd, YearBegin, YearEnd};

/// Per-variant behaviour on timezone-free wall-clock readings.
///
/// `shift` takes the step count explicitly so rolling can reuse it with
/// `n = ±1`.
pub(crate) trait Rule {
    fn n(&self) -> i64;

    fn set_n(&mut self, n: i64);

    fn normalize(&self) -> bool {
        false
    }

    fn set_normalize(&mut self, _normalize: bool) {}

    /// Display name, pluralised by the caller when `|n| != 1`.
    fn name(&self) -> &'static str;

    fn prefix(&self) -> Option<&'static str>;

    /// The part of the rule code after `PREFIX-`, if any.
    fn code_suffix(&self) -> Option<String> {
        None
    }

    /// `key=value` attributes shown by `Display`.
    fn attrs(&self) -> Vec<String> {
        Vec::new()
    }

    /// Appended to `freqstr` (the business-day time offset).
    fn offset_str(&self) -> String {
        String::new()
    }

    fn shift(&self, wall: NaiveDateTime, n: i64) -> Result<NaiveDateTime>;

    /// Membership, ignoring `normalize`.
    fn contains(&self, wall: NaiveDateTime) -> Result<bool>;

    fn is_member(&self, wall: NaiveDateTime) -> Result<bool> {
        if self.normalize() && wall.time() != NaiveTime::MIN {
            return Ok(false);
        }
        self.contains(wall)
    }

    fn roll_back(&self, wall: NaiveDateTime) -> Result<NaiveDateTime> {
        if self.is_member(wall)? {
            Ok(wall)
        } else {
            self.shift(wall, -1)
        }
    }

    fn roll_forward(&self, wall: NaiveDateTime) -> Result<NaiveDateTime> {
        if self.is_member(wall)? {
            Ok(wall)
        } else {
            self.shift(wall, 1)
        }
    }

    /// Whether the rule works on the local wall clock (`true`) or on the
    /// absolute instant (`false`).
    fn adjust_dst(&self) -> bool {
        true
    }

    /// Whether the rule handles sub-microsecond digits itself.
    fn keeps_nanos(&self) -> bool {
        false
    }

    fn vectorized(&self) -> Result<()> {
        Err(OffsetError::NoVectorizedImplementation(format!(
            "{} does not have a vectorized implementation",
            self.name()
        )))
    }

    /// The element operation of the vectorized path.
    fn index_shift(&self, wall: NaiveDateTime) -> Result<NaiveDateTime> {
        self.shift(wall, self.n())
    }

    fn is_anchored(&self) -> bool {
        self.n() == 1
    }

    /// Re-check construction invariants, used after deserialization.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Implements the `n`/`normalize` accessors of [`Rule`] for a struct with
/// fields of those names.
macro_rules! n_and_normalize {
    () => {
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
    };
}
pub(crate) use n_and_normalize;

/// Rejects `n == 0` for variants that have no zero step.
pub(crate) fn require_nonzero(n: i64) -> Result<()> {
    if n == 0 {
        return Err(OffsetError::InvalidParameter("N cannot be 0".into()));
    }
    Ok(())
}

macro_rules! offset_kinds {
    ($($variant:ident),+ $(,)?) => {
        /// A date increment.
        ///
        /// Equality and hashing are structural over the variant and its
        /// parameters; derived calendar handles do not take part.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(tag = "kind", try_from = "OffsetRepr")]
        pub enum Offset {
            $($variant($variant)),+
        }

        #[derive(Deserialize)]
        #[serde(tag = "kind")]
        enum OffsetRepr {
            $($variant($variant)),+
        }

        impl TryFrom<OffsetRepr> for Offset {
            type Error = OffsetError;

            fn try_from(repr: OffsetRepr) -> Result<Self> {
                let offset = match repr {
                    $(OffsetRepr::$variant(o) => Offset::$variant(o)),+
                };
                offset.rule().validate()?;
                Ok(offset)
            }
        }

        impl Offset {
            pub(crate) fn rule(&self) -> &dyn Rule {
                match self {
                    $(Offset::$variant(o) => o),+
                }
            }

            fn rule_mut(&mut self) -> &mut dyn Rule {
                match self {
                    $(Offset::$variant(o) => o),+
                }
            }
        }

        $(
            impl From<$variant> for Offset {
                fn from(o: $variant) -> Self {
                    Offset::$variant(o)
                }
            }
        )+
    };
}

offset_kinds!(
    Tick,
    DateOffset,
    BusinessDay,
    CustomBusinessDay,
    BusinessHour,
    CustomBusinessHour,
    MonthEnd,
    MonthBegin,
    BusinessMonthEnd,
    BusinessMonthBegin,
    CustomBusinessMonthEnd,
    CustomBusinessMonthBegin,
    SemiMonthEnd,
    SemiMonthBegin,
    Week,
    WeekOfMonth,
    LastWeekOfMonth,
    QuarterEnd,
    QuarterBegin,
    BQuarterEnd,
    BQuarterBegin,
    YearEnd,
    YearBegin,
    BYearEnd,
    BYearBegin,
    FY5253,
    FY5253Quarter,
    Easter,
);

impl Offset {
    pub fn n(&self) -> i64 {
        self.rule().n()
    }

    pub fn normalize(&self) -> bool {
        self.rule().normalize()
    }

    /// The same offset with a different multiplier.
    ///
    /// # Errors
    ///
    /// Returns [`OffsetError::InvalidParameter`] for `n == 0` on variants
    /// that reject it.
    pub fn with_n(&self, n: i64) -> Result<Offset> {
        let mut out = self.clone();
        out.rule_mut().set_n(n);
        out.rule().validate()?;
        Ok(out)
    }

    /// The same offset with `normalize` set.
    ///
    /// # Errors
    ///
    /// Ticks cannot normalize and return [`OffsetError::InvalidParameter`].
    pub fn with_normalize(&self, normalize: bool) -> Result<Offset> {
        if normalize && matches!(self, Offset::Tick(_)) {
            return Err(OffsetError::InvalidParameter(format!(
                "{self} cannot normalize"
            )));
        }
        let mut out = self.clone();
        out.rule_mut().set_normalize(normalize);
        Ok(out)
    }

    /// `n` multiplied by `factor`.
    pub fn scaled(&self, factor: i64) -> Result<Offset> {
        let n = self
            .n()
            .checked_mul(factor)
            .ok_or_else(|| OffsetError::Overflow(format!("{self} * {factor}")))?;
        self.with_n(n)
    }

    /// Step `n` members from `ts`.
    ///
    /// # Errors
    ///
    /// Returns [`OffsetError::Overflow`] when the result cannot be
    /// represented even at microsecond precision.
    pub fn apply(&self, ts: Timestamp) -> Result<Timestamp> {
        let fallback = !matches!(self, Offset::Tick(_));
        self.wrap(ts, fallback, |rule, wall| rule.shift(wall, rule.n()))
    }

    /// Apply to every element, for variants with a bulk algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`OffsetError::NoVectorizedImplementation`] for variants or
    /// keyword sets without one; callers fall back to [`Offset::apply`].
    pub fn apply_index(&self, index: &[Timestamp]) -> Result<Vec<Timestamp>> {
        self.rule().vectorized()?;
        let fallback = !matches!(self, Offset::Tick(_));
        index
            .iter()
            .map(|ts| self.wrap(*ts, fallback, |rule, wall| rule.index_shift(wall)))
            .collect()
    }

    /// Whether `ts` is a member of this offset's date set. NaT never is.
    pub fn is_on_offset(&self, ts: &Timestamp) -> bool {
        let Some(wall) = self.local_wall(ts) else {
            return false;
        };
        self.rule().is_member(wall).unwrap_or(false)
    }

    /// Move a non-member back to the nearest preceding member.
    pub fn rollback(&self, ts: Timestamp) -> Result<Timestamp> {
        self.wrap(ts, true, |rule, wall| rule.roll_back(wall))
    }

    /// Move a non-member forward to the nearest following member.
    pub fn rollforward(&self, ts: Timestamp) -> Result<Timestamp> {
        self.wrap(ts, true, |rule, wall| rule.roll_forward(wall))
    }

    pub fn is_anchored(&self) -> bool {
        self.rule().is_anchored()
    }

    /// The registry prefix, `None` for the generic [`DateOffset`].
    pub fn prefix(&self) -> Option<&'static str> {
        self.rule().prefix()
    }

    /// Prefix plus parameter suffix, e.g. `W-MON` or `REQ-N-DEC-FRI-1`.
    pub fn rule_code(&self) -> Option<String> {
        let prefix = self.prefix()?;
        Some(match self.rule().code_suffix() {
            Some(suffix) => format!("{prefix}-{suffix}"),
            None => prefix.to_string(),
        })
    }

    /// `n` and the rule code, e.g. `2BQ-DEC`; falls back to the display
    /// form for offsets without a code.
    pub fn freqstr(&self) -> String {
        let Some(code) = self.rule_code() else {
            return self.to_string();
        };
        let mut out = if self.n() == 1 {
            code
        } else {
            format!("{}{code}", self.n())
        };
        out.push_str(&self.rule().offset_str());
        out
    }

    /// Nanoseconds in one application, for fixed-duration offsets.
    pub fn nanos(&self) -> Result<i64> {
        match self {
            Offset::Tick(t) => t.nanos(),
            _ => Err(OffsetError::UnsupportedCombination(format!(
                "{self} is a non-fixed frequency"
            ))),
        }
    }

    /// Combine with a plain duration.
    ///
    /// Business days absorb it into their time offset, ticks become the tick
    /// of the summed duration.
    pub fn shift_duration(&self, delta: TimeDelta) -> Result<Offset> {
        match self {
            Offset::Tick(t) => Ok(Offset::Tick(delta_to_tick(t.add_delta(delta)?)?)),
            Offset::BusinessDay(b) => Ok(Offset::BusinessDay(b.plus_offset(delta)?)),
            Offset::CustomBusinessDay(c) => Ok(Offset::CustomBusinessDay(c.plus_offset(delta)?)),
            _ => Err(OffsetError::UnsupportedCombination(format!(
                "only know how to combine {self} with a timestamp"
            ))),
        }
    }

    /// Sum of two offsets. Only ticks add.
    pub fn checked_add(&self, other: &Offset) -> Result<Offset> {
        match (self, other) {
            (Offset::Tick(a), Offset::Tick(b)) => Ok(Offset::Tick(a.checked_add(*b)?)),
            _ => Err(OffsetError::UnsupportedCombination(format!(
                "cannot add {other} to {self}"
            ))),
        }
    }

    /// Difference of two offsets of the same variant: this offset with
    /// `n = self.n - other.n`.
    pub fn checked_sub(&self, other: &Offset) -> Result<Offset> {
        match (self, other) {
            (Offset::Tick(a), Offset::Tick(b)) => Ok(Offset::Tick(a.checked_sub(*b)?)),
            _ if std::mem::discriminant(self) == std::mem::discriminant(other) => {
                let n = self.n().checked_sub(other.n()).ok_or_else(|| {
                    OffsetError::Overflow(format!("{self} - {other}"))
                })?;
                self.with_n(n)
            }
            _ => Err(OffsetError::UnsupportedCombination(format!(
                "cannot subtract {other} from {self}"
            ))),
        }
    }

    fn local_wall(&self, ts: &Timestamp) -> Option<NaiveDateTime> {
        if self.rule().adjust_dst() {
            ts.naive()
        } else {
            ts.utc_naive()
        }
    }

    fn wrap<F>(&self, ts: Timestamp, fallback: bool, op: F) -> Result<Timestamp>
    where
        F: Fn(&dyn Rule, NaiveDateTime) -> Result<NaiveDateTime>,
    {
        let Some(local) = self.local_wall(&ts) else {
            return Ok(Timestamp::NAT);
        };
        let rule = self.rule();
        let (input, nanos) = if rule.keeps_nanos() {
            (local, 0)
        } else {
            (truncate_to_micros(local), sub_micro_nanos(local))
        };

        let precise = check_precise(local)
            .and_then(|()| op(rule, input))
            .and_then(|out| {
                let out = if rule.normalize() {
                    midnight(out)
                } else {
                    crate::dates::add_delta(out, TimeDelta::nanoseconds(i64::from(nanos)))?
                };
                check_precise(out)?;
                Ok(out)
            });

        let out = match precise {
            Ok(out) => out,
            Err(OffsetError::OutOfBounds(reason)) if fallback => {
                debug!(offset = %self, input = %ts, %reason, "recomputing at microsecond precision");
                let out = op(rule, truncate_to_micros(local))?;
                if rule.normalize() {
                    midnight(out)
                } else {
                    out
                }
            }
            Err(OffsetError::OutOfBounds(_)) => {
                return Err(OffsetError::Overflow(format!(
                    "the add operation between {self} and {ts} will overflow"
                )));
            }
            Err(e) => return Err(e),
        };

        match ts.tz() {
            Some(tz) if !rule.adjust_dst() => Timestamp::from_naive(out)
                .tz_localize(Some(chrono_tz::Tz::UTC))
                .tz_convert(tz),
            _ => Ok(ts.with_naive(out)),
        }
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(mut self) -> Offset {
        let n = self.n();
        self.rule_mut().set_n(n.saturating_neg());
        self
    }
}

/// `<n * Names: attrs>`, omitting `n` when it is 1.
impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = self.rule();
        let n = rule.n();
        f.write_str("<")?;
        if n != 1 {
            write!(f, "{n} * ")?;
        }
        f.write_str(rule.name())?;
        if n.unsigned_abs() != 1 {
            f.write_str("s")?;
        }
        let attrs = rule.attrs();
        if !attrs.is_empty() {
            write!(f, ": {}", attrs.join(", "))?;
        }
        f.write_str(">")
    }
}
