//! Rule codes: the `PREFIX[-SUFFIX]` names offsets are known by.
//!
//! ```text
//! D H T S L U N       ticks (day .. nanosecond)
//! B C BH CBH          business days and hours
//! M MS BM BMS CBM CBMS SM SMS
//! W WOM LWOM          W-MON, WOM-2TUE, LWOM-FRI
//! Q QS BQ BQS         Q-DEC
//! A AS BA BAS         A-DEC
//! RE REQ              RE-N-DEC-FRI, REQ-N-DEC-FRI-1
//! EASTER
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::debug;

use crate::business::{BusinessDay, BusinessHour, CustomBusinessDay, CustomBusinessHour};
use crate::calendar::CalendarSpec;
use crate::dates::{parse_month_alias, parse_weekday_alias};
use crate::easter::Easter;
use crate::error::{OffsetError, Result};
use crate::fiscal::{Variation, FY5253Quarter, FY5253};
use crate::month::{
    BusinessMonthBegin, BusinessMonthEnd, CustomBusinessMonthBegin, CustomBusinessMonthEnd,
    MonthBegin, MonthEnd, SemiMonthBegin, SemiMonthEnd,
};
use crate::offset::Offset;
use crate::quarter::{BQuarterBegin, BQuarterEnd, QuarterBegin, QuarterEnd};
use crate::tick::{Tick, TickUnit};
use crate::week::{LastWeekOfMonth, Week, WeekOfMonth};
use crate::year::{BYearBegin, BYearEnd, YearBegin, YearEnd};

/// Builds the single-step offset for a prefix from its optional suffix.
type Factory = fn(Option<&str>) -> Result<Offset>;

static REGISTRY: LazyLock<HashMap<&'static str, Factory>> = LazyLock::new(|| {
    let entries: [(&'static str, Factory); 33] = [
        ("D", |s| tick(TickUnit::Day, s)),
        ("H", |s| tick(TickUnit::Hour, s)),
        ("T", |s| tick(TickUnit::Minute, s)),
        ("S", |s| tick(TickUnit::Second, s)),
        ("L", |s| tick(TickUnit::Milli, s)),
        ("U", |s| tick(TickUnit::Micro, s)),
        ("N", |s| tick(TickUnit::Nano, s)),
        ("B", |s| plain("B", s, BusinessDay::new(1))),
        ("C", |s| {
            plain("C", s, CustomBusinessDay::new(1, CalendarSpec::default()))
        }),
        ("BH", |s| plain("BH", s, BusinessHour::new(1))),
        ("CBH", |s| {
            plain("CBH", s, CustomBusinessHour::new(1, CalendarSpec::default()))
        }),
        ("M", |s| plain("M", s, MonthEnd::new(1))),
        ("MS", |s| plain("MS", s, MonthBegin::new(1))),
        ("BM", |s| plain("BM", s, BusinessMonthEnd::new(1))),
        ("BMS", |s| plain("BMS", s, BusinessMonthBegin::new(1))),
        ("CBM", |s| {
            plain("CBM", s, CustomBusinessMonthEnd::new(1, CalendarSpec::default()))
        }),
        ("CBMS", |s| {
            plain("CBMS", s, CustomBusinessMonthBegin::new(1, CalendarSpec::default()))
        }),
        ("SM", |s| {
            let day = day_of_month("SM", s)?;
            Ok(SemiMonthEnd::new(1, day)?.into())
        }),
        ("SMS", |s| {
            let day = day_of_month("SMS", s)?;
            Ok(SemiMonthBegin::new(1, day)?.into())
        }),
        ("W", |s| match s {
            Some(s) => Ok(Week::on(1, parse_weekday_alias(s)?)?.into()),
            None => Ok(Week::new(1).into()),
        }),
        ("WOM", week_of_month),
        ("LWOM", |s| {
            let weekday = parse_weekday_alias(required("LWOM", s)?)?;
            Ok(LastWeekOfMonth::new(1, weekday)?.into())
        }),
        ("Q", |s| {
            Ok(QuarterEnd::with_starting_month(1, month_or(s, 3)?)?.into())
        }),
        ("QS", |s| {
            Ok(QuarterBegin::with_starting_month(1, month_or(s, 1)?)?.into())
        }),
        ("BQ", |s| {
            Ok(BQuarterEnd::with_starting_month(1, month_or(s, 12)?)?.into())
        }),
        ("BQS", |s| {
            Ok(BQuarterBegin::with_starting_month(1, month_or(s, 1)?)?.into())
        }),
        ("A", |s| {
            Ok(YearEnd::with_month(1, month_or(s, YearEnd::DEFAULT_MONTH)?)?.into())
        }),
        ("AS", |s| {
            Ok(YearBegin::with_month(1, month_or(s, YearBegin::DEFAULT_MONTH)?)?.into())
        }),
        ("BA", |s| {
            Ok(BYearEnd::with_month(1, month_or(s, BYearEnd::DEFAULT_MONTH)?)?.into())
        }),
        ("BAS", |s| {
            Ok(BYearBegin::with_month(1, month_or(s, BYearBegin::DEFAULT_MONTH)?)?.into())
        }),
        ("RE", fiscal_year),
        ("REQ", fiscal_quarter),
        ("EASTER", |s| plain("EASTER", s, Easter::new(1))),
    ];
    entries.into_iter().collect()
});

fn bad_suffix(prefix: &str, suffix: &str) -> OffsetError {
    OffsetError::InvalidParameter(format!("Bad freq suffix {suffix} for {prefix}"))
}

fn required<'a>(prefix: &str, suffix: Option<&'a str>) -> Result<&'a str> {
    suffix.ok_or_else(|| {
        OffsetError::InvalidParameter(format!("{prefix} requires a suffix"))
    })
}

/// Offsets that take no suffix.
fn plain(prefix: &str, suffix: Option<&str>, offset: impl Into<Offset>) -> Result<Offset> {
    match suffix {
        Some(s) => Err(bad_suffix(prefix, s)),
        None => Ok(offset.into()),
    }
}

fn tick(unit: TickUnit, suffix: Option<&str>) -> Result<Offset> {
    plain(unit.prefix(), suffix, Tick::new(1, unit))
}

fn month_or(suffix: Option<&str>, default: u32) -> Result<u32> {
    suffix.map_or(Ok(default), parse_month_alias)
}

fn day_of_month(prefix: &str, suffix: Option<&str>) -> Result<u32> {
    match suffix {
        None => Ok(15),
        Some(s) => s.parse().map_err(|_| bad_suffix(prefix, s)),
    }
}

/// `WOM-2TUE`: a 1-based week digit followed by a weekday alias.
fn week_of_month(suffix: Option<&str>) -> Result<Offset> {
    let s = required("WOM", suffix)?;
    let mut chars = s.chars();
    let week = chars
        .next()
        .and_then(|c| c.to_digit(10))
        .filter(|w| *w >= 1)
        .ok_or_else(|| bad_suffix("WOM", s))?;
    let weekday = parse_weekday_alias(chars.as_str())?;
    Ok(WeekOfMonth::new(1, week - 1, weekday)?.into())
}

/// The shared `N-DEC-FRI` part of the fiscal codes.
fn fiscal_parts<'a>(prefix: &str, suffix: &'a str) -> Result<(Variation, u32, u32, Option<&'a str>)> {
    let mut parts = suffix.splitn(4, '-');
    let (Some(variation), Some(month), Some(weekday)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(bad_suffix(prefix, suffix));
    };
    Ok((
        Variation::from_code(variation)?,
        parse_month_alias(month)?,
        parse_weekday_alias(weekday)?,
        parts.next(),
    ))
}

fn fiscal_year(suffix: Option<&str>) -> Result<Offset> {
    let s = required("RE", suffix)?;
    match fiscal_parts("RE", s)? {
        (variation, month, weekday, None) => {
            Ok(FY5253::new(1, weekday, month, variation)?.into())
        }
        _ => Err(bad_suffix("RE", s)),
    }
}

fn fiscal_quarter(suffix: Option<&str>) -> Result<Offset> {
    let s = required("REQ", suffix)?;
    let (variation, month, weekday, Some(qtr)) = fiscal_parts("REQ", s)? else {
        return Err(bad_suffix("REQ", s));
    };
    let qtr = qtr.parse().map_err(|_| bad_suffix("REQ", s))?;
    Ok(FY5253Quarter::new(1, weekday, month, qtr, variation)?.into())
}

/// Every registered prefix, sorted.
pub fn prefixes() -> Vec<&'static str> {
    let mut out: Vec<_> = REGISTRY.keys().copied().collect();
    out.sort_unstable();
    out
}

/// Build the single-step offset named by `prefix` and an optional suffix.
///
/// # Errors
///
/// Returns [`OffsetError::UnknownPrefix`] for unregistered prefixes and
/// [`OffsetError::InvalidParameter`] for suffixes the prefix cannot parse.
pub fn from_name(prefix: &str, suffix: Option<&str>) -> Result<Offset> {
    debug!(prefix, ?suffix, "registry lookup");
    let factory = REGISTRY
        .get(prefix)
        .ok_or_else(|| OffsetError::UnknownPrefix(prefix.to_string()))?;
    factory(suffix)
}

impl Offset {
    /// Parse a rule code such as `W-MON` or `REQ-N-DEC-FRI-1`, splitting at
    /// the first `-`.
    pub fn from_rule_code(code: &str) -> Result<Offset> {
        match code.split_once('-') {
            Some((prefix, suffix)) => from_name(prefix, Some(suffix)),
            None => from_name(code, None),
        }
    }

    /// Parse an optional signed multiplier followed by a rule code, the
    /// inverse of [`Offset::freqstr`] for offsets without a time offset.
    ///
    /// ```
    /// use offset_engine::Offset;
    ///
    /// let offset = Offset::from_freqstr("2BQ-MAR").unwrap();
    /// assert_eq!(offset.n(), 2);
    /// assert_eq!(offset.rule_code().as_deref(), Some("BQ-MAR"));
    /// ```
    pub fn from_freqstr(freq: &str) -> Result<Offset> {
        let freq = freq.trim();
        let digits = freq
            .char_indices()
            .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && *c == '-')))
            .map_or(freq.len(), |(i, _)| i);
        let (count, code) = freq.split_at(digits);
        let base = Offset::from_rule_code(code)?;
        match count {
            "" => Ok(base),
            "-" => base.with_n(-1),
            _ => {
                let n = count.parse().map_err(|_| {
                    OffsetError::InvalidParameter(format!("invalid multiplier in {freq}"))
                })?;
                base.with_n(n)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_prefix_builds_without_suffix_or_with_default() {
        let needs_suffix = ["WOM", "LWOM", "RE", "REQ"];
        for prefix in prefixes() {
            let built = from_name(prefix, None);
            if needs_suffix.contains(&prefix) {
                assert!(built.is_err(), "{prefix} should need a suffix");
            } else {
                let offset = built.unwrap();
                assert_eq!(offset.prefix(), Some(prefix));
            }
        }
        assert_eq!(prefixes().len(), 33);
    }

    #[test]
    fn test_tick_prefixes_map_to_their_units() {
        for unit in TickUnit::ALL {
            let built = from_name(unit.prefix(), None).unwrap();
            assert_eq!(built, Offset::from(Tick::new(1, unit)));
            assert_eq!(built.prefix(), Some(unit.prefix()));
            assert!(from_name(unit.prefix(), Some("X")).is_err());
        }
    }

    #[test]
    fn test_defaults() {
        let q = Offset::from_rule_code("Q").unwrap();
        assert_eq!(q.rule_code().as_deref(), Some("Q-MAR"));
        let bq = Offset::from_rule_code("BQ").unwrap();
        assert_eq!(bq.rule_code().as_deref(), Some("BQ-DEC"));
        let qs = Offset::from_rule_code("QS").unwrap();
        assert_eq!(qs.rule_code().as_deref(), Some("QS-JAN"));
        let sm = Offset::from_rule_code("SM").unwrap();
        assert_eq!(sm.rule_code().as_deref(), Some("SM-15"));
        let a = Offset::from_rule_code("A").unwrap();
        assert_eq!(a.rule_code().as_deref(), Some("A-DEC"));
    }

    #[test]
    fn test_suffixed_codes() {
        for code in [
            "W-MON",
            "WOM-2TUE",
            "LWOM-FRI",
            "SM-20",
            "SMS-2",
            "BQ-DEC",
            "AS-JUL",
            "RE-N-DEC-FRI",
            "RE-L-AUG-SAT",
            "REQ-N-DEC-FRI-1",
        ] {
            let offset = Offset::from_rule_code(code).unwrap();
            assert_eq!(offset.rule_code().as_deref(), Some(code));
        }
    }

    #[test]
    fn test_bad_suffixes() {
        assert!(matches!(
            Offset::from_rule_code("B-MON"),
            Err(OffsetError::InvalidParameter(_))
        ));
        assert!(Offset::from_rule_code("W-XYZ").is_err());
        assert!(Offset::from_rule_code("WOM-5TUE").is_err());
        assert!(Offset::from_rule_code("WOM-0TUE").is_err());
        assert!(Offset::from_rule_code("SM-28").is_err());
        assert!(Offset::from_rule_code("SMS-1").is_err());
        assert!(Offset::from_rule_code("RE-X-DEC-FRI").is_err());
        assert!(Offset::from_rule_code("RE-N-DEC-FRI-1").is_err());
        assert!(Offset::from_rule_code("REQ-N-DEC-FRI").is_err());
        assert!(Offset::from_rule_code("REQ-N-DEC-FRI-5").is_err());
    }

    #[test]
    fn test_unknown_prefix() {
        assert_eq!(
            Offset::from_rule_code("XYZ").unwrap_err(),
            OffsetError::UnknownPrefix("XYZ".into())
        );
    }

    #[test]
    fn test_from_freqstr() {
        let o = Offset::from_freqstr("3B").unwrap();
        assert_eq!(o, BusinessDay::new(3).into());
        let o = Offset::from_freqstr("-2W-FRI").unwrap();
        assert_eq!(o.n(), -2);
        assert_eq!(o.rule_code().as_deref(), Some("W-FRI"));
        assert_eq!(Offset::from_freqstr("-M").unwrap().n(), -1);
        assert_eq!(Offset::from_freqstr("M").unwrap(), MonthEnd::new(1).into());
        assert!(Offset::from_freqstr("0WOM-1MON").is_err());
    }

    #[test]
    fn test_freqstr_round_trip() {
        for freq in ["2BQ-MAR", "M", "-3B", "10T", "WOM-3FRI"] {
            assert_eq!(Offset::from_freqstr(freq).unwrap().freqstr(), freq);
        }
        assert!(matches!(
            Offset::from_freqstr("5min"),
            Err(OffsetError::UnknownPrefix(_))
        ));
    }
}
