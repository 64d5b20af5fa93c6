//! Lazy date sequences driven by an offset.
//!
//! The generator resolves its bounds once, eagerly, then pulls one value
//! at a time. Every step must strictly advance (or, for negative offsets,
//! retreat); an offset that fails to do so ends the sequence with
//! [`OffsetError::NonMonotonic`].

use std::cmp::Ordering;

use tracing::debug;

use crate::business::BusinessDay;
use crate::error::{OffsetError, Result};
use crate::offset::Offset;
use crate::timestamp::Timestamp;

/// Builder for [`generate_range`] arguments. The default offset is one
/// business day.
#[derive(Debug, Clone)]
pub struct RangeSpec {
    start: Option<Timestamp>,
    end: Option<Timestamp>,
    periods: Option<u64>,
    offset: Offset,
}

impl Default for RangeSpec {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            periods: None,
            offset: BusinessDay::new(1).into(),
        }
    }
}

impl RangeSpec {
    pub fn start(mut self, start: Timestamp) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: Timestamp) -> Self {
        self.end = Some(end);
        self
    }

    pub fn periods(mut self, periods: u64) -> Self {
        self.periods = Some(periods);
        self
    }

    pub fn offset(mut self, offset: Offset) -> Self {
        self.offset = offset;
        self
    }

    /// Resolve the bounds and start iterating.
    pub fn generate(self) -> Result<DateRange> {
        generate_range(self.start, self.end, self.periods, &self.offset)
    }
}

/// Dates from `start` to `end` inclusive stepping by `offset`.
///
/// At least two of `start`, `end` and `periods` must be given. A start off
/// the offset is rolled forward onto it; when there is no start, an end off
/// the offset is rolled back instead. With both endpoints and no `periods`,
/// `end < start` yields nothing. A missing endpoint is derived from the
/// other as `(periods - 1)` applications of the offset. NaT endpoints count
/// as absent.
///
/// # Errors
///
/// Returns [`OffsetError::InvalidParameter`] when fewer than two arguments
/// are given or the endpoints mix naive and timezone-aware timestamps, and
/// propagates errors from rolling or stepping the endpoints.
pub fn generate_range(
    start: Option<Timestamp>,
    end: Option<Timestamp>,
    periods: Option<u64>,
    offset: &Offset,
) -> Result<DateRange> {
    let mut start = start.filter(|ts| !ts.is_nat());
    let mut end = end.filter(|ts| !ts.is_nat());
    let given = [start.is_some(), end.is_some(), periods.is_some()];
    if given.iter().filter(|g| **g).count() < 2 {
        return Err(OffsetError::InvalidParameter(
            "at least two of start, end and periods must be specified".into(),
        ));
    }
    if let (Some(s), Some(e)) = (start, end) {
        if s.tz().is_some() != e.tz().is_some() {
            return Err(OffsetError::InvalidParameter(format!(
                "start {s} and end {e} must both be naive or both be timezone-aware"
            )));
        }
    }

    if let Some(s) = start {
        if !offset.is_on_offset(&s) {
            start = Some(offset.rollforward(s)?);
        }
    } else if let Some(e) = end {
        if !offset.is_on_offset(&e) {
            end = Some(offset.rollback(e)?);
        }
    }

    let (start, end) = match (start, end, periods) {
        (Some(s), Some(e), _) => (s, e),
        (Some(s), None, Some(p)) => (s, step_from(s, offset, span(p)?)?),
        (None, Some(e), Some(p)) => {
            let back = span(p)?
                .checked_neg()
                .ok_or_else(|| OffsetError::Overflow(format!("{p} periods")))?;
            (step_from(e, offset, back)?, e)
        }
        _ => {
            return Err(OffsetError::InvalidParameter(
                "at least two of start, end and periods must be specified".into(),
            ))
        }
    };

    let ascending = offset.n() >= 0;
    let empty = periods.is_none() && end < start;
    debug!(%start, %end, %offset, ascending, empty, "resolved range bounds");
    Ok(DateRange {
        offset: offset.clone(),
        next: (!empty).then_some(start),
        end,
        ascending,
        failure: None,
    })
}

/// `periods - 1` as a signed multiplier.
fn span(periods: u64) -> Result<i64> {
    i64::try_from(periods)
        .map(|p| p - 1)
        .map_err(|_| OffsetError::InvalidParameter(format!("periods {periods} is too large")))
}

/// `ts + multiplier * offset`; a zero multiplier keeps `ts`.
fn step_from(ts: Timestamp, offset: &Offset, multiplier: i64) -> Result<Timestamp> {
    if multiplier == 0 {
        return Ok(ts);
    }
    offset.scaled(multiplier)?.apply(ts)
}

/// The lazy sequence produced by [`generate_range`].
#[derive(Debug, Clone)]
pub struct DateRange {
    offset: Offset,
    next: Option<Timestamp>,
    end: Timestamp,
    ascending: bool,
    failure: Option<OffsetError>,
}

impl DateRange {
    fn within_end(&self, ts: &Timestamp) -> bool {
        match ts.partial_cmp(&self.end) {
            Some(Ordering::Equal) => true,
            Some(Ordering::Less) => self.ascending,
            Some(Ordering::Greater) => !self.ascending,
            None => false,
        }
    }

    fn moves_on(&self, from: &Timestamp, to: &Timestamp) -> bool {
        let wanted = if self.ascending {
            Ordering::Greater
        } else {
            Ordering::Less
        };
        to.partial_cmp(from) == Some(wanted)
    }
}

impl Iterator for DateRange {
    type Item = Result<Timestamp>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.failure.take() {
            return Some(Err(err));
        }
        let current = self.next.take()?;
        if !self.within_end(&current) {
            return None;
        }
        match self.offset.apply(current) {
            Ok(next) if self.moves_on(&current, &next) => self.next = Some(next),
            Ok(_) => {
                let verb = if self.ascending {
                    "increment"
                } else {
                    "decrement"
                };
                self.failure = Some(OffsetError::NonMonotonic(format!(
                    "Offset {} did not {verb} date",
                    self.offset
                )));
            }
            Err(err) => self.failure = Some(err),
        }
        Some(Ok(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::month::MonthEnd;
    use crate::tick::Tick;
    use crate::week::WeekOfMonth;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn collect(range: DateRange) -> Vec<Timestamp> {
        range.collect::<Result<Vec<_>>>().unwrap()
    }

    fn days(list: &[&str]) -> Vec<Timestamp> {
        list.iter().map(|s| ts(s)).collect()
    }

    #[test]
    fn test_business_days_between_endpoints() {
        let range = RangeSpec::default()
            .start(ts("2020-01-01"))
            .end(ts("2020-01-10"))
            .generate()
            .unwrap();
        assert_eq!(
            collect(range),
            days(&[
                "2020-01-01",
                "2020-01-02",
                "2020-01-03",
                "2020-01-06",
                "2020-01-07",
                "2020-01-08",
                "2020-01-09",
                "2020-01-10",
            ])
        );
    }

    #[test]
    fn test_start_and_periods_rolls_start_forward() {
        let range = generate_range(
            Some(ts("2020-01-15")),
            None,
            Some(3),
            &MonthEnd::new(1).into(),
        )
        .unwrap();
        assert_eq!(
            collect(range),
            days(&["2020-01-31", "2020-02-29", "2020-03-31"])
        );
    }

    #[test]
    fn test_end_and_periods_rolls_end_back() {
        // 2020-01-12 is a Sunday.
        let range = RangeSpec::default()
            .end(ts("2020-01-12"))
            .periods(3)
            .generate()
            .unwrap();
        assert_eq!(
            collect(range),
            days(&["2020-01-08", "2020-01-09", "2020-01-10"])
        );
    }

    #[test]
    fn test_descending_from_start_and_periods() {
        let range = generate_range(
            Some(ts("2020-01-10")),
            None,
            Some(5),
            &BusinessDay::new(-1).into(),
        )
        .unwrap();
        assert_eq!(
            collect(range),
            days(&[
                "2020-01-10",
                "2020-01-09",
                "2020-01-08",
                "2020-01-07",
                "2020-01-06",
            ])
        );
    }

    #[test]
    fn test_descending_from_end_and_periods() {
        // With a negative offset the derived start lies after the end.
        let range = generate_range(
            None,
            Some(ts("2020-01-06")),
            Some(3),
            &BusinessDay::new(-1).into(),
        )
        .unwrap();
        assert_eq!(
            collect(range),
            days(&["2020-01-08", "2020-01-07", "2020-01-06"])
        );
    }

    #[test]
    fn test_descending_offset_with_start_after_end_is_empty() {
        let range = generate_range(
            Some(ts("2020-01-10")),
            Some(ts("2020-01-06")),
            None,
            &BusinessDay::new(-1).into(),
        )
        .unwrap();
        assert!(collect(range).is_empty());
    }

    #[test]
    fn test_end_before_start_is_empty() {
        let range = RangeSpec::default()
            .start(ts("2020-01-10"))
            .end(ts("2020-01-01"))
            .generate()
            .unwrap();
        assert!(collect(range).is_empty());
    }

    #[test]
    fn test_zero_and_one_periods() {
        let range = RangeSpec::default()
            .start(ts("2020-01-06"))
            .periods(0)
            .generate()
            .unwrap();
        assert!(collect(range).is_empty());

        // WeekOfMonth rejects n == 0, so one period must not scale by zero.
        let wom = WeekOfMonth::new(1, 0, 0).unwrap();
        let range = RangeSpec::default()
            .start(ts("2020-01-06"))
            .periods(1)
            .offset(wom.into())
            .generate()
            .unwrap();
        assert_eq!(collect(range), days(&["2020-01-06"]));
    }

    #[test]
    fn test_requires_two_arguments() {
        let err = RangeSpec::default()
            .start(ts("2020-01-01"))
            .generate()
            .unwrap_err();
        assert!(matches!(err, OffsetError::InvalidParameter(_)));

        let err = RangeSpec::default()
            .start(Timestamp::NAT)
            .periods(3)
            .generate()
            .unwrap_err();
        assert!(matches!(err, OffsetError::InvalidParameter(_)));
    }

    #[test]
    fn test_rejects_mixed_awareness() {
        let err = RangeSpec::default()
            .start(ts("2020-01-01"))
            .end(ts("2020-01-10 00:00 UTC"))
            .generate()
            .unwrap_err();
        assert!(matches!(err, OffsetError::InvalidParameter(_)));
    }

    #[test]
    fn test_non_monotonic_offset_stops() {
        let mut range = RangeSpec::default()
            .start(ts("2020-01-01"))
            .end(ts("2020-01-02"))
            .offset(Tick::second(0).into())
            .generate()
            .unwrap();
        assert_eq!(range.next().unwrap().unwrap(), ts("2020-01-01"));
        assert!(matches!(
            range.next(),
            Some(Err(OffsetError::NonMonotonic(_)))
        ));
        assert!(range.next().is_none());
    }

    #[test]
    fn test_timezone_aware_range() {
        let range = RangeSpec::default()
            .start(ts("2026-03-06 09:00 America/New_York"))
            .periods(2)
            .generate()
            .unwrap();
        let out = collect(range);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].to_string(), "2026-03-09 09:00:00-04:00");
    }
}
