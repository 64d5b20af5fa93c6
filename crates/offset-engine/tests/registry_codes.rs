//! Rule codes reconstruct the offsets that produced them.

use offset_engine::registry::prefixes;
use offset_engine::{
    from_name, BQuarterBegin, BYearEnd, BusinessDay, BusinessHour, DateOffset, Easter,
    LastWeekOfMonth, MonthBegin, Offset, OffsetError, SemiMonthEnd, Tick, TickUnit, Variation,
    Week, WeekOfMonth, FY5253Quarter, FY5253,
};

fn coded() -> Vec<Offset> {
    let mut out: Vec<Offset> = TickUnit::ALL
        .into_iter()
        .map(|unit| Tick::new(1, unit).into())
        .collect();
    out.extend([
        Offset::from(BusinessDay::new(1)),
        BusinessHour::new(1).into(),
        MonthBegin::new(1).into(),
        SemiMonthEnd::new(1, 5).unwrap().into(),
        Week::new(1).into(),
        Week::on(1, 0).unwrap().into(),
        WeekOfMonth::new(1, 1, 1).unwrap().into(),
        LastWeekOfMonth::new(1, 6).unwrap().into(),
        BQuarterBegin::with_starting_month(1, 11).unwrap().into(),
        BYearEnd::with_month(1, 6).unwrap().into(),
        FY5253::new(1, 4, 12, Variation::Nearest).unwrap().into(),
        FY5253Quarter::new(1, 0, 3, 4, Variation::Last).unwrap().into(),
        Easter::new(1).into(),
    ]);
    out
}

#[test]
fn test_rule_codes_round_trip() {
    for offset in coded() {
        let code = offset.rule_code().unwrap();
        assert_eq!(Offset::from_rule_code(&code).unwrap(), offset, "{code}");
    }
}

#[test]
fn test_freqstr_round_trip_with_multipliers() {
    for offset in coded() {
        for n in [2, -3, 12] {
            let scaled = offset.with_n(n).unwrap();
            let freq = scaled.freqstr();
            assert_eq!(Offset::from_freqstr(&freq).unwrap(), scaled, "{freq}");
        }
    }
}

#[test]
fn test_every_registered_prefix_is_an_offset_prefix() {
    for prefix in prefixes() {
        if let Ok(offset) = from_name(prefix, None) {
            assert_eq!(offset.prefix(), Some(prefix));
        }
    }
}

#[test]
fn test_known_codes() {
    let cases = [
        (Offset::from(Week::on(1, 0).unwrap()), "W-MON"),
        (WeekOfMonth::new(1, 1, 1).unwrap().into(), "WOM-2TUE"),
        (SemiMonthEnd::new(1, 15).unwrap().into(), "SM-15"),
        (
            FY5253::new(1, 4, 12, Variation::Nearest).unwrap().into(),
            "RE-N-DEC-FRI",
        ),
        (
            FY5253Quarter::new(1, 4, 12, 1, Variation::Nearest)
                .unwrap()
                .into(),
            "REQ-N-DEC-FRI-1",
        ),
    ];
    for (offset, code) in cases {
        assert_eq!(offset.rule_code().as_deref(), Some(code));
    }
}

#[test]
fn test_date_offset_has_no_code() {
    let offset = Offset::from(DateOffset::days(1));
    assert_eq!(offset.rule_code(), None);
    assert_eq!(offset.prefix(), None);
}

#[test]
fn test_bad_codes() {
    assert!(matches!(
        Offset::from_rule_code("Q-FOO"),
        Err(OffsetError::InvalidParameter(_))
    ));
    assert!(matches!(
        Offset::from_rule_code("ZZ"),
        Err(OffsetError::UnknownPrefix(_))
    ));
}
