//! Command implementations. Each returns the text to print.

use anyhow::{Context, Result};
use offset_engine::{
    generate_range, BusinessHour, CustomBusinessDay, CustomBusinessHour, CustomBusinessMonthBegin,
    CustomBusinessMonthEnd, Offset, Timestamp,
};
use serde_json::json;

use crate::cli::Direction;
use crate::config::Config;

/// Parse a frequency string, falling back to the configured default, and
/// fill in the configured calendar and business hours where the code
/// takes them.
pub fn resolve_offset(freq: Option<&str>, config: &Config) -> Result<Offset> {
    let freq = freq.unwrap_or(&config.default_freq);
    let parsed =
        Offset::from_freqstr(freq).with_context(|| format!("invalid frequency '{freq}'"))?;
    let n = parsed.n();

    let offset: Offset = match parsed {
        Offset::CustomBusinessDay(c) => {
            CustomBusinessDay::new(n, config.calendar()?).with_offset(c.offset()).into()
        }
        Offset::CustomBusinessMonthEnd(_) => {
            CustomBusinessMonthEnd::new(n, config.calendar()?).into()
        }
        Offset::CustomBusinessMonthBegin(_) => {
            CustomBusinessMonthBegin::new(n, config.calendar()?).into()
        }
        Offset::BusinessHour(_) => {
            let (start, end) = config.business_hours()?;
            BusinessHour::with_hours(n, start, end)?.into()
        }
        Offset::CustomBusinessHour(_) => {
            let (start, end) = config.business_hours()?;
            CustomBusinessHour::with_hours(n, start, end, config.calendar()?)?.into()
        }
        other => other,
    };
    tracing::debug!(freq, %offset, "resolved frequency");
    Ok(offset)
}

pub fn parse_timestamp(s: &str) -> Result<Timestamp> {
    s.parse::<Timestamp>()
        .with_context(|| format!("invalid timestamp '{s}'"))
}

/// `timestamp + offset`.
pub fn apply(offset: &Offset, timestamp: &str, normalize: bool, as_json: bool) -> Result<String> {
    let offset = offset.with_normalize(normalize || offset.normalize())?;
    let input = parse_timestamp(timestamp)?;
    let result = offset
        .apply(input)
        .with_context(|| format!("failed to apply {offset} to {input}"))?;

    if as_json {
        Ok(json!({
            "offset": offset.freqstr(),
            "input": input.to_string(),
            "result": result.to_string(),
        })
        .to_string())
    } else {
        Ok(result.to_string())
    }
}

/// Roll a timestamp onto the offset in the given direction.
pub fn roll(
    offset: &Offset,
    timestamp: &str,
    direction: Direction,
    as_json: bool,
) -> Result<String> {
    let input = parse_timestamp(timestamp)?;
    let on_offset = offset.is_on_offset(&input);
    let result = match direction {
        Direction::Forward => offset.rollforward(input),
        Direction::Back => offset.rollback(input),
    }
    .with_context(|| format!("failed to roll {input} onto {offset}"))?;

    if as_json {
        Ok(json!({
            "offset": offset.freqstr(),
            "input": input.to_string(),
            "on_offset": on_offset,
            "result": result.to_string(),
        })
        .to_string())
    } else {
        Ok(result.to_string())
    }
}

/// Every date of the range, one per line or as a JSON array.
pub fn range(
    offset: &Offset,
    start: Option<&str>,
    end: Option<&str>,
    periods: Option<u64>,
    as_json: bool,
) -> Result<String> {
    let start = start.map(parse_timestamp).transpose()?;
    let end = end.map(parse_timestamp).transpose()?;
    let dates = generate_range(start, end, periods, offset)
        .context("invalid range arguments")?
        .map(|ts| ts.map(|ts| ts.to_string()))
        .collect::<Result<Vec<_>, _>>()
        .context("range generation stopped")?;

    if as_json {
        Ok(serde_json::to_string(&dates)?)
    } else {
        Ok(dates.join("\n"))
    }
}

/// Names, codes and the persisted form of an offset.
pub fn describe(offset: &Offset, as_json: bool) -> Result<String> {
    let rule_code = offset.rule_code();
    if as_json {
        return Ok(json!({
            "display": offset.to_string(),
            "freqstr": offset.freqstr(),
            "rule_code": rule_code,
            "n": offset.n(),
            "anchored": offset.is_anchored(),
            "definition": serde_json::to_value(offset)?,
        })
        .to_string());
    }

    let lines = [
        format!("offset:    {offset}"),
        format!("freqstr:   {}", offset.freqstr()),
        format!("rule code: {}", rule_code.as_deref().unwrap_or("-")),
        format!("n:         {}", offset.n()),
        format!("anchored:  {}", offset.is_anchored()),
    ];
    Ok(lines.join("\n"))
}
