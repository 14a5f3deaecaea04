use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_english::{parse_date_string, Dialect};
use seqcal_core::timezone::{parse_timezone, today_in};

/// Resolves the reference day for a run.
///
/// Without `--today` this is the current date in `timezone`. With it, the
/// text is read as a date (`2024-03-01`, `tomorrow`, `next friday`)
/// relative to `now` in that zone.
pub fn resolve_today(input: Option<&str>, timezone: &str, now: DateTime<Utc>) -> Result<NaiveDate> {
    let Some(text) = input else {
        return Ok(today_in(timezone, now)?);
    };
    if let Ok(date) = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d") {
        return Ok(date);
    }
    let tz = parse_timezone(timezone)?;
    let parsed = parse_date_string(text, now.with_timezone(&tz), Dialect::Uk)
        .map_err(|e| anyhow::anyhow!("Failed to parse date '{}': {}", text, e))?;
    Ok(parsed.date_naive())
}
