use crate::error::CoreError;
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Parse an IANA timezone name
pub fn parse_timezone(timezone: &str) -> Result<Tz, CoreError> {
    Tz::from_str(timezone)
        .map_err(|_| CoreError::InvalidTimezone(format!("Invalid timezone: {}", timezone)))
}

/// Validate IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<(), CoreError> {
    parse_timezone(timezone).map(|_| ())
}

/// The calendar date `now` falls on in `timezone`.
///
/// "Today" is always derived from an injected instant so callers and tests
/// control the clock.
pub fn today_in(timezone: &str, now: DateTime<Utc>) -> Result<NaiveDate, CoreError> {
    Ok(now.with_timezone(&parse_timezone(timezone)?).date_naive())
}

/// RFC 3339 rendering of `now` in `timezone`, e.g. for a "last pull" stamp.
pub fn format_rfc3339(timezone: &str, now: DateTime<Utc>) -> Result<String, CoreError> {
    Ok(now.with_timezone(&parse_timezone(timezone)?).to_rfc3339())
}

/// Get timezone offset string for display (e.g., "+01:00")
pub fn get_timezone_offset(timezone: &str, at_time: DateTime<Utc>) -> Result<String, CoreError> {
    let local_dt = at_time.with_timezone(&parse_timezone(timezone)?);
    Ok(format!("{}", local_dt.format("%:z")))
}

/// The instant a wall-clock time in `tz` refers to.
///
/// A repeated hour resolves to its first instant. A time skipped by a
/// forward transition is read with the offset in force the day before.
pub fn local_to_utc(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let before = tz.offset_from_utc_datetime(&(local - Duration::days(1))).fix();
            let utc = local - Duration::seconds(i64::from(before.local_minus_utc()));
            Utc.from_utc_datetime(&utc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("UTC").is_ok());
        assert!(validate_timezone("Europe/Amsterdam").is_ok());
        assert!(matches!(
            validate_timezone("Invalid/Timezone"),
            Err(CoreError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_today_crosses_midnight() {
        let now = instant("2024-03-01T23:30:00Z");
        assert_eq!(today_in("UTC", now).unwrap(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(
            today_in("Europe/Amsterdam", now).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
    }

    #[test]
    fn test_timezone_offset() {
        assert_eq!(get_timezone_offset("UTC", instant("2024-07-01T12:00:00Z")).unwrap(), "+00:00");
        assert_eq!(
            get_timezone_offset("Europe/Amsterdam", instant("2024-07-01T12:00:00Z")).unwrap(),
            "+02:00"
        );
    }

    #[test]
    fn test_format_rfc3339() {
        let stamp = format_rfc3339("Europe/Amsterdam", instant("2024-01-15T08:00:00Z")).unwrap();
        assert_eq!(stamp, "2024-01-15T09:00:00+01:00");
    }

    #[rstest]
    #[case("2024-03-08T06:00:00", "2024-03-08T05:00:00Z")]
    #[case("2024-07-01T06:00:00", "2024-07-01T04:00:00Z")]
    // Skipped hour on 2024-03-31
    #[case("2024-03-31T02:30:00", "2024-03-31T01:30:00Z")]
    // Repeated hour on 2024-10-27
    #[case("2024-10-27T02:30:00", "2024-10-27T00:30:00Z")]
    fn test_local_to_utc(#[case] local: &str, #[case] expected: &str) {
        let tz = parse_timezone("Europe/Amsterdam").unwrap();
        let local: NaiveDateTime = local.parse().unwrap();
        assert_eq!(local_to_utc(tz, local), instant(expected));
    }
}
