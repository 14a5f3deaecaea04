use chrono::{Days, Months, NaiveDate};
use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CadenceUnit {
    Week,
    Month,
}

impl CadenceUnit {
    pub fn from_letter(letter: char) -> Result<Self, CoreError> {
        match letter {
            'w' => Ok(CadenceUnit::Week),
            'm' => Ok(CadenceUnit::Month),
            other => Err(CoreError::InvalidCadence(format!("unsupported period \"{other}\""))),
        }
    }

    pub fn letter(&self) -> char {
        match self {
            CadenceUnit::Week => 'w',
            CadenceUnit::Month => 'm',
        }
    }
}

/// A repeat interval such as "every 2 weeks".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cadence {
    pub interval: u32,
    pub unit: CadenceUnit,
}

impl Cadence {
    pub fn new(interval: i64, unit: CadenceUnit) -> Result<Self, CoreError> {
        let interval = u32::try_from(interval)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                CoreError::InvalidCadence(format!("interval must be positive, got {interval}"))
            })?;
        Ok(Self { interval, unit })
    }

    /// Lazily yields `start`, `start + interval`, ... up to and including
    /// `window_end`.
    pub fn occurrences(&self, start: NaiveDate, window_end: NaiveDate) -> Occurrences {
        Occurrences {
            start,
            cadence: *self,
            window_end,
            step: 0,
            done: false,
        }
    }

    /// The `step`-th occurrence counted from `start`, or `None` past the
    /// end of the calendar. Months are clamped to the last day of shorter
    /// months, always measured from `start`.
    fn nth_after(&self, start: NaiveDate, step: u32) -> Option<NaiveDate> {
        let amount = step.checked_mul(self.interval)?;
        match self.unit {
            CadenceUnit::Week => start.checked_add_days(Days::new(u64::from(amount) * 7)),
            CadenceUnit::Month => start.checked_add_months(Months::new(amount)),
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.interval, self.unit.letter())
    }
}

/// Parses the compact token that follows a repeat marker, e.g. `1w` or `3m`.
impl FromStr for Cadence {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let digits_end = token
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| CoreError::InvalidCadence(format!("missing period in \"{token}\"")))?;
        if digits_end == 0 {
            return Err(CoreError::InvalidCadence(format!("missing count in \"{token}\"")));
        }
        let (count, rest) = token.split_at(digits_end);
        let mut letters = rest.chars();
        let unit = match (letters.next(), letters.next()) {
            (Some(letter), None) => CadenceUnit::from_letter(letter)?,
            _ => return Err(CoreError::InvalidCadence(format!("malformed token \"{token}\""))),
        };
        let interval: i64 = count
            .parse()
            .map_err(|_| CoreError::InvalidCadence(format!("count out of range in \"{token}\"")))?;
        Cadence::new(interval, unit)
    }
}

/// How a Logseq repeater re-arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatMarker {
    /// `++`: keep the original rhythm
    Cumulative,
    /// `.+`: count from completion
    FromCompletion,
}

impl RepeatMarker {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatMarker::Cumulative => "++",
            RepeatMarker::FromCompletion => ".+",
        }
    }

    /// Finds the marker in a timestamp body. `.+` wins when both appear.
    pub fn find_in(text: &str) -> Option<Self> {
        if text.contains(".+") {
            Some(RepeatMarker::FromCompletion)
        } else if text.contains("++") {
            Some(RepeatMarker::Cumulative)
        } else {
            None
        }
    }
}

/// A timestamp body split around its repeater, e.g.
/// `2024-03-04 Mon ++1w` into the date text and the cadence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeater<'a> {
    pub date_text: &'a str,
    pub marker: RepeatMarker,
    pub cadence: Cadence,
}

impl<'a> Repeater<'a> {
    pub fn parse(text: &'a str) -> Result<Option<Self>, CoreError> {
        let Some(marker) = RepeatMarker::find_in(text) else {
            return Ok(None);
        };
        let mut parts = text.splitn(3, marker.as_str());
        let date_text = parts.next().unwrap_or_default().trim();
        let token = parts.next().unwrap_or_default();
        let cadence = token.parse()?;
        Ok(Some(Self {
            date_text,
            marker,
            cadence,
        }))
    }
}

/// Expands a repeating date into every occurrence up to `window_end`.
///
/// No lower bound is applied; callers drop dates before "today" themselves.
pub fn expand(
    start: NaiveDate,
    interval: i64,
    unit: CadenceUnit,
    window_end: NaiveDate,
) -> Result<Occurrences, CoreError> {
    Ok(Cadence::new(interval, unit)?.occurrences(start, window_end))
}

/// Iterator returned by [`expand`] and [`Cadence::occurrences`].
#[derive(Debug, Clone)]
pub struct Occurrences {
    start: NaiveDate,
    cadence: Cadence,
    window_end: NaiveDate,
    step: u32,
    done: bool,
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cadence.nth_after(self.start, self.step) {
            Some(date) if date <= self.window_end => {
                self.step += 1;
                Some(date)
            }
            _ => {
                self.done = true;
                None
            }
        }
    }
}

impl FusedIterator for Occurrences {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_expand_two_weeks() {
        let dates: Vec<_> = expand(date(2024, 1, 1), 2, CadenceUnit::Week, date(2024, 2, 1))
            .unwrap()
            .collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 15), date(2024, 1, 29)]);
    }

    #[test]
    fn test_expand_months_clamps_from_start() {
        let dates: Vec<_> = expand(date(2024, 1, 31), 1, CadenceUnit::Month, date(2024, 5, 1))
            .unwrap()
            .collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]
        );
    }

    #[test]
    fn test_expand_includes_window_end() {
        let dates: Vec<_> = expand(date(2024, 1, 1), 1, CadenceUnit::Week, date(2024, 1, 8))
            .unwrap()
            .collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 8)]);
    }

    #[test]
    fn test_expand_window_before_start_is_empty() {
        let mut dates = expand(date(2024, 3, 1), 1, CadenceUnit::Week, date(2024, 2, 1)).unwrap();
        assert_eq!(dates.next(), None);
        assert_eq!(dates.next(), None);
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn test_expand_rejects_non_positive_interval(#[case] interval: i64) {
        let result = expand(date(2024, 1, 1), interval, CadenceUnit::Month, date(2024, 6, 1));
        assert!(matches!(result, Err(CoreError::InvalidCadence(_))));
    }

    #[test]
    fn test_expand_is_restartable() {
        let first: Vec<_> = expand(date(2024, 1, 1), 1, CadenceUnit::Month, date(2024, 12, 31))
            .unwrap()
            .collect();
        let second: Vec<_> = expand(date(2024, 1, 1), 1, CadenceUnit::Month, date(2024, 12, 31))
            .unwrap()
            .collect();
        assert_eq!(first.len(), 12);
        assert_eq!(first, second);
    }

    #[rstest]
    #[case("1w", 1, CadenceUnit::Week)]
    #[case("2m", 2, CadenceUnit::Month)]
    #[case(" 12w ", 12, CadenceUnit::Week)]
    fn test_cadence_token(#[case] token: &str, #[case] interval: u32, #[case] unit: CadenceUnit) {
        assert_eq!(token.parse::<Cadence>().unwrap(), Cadence { interval, unit });
    }

    #[rstest]
    #[case("")]
    #[case("w")]
    #[case("1")]
    #[case("0w")]
    #[case("1d")]
    #[case("1y")]
    #[case("1wk")]
    #[case("99999999999w")]
    fn test_cadence_token_rejected(#[case] token: &str) {
        assert!(matches!(token.parse::<Cadence>(), Err(CoreError::InvalidCadence(_))));
    }

    #[test]
    fn test_repeater_split() {
        let repeater = Repeater::parse("2024-03-04 Mon ++1w").unwrap().unwrap();
        assert_eq!(repeater.date_text, "2024-03-04 Mon");
        assert_eq!(repeater.marker, RepeatMarker::Cumulative);
        assert_eq!(repeater.cadence.to_string(), "1w");

        let repeater = Repeater::parse("2024-03-04 Mon .+2m").unwrap().unwrap();
        assert_eq!(repeater.marker, RepeatMarker::FromCompletion);
        assert_eq!(repeater.cadence, Cadence { interval: 2, unit: CadenceUnit::Month });

        assert_eq!(Repeater::parse("2024-03-04 Mon").unwrap(), None);
        assert!(Repeater::parse("2024-03-04 Mon ++1d").is_err());
    }

    proptest! {
        #[test]
        fn prop_weekly_occurrences_are_evenly_spaced(
            offset in 0i64..5000,
            interval in 1i64..6,
            span in 0i64..400,
        ) {
            let start = date(2015, 1, 1) + chrono::Duration::days(offset);
            let end = start + chrono::Duration::days(span);
            let dates: Vec<_> = expand(start, interval, CadenceUnit::Week, end).unwrap().collect();
            prop_assert_eq!(dates.first().copied(), Some(start));
            prop_assert!(dates.iter().all(|d| *d <= end));
            for pair in dates.windows(2) {
                prop_assert_eq!((pair[1] - pair[0]).num_days(), interval * 7);
            }
        }
    }
}
