use chrono::{Datelike, Months, NaiveDate, Weekday};
use sha2::{Digest, Sha256};

use crate::models::{PatternConfig, PatternId};

/// Decides whether a [`PatternId`] fires on a given day.
///
/// Pure: the answer depends only on the date, the pattern, the title (for
/// the pseudo-bimonthly jitter) and the [`PatternConfig`] given at
/// construction.
#[derive(Debug, Clone, Default)]
pub struct DatePatternMatcher {
    config: PatternConfig,
}

impl DatePatternMatcher {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(PatternConfig::default())
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Returns whether `pattern` fires on `date`.
    ///
    /// [`PatternId::Literal`] never matches here; literal appointments are
    /// compared against their stored date by the caller.
    pub fn matches(&self, date: NaiveDate, pattern: PatternId, title: &str) -> bool {
        let weekday = date.weekday();
        let day = date.day();
        match pattern {
            PatternId::Literal => false,
            PatternId::FirstOfMonth => day == 1,
            PatternId::SeventhBusinessDay => {
                (day == 5 && weekday == Weekday::Fri)
                    || (day == 6 && weekday == Weekday::Fri)
                    || (day == 7 && !is_weekend(weekday))
            }
            PatternId::LastMonday => weekday == Weekday::Mon && days_in_month(date) - day <= 6,
            PatternId::LastThursday => weekday == Weekday::Thu && days_in_month(date) - day <= 6,
            PatternId::SecondFriday => nth_weekday_of_month(date, Weekday::Fri, 2) == Some(date),
            PatternId::SecondWednesday => {
                nth_weekday_of_month(date, Weekday::Wed, 2) == Some(date)
            }
            PatternId::EveryWeekday => !is_weekend(weekday),
            PatternId::MonThuSat => {
                matches!(weekday, Weekday::Mon | Weekday::Thu | Weekday::Sat)
            }
            PatternId::TueFri => matches!(weekday, Weekday::Tue | Weekday::Fri),
            PatternId::WedSun => matches!(weekday, Weekday::Wed | Weekday::Sun),
            PatternId::FriOnly => weekday == Weekday::Fri,
            PatternId::MonOnly => weekday == Weekday::Mon,
            PatternId::ThuOnly => weekday == Weekday::Thu,
            PatternId::SatOnly => weekday == Weekday::Sat,
            PatternId::SunOnly => weekday == Weekday::Sun,
            PatternId::QuarterlyJan => day == 1 && matches!(date.month(), 1 | 4 | 7 | 10),
            PatternId::QuarterlyFeb => day == 1 && matches!(date.month(), 2 | 5 | 8 | 11),
            PatternId::QuarterlyMar => day == 1 && matches!(date.month(), 3 | 6 | 9 | 12),
            PatternId::NonThuCoffeeSlot => {
                weekday != Weekday::Thu && !is_weekend(weekday) && coffee_slot(date) != 0
            }
            PatternId::ThuCoffeeSlot => weekday == Weekday::Thu && coffee_slot(date) != 0,
            PatternId::PseudoBimonthly => {
                let period = i64::from(self.jitter_period(title).max(1));
                let elapsed = (date - self.config.epoch).num_days().abs();
                elapsed % period == 0
            }
        }
    }

    /// Days between pseudo-bimonthly occurrences for `title`.
    ///
    /// Derived from the first character of the lowercase hex SHA-256 digest
    /// of the title, so existing schedules keep their dates.
    pub fn jitter_period(&self, title: &str) -> u32 {
        let digest = hex::encode(Sha256::digest(title.as_bytes()));
        let seed = u32::from(digest.as_bytes()[0]);
        match self.config.jitter_span {
            0 => self.config.jitter_base,
            span => self.config.jitter_base + seed % span,
        }
    }
}

/// Rotating slot id for Monday to Thursday, cycling every four ISO weeks.
///
/// Monday yields 1-4, Tuesday 5-8, Wednesday 9-12, Thursday 13-16 and every
/// other day 0.
pub fn coffee_slot(date: NaiveDate) -> u32 {
    let base = match date.weekday() {
        Weekday::Mon => 1,
        Weekday::Tue => 5,
        Weekday::Wed => 9,
        Weekday::Thu => 13,
        Weekday::Fri | Weekday::Sat | Weekday::Sun => return 0,
    };
    (date.iso_week().week() - 1) % 4 + base
}

/// The `n`-th `weekday` in the month of `date`.
pub fn nth_weekday_of_month(date: NaiveDate, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    let offset = (7 + weekday.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    let day = 1 + offset + 7 * n.checked_sub(1)?;
    first.with_day(day)
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .map_or(31, |last| last.day())
}

fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}
