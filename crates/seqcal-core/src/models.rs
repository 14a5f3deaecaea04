use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ============================================================================
// Appointments
// ============================================================================

/// A configured appointment rule, loaded once from the schedules directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub pattern: PatternId,
    pub calendar: String,
    #[serde(default)]
    pub stacked: bool,
    #[serde(default, deserialize_with = "deserialize_time_of_day")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "deserialize_time_of_day")]
    pub end_time: Option<NaiveTime>,
    /// Only meaningful for [`PatternId::Literal`]
    #[serde(default, rename = "date")]
    pub literal_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
}

impl Appointment {
    /// Checks the fields the pattern and stacking mode require.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.pattern == PatternId::Literal && self.literal_date.is_none() {
            return Err(CoreError::InvalidInput(format!(
                "appointment '{}' uses the literal pattern but has no date",
                self.title
            )));
        }
        if !self.stacked && (self.start_time.is_none() || self.end_time.is_none()) {
            return Err(CoreError::InvalidInput(format!(
                "appointment '{}' is not stacked and needs start_time and end_time",
                self.title
            )));
        }
        Ok(())
    }
}

/// Parses `HH:MM:SS` or `HH:MM`.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, CoreError> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| CoreError::InvalidTime(s.to_string()))
}

fn deserialize_time_of_day<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_time_of_day(&s).map_err(serde::de::Error::custom))
        .transpose()
}

/// Named date patterns an appointment can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "PatternLabel")]
pub enum PatternId {
    Literal,
    FirstOfMonth,
    SeventhBusinessDay,
    LastMonday,
    LastThursday,
    SecondFriday,
    SecondWednesday,
    EveryWeekday,
    MonThuSat,
    TueFri,
    WedSun,
    FriOnly,
    MonOnly,
    ThuOnly,
    SatOnly,
    SunOnly,
    QuarterlyJan,
    QuarterlyFeb,
    QuarterlyMar,
    NonThuCoffeeSlot,
    ThuCoffeeSlot,
    PseudoBimonthly,
}

impl PatternId {
    pub const ALL: [PatternId; 22] = [
        PatternId::Literal,
        PatternId::FirstOfMonth,
        PatternId::SeventhBusinessDay,
        PatternId::LastMonday,
        PatternId::LastThursday,
        PatternId::SecondFriday,
        PatternId::SecondWednesday,
        PatternId::EveryWeekday,
        PatternId::MonThuSat,
        PatternId::TueFri,
        PatternId::WedSun,
        PatternId::FriOnly,
        PatternId::MonOnly,
        PatternId::ThuOnly,
        PatternId::SatOnly,
        PatternId::SunOnly,
        PatternId::QuarterlyJan,
        PatternId::QuarterlyFeb,
        PatternId::QuarterlyMar,
        PatternId::NonThuCoffeeSlot,
        PatternId::ThuCoffeeSlot,
        PatternId::PseudoBimonthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternId::Literal => "literal",
            PatternId::FirstOfMonth => "first-of-month",
            PatternId::SeventhBusinessDay => "seventh-business-day",
            PatternId::LastMonday => "last-monday",
            PatternId::LastThursday => "last-thursday",
            PatternId::SecondFriday => "second-friday",
            PatternId::SecondWednesday => "second-wednesday",
            PatternId::EveryWeekday => "every-weekday",
            PatternId::MonThuSat => "mon-thu-sat",
            PatternId::TueFri => "tue-fri",
            PatternId::WedSun => "wed-sun",
            PatternId::FriOnly => "fri-only",
            PatternId::MonOnly => "mon-only",
            PatternId::ThuOnly => "thu-only",
            PatternId::SatOnly => "sat-only",
            PatternId::SunOnly => "sun-only",
            PatternId::QuarterlyJan => "quarterly-jan",
            PatternId::QuarterlyFeb => "quarterly-feb",
            PatternId::QuarterlyMar => "quarterly-mar",
            PatternId::NonThuCoffeeSlot => "non-thu-coffee-slot",
            PatternId::ThuCoffeeSlot => "thu-coffee-slot",
            PatternId::PseudoBimonthly => "pseudo-bimonthly",
        }
    }

    /// Maps the numeric labels used by older schedule files.
    /// Label 20 is a historical duplicate of 18.
    pub fn from_legacy(label: u8) -> Result<Self, CoreError> {
        let pattern = match label {
            0 => PatternId::Literal,
            1 => PatternId::FirstOfMonth,
            2 => PatternId::SeventhBusinessDay,
            3 => PatternId::LastMonday,
            4 => PatternId::LastThursday,
            5 => PatternId::SecondFriday,
            6 => PatternId::SecondWednesday,
            7 => PatternId::EveryWeekday,
            8 => PatternId::MonThuSat,
            9 => PatternId::TueFri,
            10 => PatternId::WedSun,
            11 => PatternId::FriOnly,
            12 => PatternId::MonOnly,
            13 => PatternId::ThuOnly,
            14 => PatternId::QuarterlyJan,
            15 => PatternId::NonThuCoffeeSlot,
            16 => PatternId::ThuCoffeeSlot,
            17 => PatternId::QuarterlyFeb,
            18 | 20 => PatternId::QuarterlyMar,
            19 => PatternId::PseudoBimonthly,
            21 => PatternId::SatOnly,
            22 => PatternId::SunOnly,
            _ => return Err(CoreError::InvalidPattern(label.to_string())),
        };
        Ok(pattern)
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if let Ok(label) = wanted.parse::<u8>() {
            return Self::from_legacy(label);
        }
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| CoreError::InvalidPattern(s.to_string()))
    }
}

/// Pattern as written in a schedule file: a name or a legacy number.
#[derive(Deserialize)]
#[serde(untagged)]
enum PatternLabel {
    Number(u8),
    Name(String),
}

impl TryFrom<PatternLabel> for PatternId {
    type Error = CoreError;

    fn try_from(label: PatternLabel) -> Result<Self, Self::Error> {
        match label {
            PatternLabel::Number(n) => PatternId::from_legacy(n),
            PatternLabel::Name(name) => name.parse(),
        }
    }
}

/// One concrete, timed instance of an [`Appointment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// First 16 hex characters of SHA-256 over `date-title`
    pub uid: String,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub calendar: String,
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::InvalidInput(format!(
                "window ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Appointment feed window: the first of the month `months_back` before
    /// `today`, through `months_ahead` months after `today`.
    pub fn around(today: NaiveDate, months_back: u32, months_ahead: u32) -> Self {
        let start = today
            .with_day(1)
            .and_then(|first| first.checked_sub_months(Months::new(months_back)))
            .unwrap_or(NaiveDate::MIN);
        let end = today
            .checked_add_months(Months::new(months_ahead))
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day of the window, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

// ============================================================================
// Tasks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityLevel {
    A,
    B,
    C,
    Later,
    None,
}

impl PriorityLevel {
    /// Numeric rank; lower sorts first.
    pub fn value(&self) -> u8 {
        match self {
            PriorityLevel::A => 10,
            PriorityLevel::B => 20,
            PriorityLevel::C => 30,
            PriorityLevel::Later => 50,
            PriorityLevel::None => 100,
        }
    }

    /// Badge letter for the explicit levels.
    pub fn letter(&self) -> Option<char> {
        match self {
            PriorityLevel::A => Some('A'),
            PriorityLevel::B => Some('B'),
            PriorityLevel::C => Some('C'),
            PriorityLevel::Later | PriorityLevel::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Ensure,
    FollowUp,
    Meet,
    Discuss,
    Track,
    GoTo,
    Bring,
    Get,
    Share,
    Unknown,
}

impl Keyword {
    /// Lead-in words in match order.
    pub const LEAD_INS: [Keyword; 9] = [
        Keyword::Ensure,
        Keyword::FollowUp,
        Keyword::Meet,
        Keyword::Discuss,
        Keyword::Track,
        Keyword::GoTo,
        Keyword::Bring,
        Keyword::Get,
        Keyword::Share,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Ensure => "Ensure",
            Keyword::FollowUp => "Follow up",
            Keyword::Meet => "Meet",
            Keyword::Discuss => "Discuss",
            Keyword::Track => "Track",
            Keyword::GoTo => "Go-to",
            Keyword::Bring => "Bring",
            Keyword::Get => "Get",
            Keyword::Share => "Share",
            Keyword::Unknown => "!!",
        }
    }

    /// The `Word:` form searched for in task text.
    pub fn marker(&self) -> String {
        format!("{}:", self.as_str())
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    Todo,
    Later,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Todo => write!(f, "TODO"),
            TaskKind::Later => write!(f, "LATER"),
        }
    }
}

/// A task extracted from a note line.
///
/// A repeating source line yields one `Task` per concrete date, each with
/// `repeating == true` and its own `scheduled` date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub page: String,
    pub text: String,
    pub keyword: Keyword,
    pub priority: PriorityLevel,
    pub scheduled: Option<NaiveDate>,
    pub repeating: bool,
    pub kind: TaskKind,
    /// Tagged `#5m`
    pub short: bool,
}

// ============================================================================
// Configuration
// ============================================================================

/// Constants behind the pseudo-bimonthly pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Day zero of every jitter schedule
    pub epoch: NaiveDate,
    /// Shortest period in days
    pub jitter_base: u32,
    /// Number of distinct periods above `jitter_base`
    pub jitter_span: u32,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            epoch: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or(NaiveDate::MIN),
            jitter_base: 60,
            jitter_span: 14,
        }
    }
}

/// How far ahead repeating tasks are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    /// Task calendar feed: one month
    Calendar,
    /// Task overview page: three months
    Overview,
}

impl Horizon {
    pub fn months(&self) -> u32 {
        match self {
            Horizon::Calendar => 1,
            Horizon::Overview => 3,
        }
    }

    /// Inclusive window starting at `today`.
    pub fn window_from(&self, today: NaiveDate) -> DateWindow {
        let end = today
            .checked_add_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MAX);
        DateWindow { start: today, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_matches_values() {
        let mut levels = vec![
            PriorityLevel::None,
            PriorityLevel::C,
            PriorityLevel::Later,
            PriorityLevel::A,
            PriorityLevel::B,
        ];
        levels.sort();
        let values: Vec<u8> = levels.iter().map(|p| p.value()).collect();
        assert_eq!(values, vec![10, 20, 30, 50, 100]);
    }

    #[test]
    fn test_pattern_names_round_trip() {
        for pattern in PatternId::ALL {
            assert_eq!(pattern.as_str().parse::<PatternId>().unwrap(), pattern);
        }
        assert!(matches!(
            "every-fortnight".parse::<PatternId>(),
            Err(CoreError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_legacy_labels() {
        assert_eq!(PatternId::from_legacy(0).unwrap(), PatternId::Literal);
        assert_eq!(PatternId::from_legacy(19).unwrap(), PatternId::PseudoBimonthly);
        assert_eq!(PatternId::from_legacy(20).unwrap(), PatternId::QuarterlyMar);
        assert_eq!(PatternId::from_legacy(22).unwrap(), PatternId::SunOnly);
        assert!(PatternId::from_legacy(23).is_err());
    }

    #[test]
    fn test_appointment_from_legacy_json() {
        let json = r#"{
            "title": "Koffie %coffee_slot",
            "description": "Slot op %dag",
            "pattern": 15,
            "calendar": "work",
            "stacked": false,
            "start_time": "09:30:00",
            "end_time": "10:00"
        }"#;
        let appointment: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appointment.pattern, PatternId::NonThuCoffeeSlot);
        assert_eq!(appointment.start_time, NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(appointment.end_time, NaiveTime::from_hms_opt(10, 0, 0));
        assert!(appointment.validate().is_ok());
    }

    #[test]
    fn test_appointment_with_named_pattern_and_date() {
        let json = r#"{
            "title": "Verjaardag",
            "pattern": "literal",
            "calendar": "home",
            "stacked": true,
            "date": "2024-05-03"
        }"#;
        let appointment: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appointment.literal_date, NaiveDate::from_ymd_opt(2024, 5, 3));
        assert!(appointment.validate().is_ok());
    }

    #[test]
    fn test_appointment_validation() {
        let json = r#"{"title": "x", "pattern": 0, "calendar": "c", "stacked": true}"#;
        let appointment: Appointment = serde_json::from_str(json).unwrap();
        assert!(matches!(appointment.validate(), Err(CoreError::InvalidInput(_))));

        let json = r#"{"title": "x", "pattern": 7, "calendar": "c", "stacked": false}"#;
        let appointment: Appointment = serde_json::from_str(json).unwrap();
        assert!(matches!(appointment.validate(), Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_appointment_bad_time_rejected() {
        let json = r#"{"title": "x", "pattern": 7, "calendar": "c", "start_time": "25:99"}"#;
        assert!(serde_json::from_str::<Appointment>(json).is_err());
    }

    #[test]
    fn test_window_days_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let window = DateWindow::new(start, end).unwrap();
        assert_eq!(window.days().count(), 4);
        assert!(DateWindow::new(end, start).is_err());
    }

    #[test]
    fn test_feed_window() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let window = DateWindow::around(today, 1, 4);
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
        assert!(window.contains(today));
    }

    #[test]
    fn test_horizon_windows() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            Horizon::Calendar.window_from(today).end,
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            Horizon::Overview.window_from(today).end,
            NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()
        );
    }
}
