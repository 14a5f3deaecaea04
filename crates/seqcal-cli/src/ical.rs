//! iCalendar rendering of appointment occurrences and scheduled tasks.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, Event, EventLike, Property};
use seqcal_core::models::Occurrence;
use seqcal_core::schedule::TaskEvent;
use seqcal_core::timezone::local_to_utc;

/// Written into every description block so subscribers can tell feeds apart.
pub const FEED_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How often subscribing clients should refresh.
const PUBLISHED_TTL: &str = "PT1H";

/// Feed-wide values shared by every entry.
///
/// Entry times are local to `timezone` and written as UTC instants, so the
/// feed needs no VTIMEZONE definitions.
#[derive(Debug, Clone)]
pub struct FeedContext<'a> {
    pub calendar_name: &'a str,
    pub timezone: Tz,
    pub organizer_name: &'a str,
    pub organizer_mail: &'a str,
    /// Stamped as DTSTAMP and "Last pull"
    pub now: DateTime<Utc>,
    /// `now` rendered in the feed timezone
    pub last_pull: String,
}

impl FeedContext<'_> {
    fn calendar(&self) -> Calendar {
        let mut calendar = Calendar::new();
        calendar.append_property(Property::new("X-WR-CALNAME", self.calendar_name));
        calendar.append_property(Property::new("X-WR-TIMEZONE", self.timezone.name()));
        calendar.append_property(Property::new("X-PUBLISHED-TTL", PUBLISHED_TTL));
        calendar
    }

    fn utc_time(&self, key: &str, local: NaiveDateTime) -> Property {
        let at = local_to_utc(self.timezone, local);
        Property::new(key, &at.format("%Y%m%dT%H%M%SZ").to_string())
    }

    fn organizer(&self) -> Property {
        let mut prop = Property::new("ORGANIZER", &format!("mailto:{}", self.organizer_mail));
        prop.add_parameter("CN", self.organizer_name);
        prop
    }

    fn event(&self, uid: &str, summary: &str, start: NaiveDateTime, end: NaiveDateTime) -> Event {
        let mut event = Event::new();
        event
            .uid(uid)
            .summary(summary)
            .timestamp(self.now)
            .append_property(self.utc_time("DTSTART", start))
            .append_property(self.utc_time("DTEND", end))
            .append_property(self.organizer())
            .add_property("TRANSP", "TRANSPARENT");
        event
    }

    /// `Agenda/Title/Description/Last pull/Version`, CRLF separated.
    pub fn description_block(&self, title: &str, description: &str) -> String {
        format!(
            "Agenda: {}\r\nTitle: {}\r\nDescription: {}\r\nLast pull: {}\r\nVersion: {}",
            self.calendar_name, title, description, self.last_pull, FEED_VERSION
        )
    }
}

pub fn appointments_calendar(occurrences: &[Occurrence], context: &FeedContext) -> String {
    let mut calendar = context.calendar();
    for occurrence in occurrences {
        let mut event = context.event(
            &occurrence.uid,
            &occurrence.title,
            occurrence.start,
            occurrence.end,
        );
        event.description(&context.description_block(&occurrence.title, &occurrence.description));
        if let Some(location) = &occurrence.location {
            event.location(location);
        }
        calendar.push(event);
    }
    calendar.to_string()
}

pub fn tasks_calendar(events: &[TaskEvent], context: &FeedContext) -> String {
    let mut calendar = context.calendar();
    for task in events {
        let mut event = context.event(&task.uid, &task.summary, task.start, task.end);
        event.description(&task.description);
        calendar.push(event);
    }
    calendar.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn context() -> FeedContext<'static> {
        FeedContext {
            calendar_name: "work",
            timezone: chrono_tz::Europe::Amsterdam,
            organizer_name: "Planner",
            organizer_mail: "planner@example.org",
            now: DateTime::parse_from_rfc3339("2024-03-01T08:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            last_pull: "2024-03-01T09:00:00+01:00".to_string(),
        }
    }

    fn occurrence() -> Occurrence {
        let date = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        Occurrence {
            date,
            start: date.and_hms_opt(6, 0, 0).unwrap(),
            end: date.and_hms_opt(6, 30, 0).unwrap(),
            uid: "0123456789abcdef".to_string(),
            title: "Review maart".to_string(),
            description: "Monthly".to_string(),
            location: Some("Kantoor".to_string()),
            calendar: "work".to_string(),
        }
    }

    #[test]
    fn test_appointment_feed_properties() {
        let ics = appointments_calendar(&[occurrence()], &context());
        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert!(ics.contains("X-WR-CALNAME:work"));
        assert!(ics.contains("X-WR-TIMEZONE:Europe/Amsterdam"));
        assert!(ics.contains("X-PUBLISHED-TTL:PT1H"));
        assert!(ics.contains("UID:0123456789abcdef"));
        assert!(ics.contains("SUMMARY:Review maart"));
        assert!(ics.contains("DTSTART:20240308T050000Z"));
        assert!(ics.contains("DTEND:20240308T053000Z"));
        assert!(ics.contains("LOCATION:Kantoor"));
        assert!(ics.contains("TRANSP:TRANSPARENT"));
        assert!(ics.contains("mailto:planner@example.org"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    }

    #[test]
    fn test_feed_defines_every_time_it_uses() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let event = TaskEvent {
            date,
            start: date.and_hms_opt(17, 0, 0).unwrap(),
            end: date.and_hms_opt(17, 30, 0).unwrap(),
            uid: "fedcba9876543210".to_string(),
            summary: "[Meet] [acme] Anna".to_string(),
            description: "Anna".to_string(),
            priority: seqcal_core::models::PriorityLevel::None,
        };
        let ics = tasks_calendar(&[event], &context())
            + &appointments_calendar(&[occurrence()], &context());
        // No TZID reference without a VTIMEZONE to resolve it
        assert!(!ics.contains("TZID="));
        assert!(!ics.contains("BEGIN:VTIMEZONE"));
        assert!(ics.contains("DTSTART:20240701T150000Z"));
        assert!(ics.contains("DTEND:20240701T153000Z"));
        for line in ics.lines().filter(|l| l.starts_with("DTSTART") || l.starts_with("DTEND")) {
            assert!(line.ends_with('Z'), "{line}");
        }
    }

    #[test]
    fn test_description_block() {
        let block = context().description_block("Review maart", "Monthly");
        assert_eq!(
            block,
            format!(
                "Agenda: work\r\nTitle: Review maart\r\nDescription: Monthly\r\nLast pull: 2024-03-01T09:00:00+01:00\r\nVersion: {}",
                FEED_VERSION
            )
        );
    }

    #[test]
    fn test_output_is_stable_for_fixed_now() {
        let first = appointments_calendar(&[occurrence()], &context());
        let second = appointments_calendar(&[occurrence()], &context());
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_task_feed_is_still_a_calendar() {
        let ics = tasks_calendar(&[], &context());
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("END:VCALENDAR"));
        assert!(!ics.contains("BEGIN:VEVENT"));
    }
}
