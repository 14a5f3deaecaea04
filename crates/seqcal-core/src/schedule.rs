//! Turns appointment rules and parsed tasks into dated, timed entries.
//!
//! [`ScheduleEngine::generate_appointments`] walks a [`DateWindow`] day by
//! day and asks the [`DatePatternMatcher`] which appointments fire. Task
//! helpers group [`Task`] records for the overview and place dated tasks
//! into per-priority time blocks for the task feed.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::CoreError;
use crate::logging::{default_logger, Logger};
use crate::models::{
    Appointment, DateWindow, Occurrence, PatternConfig, PatternId, PriorityLevel, Task, TaskKind,
};
use crate::pattern::{coffee_slot, DatePatternMatcher};

/// Minutes each stacked appointment or task slot occupies.
pub const SLOT_MINUTES: i64 = 30;

const STACK_START: (u32, u32) = (6, 0);

/// First 16 hex characters of SHA-256 over `YYYY-MM-DD-text`.
pub fn stable_uid(date: NaiveDate, text: &str) -> String {
    let digest = Sha256::digest(format!("{}-{}", date.format("%Y-%m-%d"), text).as_bytes());
    let mut uid = hex::encode(digest);
    uid.truncate(16);
    uid
}

fn at(date: NaiveDate, (hour, minute): (u32, u32)) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN))
}

// ============================================================================
// Vocabulary
// ============================================================================

/// Month and weekday names used by `%month`, `%next_month` and `%dag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    months: [&'static str; 12],
    weekdays: [&'static str; 7],
}

impl Vocabulary {
    /// `months` starts at January, `weekdays` at Monday.
    pub fn new(months: [&'static str; 12], weekdays: [&'static str; 7]) -> Self {
        Self { months, weekdays }
    }

    pub fn dutch() -> Self {
        Self::new(
            [
                "januari",
                "februari",
                "maart",
                "april",
                "mei",
                "juni",
                "juli",
                "augustus",
                "september",
                "oktober",
                "november",
                "december",
            ],
            [
                "maandag", "dinsdag", "woensdag", "donderdag", "vrijdag", "zaterdag", "zondag",
            ],
        )
    }

    pub fn month_name(&self, date: NaiveDate) -> &'static str {
        self.months[date.month0() as usize]
    }

    pub fn weekday_name(&self, weekday: Weekday) -> &'static str {
        self.weekdays[weekday.num_days_from_monday() as usize]
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::dutch()
    }
}

// ============================================================================
// Appointments
// ============================================================================

pub struct ScheduleEngine {
    matcher: DatePatternMatcher,
    vocabulary: Vocabulary,
    logger: Arc<dyn Logger>,
}

impl ScheduleEngine {
    pub fn new(config: PatternConfig) -> Self {
        Self {
            matcher: DatePatternMatcher::new(config),
            vocabulary: Vocabulary::default(),
            logger: default_logger(),
        }
    }

    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn matcher(&self) -> &DatePatternMatcher {
        &self.matcher
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Every occurrence of the appointments belonging to `calendar_name`
    /// inside `window`, ordered by date and then by configuration order.
    ///
    /// Stacked appointments on one day take consecutive 30-minute slots
    /// from 06:00. The slot counter lives only for this call, so concurrent
    /// calls must not share state beyond `&self`.
    ///
    /// # Errors
    /// `UnknownCalendar` when no appointment names `calendar_name`, and
    /// `InvalidInput` when a selected appointment lacks the fields its
    /// pattern or stacking mode needs.
    pub fn generate_appointments(
        &self,
        appointments: &[Appointment],
        calendar_name: &str,
        window: DateWindow,
    ) -> Result<Vec<Occurrence>, CoreError> {
        let selected: Vec<&Appointment> = appointments
            .iter()
            .filter(|a| a.calendar == calendar_name)
            .collect();
        if selected.is_empty() {
            return Err(CoreError::UnknownCalendar(calendar_name.to_string()));
        }
        for appointment in &selected {
            appointment.validate()?;
        }
        self.logger.debug(&format!(
            "Evaluating {} appointment(s) for '{}' from {} to {}",
            selected.len(),
            calendar_name,
            window.start,
            window.end
        ));

        let mut slots: HashMap<NaiveDate, i64> = HashMap::new();
        let mut occurrences = Vec::new();
        for date in window.days() {
            for appointment in &selected {
                if !self.fires_on(appointment, date) {
                    continue;
                }
                let (start, end) = if appointment.stacked {
                    let slot = slots.entry(date).or_insert(0);
                    let start = at(date, STACK_START) + Duration::minutes(SLOT_MINUTES * *slot);
                    *slot += 1;
                    (start, start + Duration::minutes(SLOT_MINUTES))
                } else {
                    // validate() guarantees both times for unstacked entries
                    (
                        date.and_time(appointment.start_time.unwrap_or(NaiveTime::MIN)),
                        date.and_time(appointment.end_time.unwrap_or(NaiveTime::MIN)),
                    )
                };
                let title = self.substitute(date, &appointment.title);
                self.logger.debug(&format!("{date}: '{title}' at {}", start.time()));
                occurrences.push(Occurrence {
                    date,
                    start,
                    end,
                    uid: stable_uid(date, &title),
                    description: self.substitute(date, &appointment.description),
                    title,
                    location: appointment.location.clone(),
                    calendar: calendar_name.to_string(),
                });
            }
        }
        Ok(occurrences)
    }

    fn fires_on(&self, appointment: &Appointment, date: NaiveDate) -> bool {
        match appointment.pattern {
            PatternId::Literal => appointment.literal_date == Some(date),
            pattern => self.matcher.matches(date, pattern, &appointment.title),
        }
    }

    /// Replaces `%month`, `%year`, `%next_month`, `%next_year`, `%dag` and
    /// `%coffee_slot` with values for `date`. The next month is clamped, so
    /// January 31st refers to February.
    pub fn substitute(&self, date: NaiveDate, text: &str) -> String {
        let next = date.checked_add_months(Months::new(1)).unwrap_or(date);
        text.replace("%month", self.vocabulary.month_name(date))
            .replace("%year", &date.year().to_string())
            .replace("%next_month", self.vocabulary.month_name(next))
            .replace("%next_year", &next.year().to_string())
            .replace("%dag", self.vocabulary.weekday_name(date.weekday()))
            .replace("%coffee_slot", &coffee_slot(date).to_string())
    }
}

// ============================================================================
// Tasks
// ============================================================================

/// Tasks bucketed for the overview page.
///
/// LATER items always go to `later`; other `#5m` items to `short`; the rest
/// by date. Every bucket is sorted by priority, then page name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskAgenda {
    pub short: Vec<Task>,
    pub dateless: Vec<Task>,
    pub dated: BTreeMap<NaiveDate, Vec<Task>>,
    pub later: Vec<Task>,
}

impl TaskAgenda {
    pub fn len(&self) -> usize {
        self.short.len()
            + self.dateless.len()
            + self.later.len()
            + self.dated.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn group_tasks(tasks: impl IntoIterator<Item = Task>) -> TaskAgenda {
    let mut agenda = TaskAgenda::default();
    for task in tasks {
        match (task.kind, task.short, task.scheduled) {
            (TaskKind::Later, _, _) => agenda.later.push(task),
            (TaskKind::Todo, true, _) => agenda.short.push(task),
            (TaskKind::Todo, false, None) => agenda.dateless.push(task),
            (TaskKind::Todo, false, Some(date)) => agenda.dated.entry(date).or_default().push(task),
        }
    }
    sort_bucket(&mut agenda.short);
    sort_bucket(&mut agenda.dateless);
    sort_bucket(&mut agenda.later);
    agenda.dated.values_mut().for_each(sort_bucket);
    agenda
}

fn sort_bucket(tasks: &mut Vec<Task>) {
    tasks.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.page.cmp(&b.page)));
}

/// A dated task placed in the task calendar feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskEvent {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub uid: String,
    /// `[keyword] [page] text`
    pub summary: String,
    pub description: String,
    pub priority: PriorityLevel,
}

fn block_start(priority: PriorityLevel) -> (u32, u32) {
    match priority {
        PriorityLevel::A => (6, 0),
        PriorityLevel::B => (12, 0),
        PriorityLevel::C => (15, 0),
        PriorityLevel::Later | PriorityLevel::None => (17, 0),
    }
}

/// Places every dated task into its priority block; the n-th task of a
/// block on a day starts `n * 30` minutes after the block opens. Undated
/// tasks are skipped. Output is ordered by date, then input order.
pub fn schedule_tasks(tasks: &[Task]) -> Vec<TaskEvent> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        if let Some(date) = task.scheduled {
            by_date.entry(date).or_default().push(task);
        }
    }

    let mut events = Vec::new();
    for (date, day_tasks) in by_date {
        let mut used: HashMap<(u32, u32), i64> = HashMap::new();
        for task in day_tasks {
            let block = block_start(task.priority);
            let slot = used.entry(block).or_insert(0);
            let start = at(date, block) + Duration::minutes(SLOT_MINUTES * *slot);
            *slot += 1;
            events.push(TaskEvent {
                date,
                start,
                end: start + Duration::minutes(SLOT_MINUTES),
                uid: stable_uid(date, &task.text),
                summary: format!("[{}] [{}] {}", task.keyword, task.page, task.text),
                description: task.text.clone(),
                priority: task.priority,
            });
        }
    }
    events
}
