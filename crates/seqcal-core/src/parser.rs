use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::sync::Arc;

use crate::error::CoreError;
use crate::logging::{default_logger, Logger};
use crate::models::{Horizon, Keyword, PriorityLevel, Task, TaskKind};
use crate::recurrence::Repeater;

/// Tokens removed from task text before display.
const NOISE_TOKENS: [&str; 8] = [
    "- TODO", "- LATER", "#ready", "#nodate", "#5m", "[#A]", "[#B]", "[#C]",
];

const SHORT_TAG: &str = "#5m";

/// Turns the text of one Logseq list item into [`Task`] records.
///
/// `today` and the [`Horizon`] bound the dates a repeating item expands
/// to; both are fixed at construction so parsing stays deterministic.
pub struct TodoLineParser {
    today: NaiveDate,
    horizon: Horizon,
    logger: Arc<dyn Logger>,
}

impl TodoLineParser {
    pub fn new(today: NaiveDate, horizon: Horizon) -> Self {
        Self {
            today,
            horizon,
            logger: default_logger(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Parses a raw item, possibly spanning several lines.
    ///
    /// A single line gives one undated task. Several lines without a
    /// repeater give one task dated by its SCHEDULED or DEADLINE line,
    /// whichever comes last. A SCHEDULED line carrying `++` or `.+` gives
    /// one task per occurrence between today and the horizon.
    ///
    /// # Errors
    /// `UnparseableDate` for a malformed timestamp and `InvalidCadence` for
    /// a malformed repeat token. Both abort the caller's run.
    pub fn parse(&self, raw_line: &str, page: &str) -> Result<Vec<Task>, CoreError> {
        let lines: Vec<&str> = raw_line
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let joined = lines.join("\n");
        let tasks = match lines.as_slice() {
            [] => Vec::new(),
            [single] => vec![parse_single(single, page, &joined)],
            [first, ..] => match repeating_timestamp(&lines) {
                Some(body) => self.parse_repeating(first, body, page, &joined)?,
                None => vec![parse_complex(&lines, page, &joined)?],
            },
        };
        self.logger.debug(&format!(
            "Parsed {} task(s) from a {}-line item on page '{}'",
            tasks.len(),
            lines.len(),
            page
        ));
        Ok(tasks)
    }

    fn parse_repeating(
        &self,
        first: &str,
        body: &str,
        page: &str,
        item: &str,
    ) -> Result<Vec<Task>, CoreError> {
        let cleaned = clean_timestamp(body);
        let repeater = Repeater::parse(&cleaned)?
            .ok_or_else(|| CoreError::InvalidCadence(format!("no repeater in \"{body}\"")))?;
        let start = parse_date(repeater.date_text)?;
        let window = self.horizon.window_from(self.today);
        let template = parse_single(first, page, item);

        let tasks: Vec<Task> = repeater
            .cadence
            .occurrences(start, window.end)
            .filter(|date| *date >= self.today)
            .map(|date| Task {
                scheduled: Some(date),
                repeating: true,
                ..template.clone()
            })
            .collect();
        if tasks.is_empty() {
            self.logger.debug(&format!(
                "Repeating item on page '{page}' has no occurrence before {}",
                window.end
            ));
        }
        Ok(tasks)
    }
}

/// `item` is the whole trimmed item; markers anywhere in it count.
fn parse_single(line: &str, page: &str, item: &str) -> Task {
    let kind = if line.starts_with("LATER") {
        TaskKind::Later
    } else {
        TaskKind::Todo
    };
    let keyword = keyword_of(line);
    let mut text = filter_text(line);
    if keyword != Keyword::Unknown {
        text = text.replace(&keyword.marker(), "").trim().to_string();
    }
    Task {
        page: page.to_string(),
        text,
        keyword,
        priority: priority_of(item),
        scheduled: None,
        repeating: false,
        kind,
        short: item.contains(SHORT_TAG),
    }
}

fn parse_complex(lines: &[&str], page: &str, item: &str) -> Result<Task, CoreError> {
    let mut task = parse_single(lines.first().copied().unwrap_or_default(), page, item);
    for line in lines {
        if line.starts_with("TODO") || line.starts_with("LATER") {
            let scheduled = task.scheduled;
            task = parse_single(line, page, item);
            task.scheduled = scheduled;
        } else if let Some(body) = line.strip_prefix("SCHEDULED") {
            task.scheduled = Some(parse_timestamp(body)?);
        } else if let Some(body) = line.strip_prefix("DEADLINE") {
            // Last timestamp line wins
            task.scheduled = Some(parse_timestamp(body)?);
        }
    }
    Ok(task)
}

/// Body of the first SCHEDULED line that carries a repeater.
fn repeating_timestamp<'a>(lines: &[&'a str]) -> Option<&'a str> {
    lines.iter().copied().find_map(|line| {
        line.strip_prefix("SCHEDULED")
            .filter(|body| body.contains("++") || body.contains(".+"))
    })
}

/// Parses `: <2024-03-04 Mon>`, tolerating a trailing repeater.
fn parse_timestamp(body: &str) -> Result<NaiveDate, CoreError> {
    let cleaned = clean_timestamp(body);
    match Repeater::parse(&cleaned)? {
        Some(repeater) => parse_date(repeater.date_text),
        None => parse_date(&cleaned),
    }
}

fn clean_timestamp(body: &str) -> String {
    body.trim_start_matches(':')
        .replace(['<', '>'], "")
        .trim()
        .to_string()
}

/// Parses `YYYY-MM-DD Ddd`.
///
/// A weekday that disagrees with the date moves it forward to the next
/// such weekday, so `2024-03-05 Mon` reads as 2024-03-11.
pub fn parse_date(text: &str) -> Result<NaiveDate, CoreError> {
    let text = text.trim().trim_start_matches(':').replace(['<', '>'], "");
    let text = text.trim();
    let unparseable = || CoreError::UnparseableDate(text.to_string());

    let mut tokens = text.split_whitespace();
    let (Some(day), Some(weekday), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(unparseable());
    };
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| unparseable())?;
    let weekday: Weekday = weekday.parse().map_err(|_| unparseable())?;

    let ahead = (7 + weekday.num_days_from_monday() - date.weekday().num_days_from_monday()) % 7;
    date.checked_add_days(Days::new(u64::from(ahead))).ok_or_else(unparseable)
}

/// First `[#X]` marker in A, B, C order; LATER items default to
/// [`PriorityLevel::Later`].
pub fn priority_of(line: &str) -> PriorityLevel {
    if line.contains("[#A]") {
        PriorityLevel::A
    } else if line.contains("[#B]") {
        PriorityLevel::B
    } else if line.contains("[#C]") {
        PriorityLevel::C
    } else if line.starts_with("LATER") {
        PriorityLevel::Later
    } else {
        PriorityLevel::None
    }
}

/// First lead-in word, in fixed vocabulary order, followed by a colon.
pub fn keyword_of(line: &str) -> Keyword {
    Keyword::LEAD_INS
        .into_iter()
        .find(|k| line.contains(&k.marker()))
        .unwrap_or(Keyword::Unknown)
}

/// Strips the item keyword and Logseq noise from a line.
pub fn filter_text(line: &str) -> String {
    let line = line
        .strip_prefix("LATER ")
        .or_else(|| line.strip_prefix("TODO "))
        .unwrap_or(line);
    NOISE_TOKENS
        .iter()
        .fold(line.to_string(), |text, token| text.replace(token, ""))
        .trim()
        .to_string()
}
