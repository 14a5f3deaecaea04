//! One submodule per subcommand.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use seqcal_core::models::Horizon;
use seqcal_core::page::Page;
use seqcal_core::parser::TodoLineParser;
use seqcal_core::timezone::{format_rfc3339, get_timezone_offset, parse_timezone};
use std::fs;
use std::path::Path;

use crate::cli::RunOptions;
use crate::config::Config;
use crate::ical::FeedContext;
use crate::loader::{collect_tasks, load_notes};
use crate::parser::resolve_today;

pub mod appointments;
pub mod list;
pub mod overview;
pub mod todos;

/// Resolved once per run so every output shares one clock reading.
pub struct RunContext {
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
}

impl RunContext {
    pub fn new(config: &Config, options: &RunOptions) -> Result<Self> {
        let now = Utc::now();
        let today = resolve_today(options.today.as_deref(), &config.timezone, now)?;
        log::debug!(
            "Reference date is {} in {} (UTC{})",
            today,
            config.timezone,
            get_timezone_offset(&config.timezone, now)?
        );
        Ok(Self { now, today })
    }

    pub fn feed<'a>(&self, config: &'a Config, calendar_name: &'a str) -> Result<FeedContext<'a>> {
        Ok(FeedContext {
            calendar_name,
            timezone: parse_timezone(&config.timezone)?,
            organizer_name: &config.organizer_name,
            organizer_mail: &config.organizer_mail,
            now: self.now,
            last_pull: format_rfc3339(&config.timezone, self.now)?,
        })
    }
}

/// Reads the notes graph and parses its tasks for `horizon`.
pub fn load_pages(config: &Config, today: NaiveDate, horizon: Horizon) -> Result<Vec<Page>> {
    let notes = load_notes(&config.notes_dir)
        .with_context(|| format!("Failed to read notes from {}", config.notes_dir.display()))?;
    let parser = TodoLineParser::new(today, horizon);
    collect_tasks(&parser, &notes)
}

/// Writes to `output`, or stdout when none is given.
pub fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
