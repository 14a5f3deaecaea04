use anyhow::Result;
use seqcal_core::models::Horizon;
use seqcal_core::schedule::schedule_tasks;

use super::{load_pages, write_output, RunContext};
use crate::cli::FeedCommand;
use crate::config::Config;
use crate::ical::tasks_calendar;

/// Calendar name of the task feed.
const TODO_CALENDAR: &str = "TODO";

pub fn todos_feed(config: &Config, command: FeedCommand) -> Result<()> {
    let run = RunContext::new(config, &command.run)?;
    let tasks: Vec<_> = load_pages(config, run.today, Horizon::Calendar)?
        .into_iter()
        .flat_map(|page| page.tasks)
        .collect();

    let events = schedule_tasks(&tasks);
    log::info!("Scheduled {} of {} task(s)", events.len(), tasks.len());

    let feed = run.feed(config, TODO_CALENDAR)?;
    write_output(command.output.as_deref(), &tasks_calendar(&events, &feed))
}
