use anyhow::Result;
use seqcal_core::models::Horizon;
use seqcal_core::schedule::group_tasks;

use super::{load_pages, RunContext};
use crate::cli::ListCommand;
use crate::config::Config;
use crate::views::table::{display_tasks, ViewTask};

/// Tasks in overview order: short, undated, by date, LATER.
pub fn list_tasks(config: &Config, command: ListCommand) -> Result<()> {
    let run = RunContext::new(config, &command.run)?;
    let tasks = load_pages(config, run.today, Horizon::Overview)?
        .into_iter()
        .filter(|page| command.page.as_ref().map_or(true, |name| &page.title == name))
        .flat_map(|page| page.tasks);

    let agenda = group_tasks(tasks);
    let view_tasks: Vec<ViewTask> = agenda
        .short
        .iter()
        .chain(&agenda.dateless)
        .chain(agenda.dated.values().flatten())
        .chain(&agenda.later)
        .map(ViewTask::from)
        .collect();

    display_tasks(&view_tasks, run.today);
    Ok(())
}
