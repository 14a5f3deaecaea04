use anyhow::{Context, Result};
use seqcal_core::models::Horizon;
use seqcal_core::page::TagDivision;
use seqcal_core::schedule::{group_tasks, Vocabulary};

use super::{load_pages, write_output, RunContext};
use crate::cli::FeedCommand;
use crate::config::Config;
use crate::html::render_overview;

pub fn overview_page(config: &Config, command: FeedCommand) -> Result<()> {
    let run = RunContext::new(config, &command.run)?;
    let division: TagDivision = config
        .tag_division
        .parse()
        .context("Invalid tag_division in configuration")?;

    let pages = load_pages(config, run.today, Horizon::Overview)?;
    let agenda = group_tasks(pages.iter().flat_map(|page| page.tasks.iter().cloned()));
    let buckets = division.classify(pages);
    log::info!("{} task(s) over {} bucket(s)", agenda.len(), buckets.len());

    let html = render_overview(&agenda, &buckets, &Vocabulary::default());
    write_output(command.output.as_deref(), &html)
}
