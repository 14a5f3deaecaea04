use anyhow::{Context, Result};
use seqcal_core::models::DateWindow;
use seqcal_core::schedule::ScheduleEngine;

use super::{write_output, RunContext};
use crate::cli::AppointmentsCommand;
use crate::config::Config;
use crate::ical::appointments_calendar;
use crate::loader::load_appointments;

pub fn appointments_feed(config: &Config, command: AppointmentsCommand) -> Result<()> {
    let run = RunContext::new(config, &command.run)?;
    let appointments = load_appointments(&config.schedules_dir).with_context(|| {
        format!("Failed to load appointments from {}", config.schedules_dir.display())
    })?;

    let window = DateWindow::around(
        run.today,
        config.window.months_back,
        config.window.months_ahead,
    );
    let engine = ScheduleEngine::new(config.patterns.clone());
    let occurrences = engine.generate_appointments(&appointments, &command.calendar, window)?;
    log::info!(
        "{} occurrence(s) for '{}' between {} and {}",
        occurrences.len(),
        command.calendar,
        window.start,
        window.end
    );

    let feed = run.feed(config, &command.calendar)?;
    write_output(command.output.as_deref(), &appointments_calendar(&occurrences, &feed))
}
