use anyhow::Context;
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use seqcal_core::error::CoreError;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};

mod cli;
mod commands;
mod config;
mod html;
mod ical;
mod loader;
mod parser;
mod timezone;
mod views;

fn main() {
    let cli = cli::Cli::parse();
    if let Err(e) = run(cli) {
        handle_error(e);
        std::process::exit(1);
    }
}

fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let config =
        config::Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let level = if cli.verbose { LevelFilter::Debug } else { config.log_level() };
    // Only fails when a logger is already installed.
    let _ = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
    config.validate()?;

    match cli.command {
        cli::Commands::Appointments(command) => {
            commands::appointments::appointments_feed(&config, command)
        }
        cli::Commands::Todos(command) => commands::todos::todos_feed(&config, command),
        cli::Commands::Overview(command) => commands::overview::overview_page(&config, command),
        cli::Commands::List(command) => commands::list::list_tasks(&config, command),
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();
    let core_error = err.chain().find_map(|e| e.downcast_ref::<CoreError>());

    match core_error {
        Some(CoreError::UnknownCalendar(name)) => {
            eprintln!(
                "{} No appointments configured for calendar '{}'",
                "Error:".style(error_style),
                name.yellow()
            );
            eprintln!("Check the 'calendar' field in your appointment files.");
        }
        Some(CoreError::UnparseableDate(text)) => {
            eprintln!("{} {:#}", "Error:".style(error_style), err);
            eprintln!(
                "Dates must look like '2024-03-04 Mon'; offending text: {}",
                text.yellow()
            );
        }
        Some(CoreError::InvalidCadence(token)) => {
            eprintln!(
                "{} Cannot handle repeat interval '{}' (expected e.g. '++1w' or '.+2m')",
                "Error:".style(error_style),
                token.yellow()
            );
        }
        Some(CoreError::InvalidTimezone(message)) => {
            eprintln!("{} {}", "Error:".style(error_style), message);
            if let Some(name) = message.rsplit(' ').next() {
                let suggestions = timezone::suggest_timezone(name);
                if !suggestions.is_empty() {
                    eprintln!("Did you mean one of these?");
                    for tz in suggestions {
                        eprintln!("  {}", tz.yellow());
                    }
                }
            }
        }
        _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
    }
}
