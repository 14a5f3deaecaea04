use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Publishes pattern-based appointments and note TODOs as calendar feeds
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./seqcal.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// iCalendar feed of the appointments of one calendar
    Appointments(AppointmentsCommand),
    /// iCalendar feed of dated TODOs for the coming month
    Todos(FeedCommand),
    /// HTML overview of open TODOs for the coming three months
    Overview(FeedCommand),
    /// Table of open TODOs in the terminal
    List(ListCommand),
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct RunOptions {
    /// Reference date instead of today (e.g. '2024-03-01', 'next monday')
    #[arg(long)]
    pub today: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AppointmentsCommand {
    /// Calendar name the appointments are configured for
    #[arg(short, long)]
    pub calendar: String,
    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub run: RunOptions,
}

#[derive(Args, Debug, Clone)]
pub struct FeedCommand {
    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub run: RunOptions,
}

#[derive(Args, Debug, Clone)]
pub struct ListCommand {
    /// Only show tasks of this page
    #[arg(short, long)]
    pub page: Option<String>,
    #[command(flatten)]
    pub run: RunOptions,
}
