//! # Seqcal Core Library
//!
//! Date-pattern matching and task extraction for calendar feeds built from
//! a Logseq-style notes graph.
//!
//! ## Features
//!
//! - **Named Date Patterns**: 22 closed rules ("second Friday", "coffee slot",
//!   "pseudo-bimonthly", ...) evaluated per calendar day
//! - **Repeating Tasks**: `++1w` / `.+2m` repeaters expanded into concrete
//!   dated tasks up to a horizon
//! - **Deterministic Output**: stable UIDs derived from date and title, and
//!   "today" always injected by the caller
//! - **No I/O**: every input arrives as in-memory values
//!
//! ## Core Modules
//!
//! - [`models`]: Appointments, occurrences, tasks and windows
//! - [`pattern`]: The [`pattern::DatePatternMatcher`]
//! - [`recurrence`]: Cadence tokens and occurrence expansion
//! - [`parser`]: The [`parser::TodoLineParser`]
//! - [`schedule`]: The [`schedule::ScheduleEngine`] and task scheduling
//! - [`page`]: Page tags and overview buckets
//! - [`timezone`]: Timezone validation and "today" derivation
//! - [`logging`]: Injected debug sink
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use seqcal_core::{
//!     models::{Appointment, DateWindow, PatternConfig, PatternId},
//!     schedule::ScheduleEngine,
//! };
//!
//! let appointment = Appointment {
//!     title: "Review %month".to_string(),
//!     description: String::new(),
//!     pattern: PatternId::SecondFriday,
//!     calendar: "work".to_string(),
//!     stacked: true,
//!     start_time: None,
//!     end_time: None,
//!     literal_date: None,
//!     location: None,
//! };
//! let window = DateWindow::new(
//!     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
//! )?;
//! let engine = ScheduleEngine::new(PatternConfig::default());
//! let occurrences = engine.generate_appointments(&[appointment], "work", window)?;
//! assert_eq!(occurrences[0].date, NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
//! assert_eq!(occurrences[0].title, "Review maart");
//! # Ok::<(), seqcal_core::error::CoreError>(())
//! ```

pub mod error;
pub mod logging;
pub mod models;
pub mod page;
pub mod parser;
pub mod pattern;
pub mod recurrence;
pub mod schedule;
pub mod timezone;
