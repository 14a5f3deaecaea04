use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use seqcal_core::models::PatternConfig;
use seqcal_core::timezone::validate_timezone;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::timezone::detect_system_timezone;

pub const DEFAULT_CONFIG_FILE: &str = "seqcal.toml";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// IANA zone used for "today" and for the wall-clock times of feed entries
    pub timezone: String,
    /// Directory of appointment JSON files
    pub schedules_dir: PathBuf,
    /// Root of the notes graph (`pages/` and `journals/` live here)
    pub notes_dir: PathBuf,
    pub organizer_name: String,
    pub organizer_mail: String,
    /// `tag,tag:Bucket|tag:Bucket`
    pub tag_division: String,
    pub patterns: PatternConfig,
    pub window: WindowConfig,
    pub log_level: String,
}

/// Range of the appointment feed around today.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct WindowConfig {
    /// Whole months before the first of the current month
    pub months_back: u32,
    /// Months after today
    pub months_ahead: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            months_back: 1,
            months_ahead: 4,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: detect_system_timezone(),
            schedules_dir: PathBuf::from("schedules"),
            notes_dir: PathBuf::from("notes"),
            organizer_name: "Seqcal".to_string(),
            organizer_mail: "seqcal@localhost".to_string(),
            tag_division: String::new(),
            patterns: PatternConfig::default(),
            window: WindowConfig::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the TOML file, then `SEQCAL_*` variables (`__` nests,
    /// e.g. `SEQCAL_WINDOW__MONTHS_AHEAD`).
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let file = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("SEQCAL_").split("__"))
            .extract()?;
        Ok(config)
    }

    /// Rejects an unknown timezone before any work starts.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_timezone(&self.timezone)?;
        Ok(())
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Warn)
    }
}
