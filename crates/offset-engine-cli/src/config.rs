//! Configuration management.
//!
//! Values are layered: built-in defaults, then `offsets/offsets.toml` in the
//! platform config directory, then an explicit `--config` file, then
//! `OFFSETS_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use offset_engine::{CalendarSpec, Weekmask};
use serde::{Deserialize, Serialize};

/// Settings the CLI fills into custom-calendar and business-hour offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Working days, as day names (`"Mon Tue Wed Thu Fri"`) or seven
    /// `0`/`1` flags starting Monday.
    pub weekmask: String,

    /// Non-working dates for `C`, `CBH`, `CBM` and `CBMS`.
    pub holidays: Vec<NaiveDate>,

    /// Frequency used when a command is given no `--freq`.
    pub default_freq: String,

    /// Opening time for `BH` and `CBH`, `HH:MM`.
    pub business_hours_start: String,

    /// Closing time for `BH` and `CBH`, `HH:MM`.
    pub business_hours_end: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weekmask: "Mon Tue Wed Thu Fri".to_string(),
            holidays: Vec::new(),
            default_freq: "B".to_string(),
            business_hours_start: "09:00".to_string(),
            business_hours_end: "17:00".to_string(),
        }
    }
}

impl Config {
    /// Load configuration, layering an optional explicit file over the
    /// user config file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but this is called once at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = default_config_path() {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("OFFSETS_")).extract()
    }

    /// The configured weekmask and holidays.
    pub fn calendar(&self) -> Result<CalendarSpec> {
        let weekmask = self
            .weekmask
            .parse::<Weekmask>()
            .with_context(|| format!("invalid weekmask '{}'", self.weekmask))?;
        Ok(CalendarSpec::new(weekmask, self.holidays.clone()))
    }

    /// The configured opening and closing times.
    pub fn business_hours(&self) -> Result<(NaiveTime, NaiveTime)> {
        Ok((
            parse_clock(&self.business_hours_start)?,
            parse_clock(&self.business_hours_end)?,
        ))
    }
}

fn parse_clock(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .with_context(|| format!("invalid business hour '{s}', expected HH:MM"))
}

/// `<config dir>/offsets/offsets.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("offsets").join("offsets.toml"))
}
