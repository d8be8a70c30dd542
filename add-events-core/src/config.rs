//! The calendar YAML file.
//!
//! ```yaml
//! defaults:
//!   start: "09:00"
//!   end: "10:00"
//!   location: HQ
//!   calendarId: primary
//! events:
//!   - chunk_prefix: Team
//!     events:
//!       - date: 2024-05-01
//!         title: Standup
//!       - date: 2024-05-02
//!         title: Offsite
//!         all_day: true
//!         location: Room 2
//! ```

use crate::error::{Error, Result};
use crate::time::TimeOfDay;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    pub defaults: Defaults,
    pub events: Vec<Chunk>,
}

/// Fallback values for fields an event leaves out.
#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub location: String,
    #[serde(rename = "calendarId")]
    pub calendar_id: String,
}

/// A group of events whose titles share a prefix.
#[derive(Debug, Clone, Deserialize)]
pub struct Chunk {
    pub chunk_prefix: String,
    pub events: Vec<EventSpec>,
}

/// One declared event, with optional overrides of the defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct EventSpec {
    pub date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub all_day: bool,
    pub start: Option<TimeOfDay>,
    pub end: Option<TimeOfDay>,
    pub location: Option<String>,
    #[serde(rename = "calendarId")]
    pub calendar_id: Option<String>,
}

impl CalendarConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Total number of declared events across all chunks.
    pub fn event_count(&self) -> usize {
        self.events.iter().map(|chunk| chunk.events.len()).sum()
    }
}
