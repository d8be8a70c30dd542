//! Start/end payloads for the calendar API.
//!
//! Timed events carry an explicit UTC offset. The offset is the zone's offset
//! at the instant the run started, not on the event's own date, so events on
//! the other side of a DST change get the "wrong" offset. Google still
//! resolves them against `timeZone`, but the wall-clock time can shift by an
//! hour. Left as-is until someone decides the intended behavior.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A wall-clock time from the config file (`HH:MM` or `HH:MM:SS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .ok()
            .map(TimeOfDay)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeOfDay::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid time of day '{}', expected HH:MM", raw))
        })
    }
}

/// Parse an IANA timezone name (clap value parser).
pub fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.parse::<Tz>()
        .map_err(|_| format!("unknown timezone '{}'", name))
}

/// Start or end of an event, as the calendar API expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TimeSpec {
    AllDay {
        date: NaiveDate,
        #[serde(rename = "timeZone")]
        time_zone: String,
    },
    Timed {
        #[serde(rename = "dateTime")]
        date_time: String,
        #[serde(rename = "timeZone")]
        time_zone: String,
    },
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSpec::AllDay { date, time_zone } => write!(f, "{} (all day, {})", date, time_zone),
            TimeSpec::Timed {
                date_time,
                time_zone,
            } => write!(f, "{} ({})", date_time, time_zone),
        }
    }
}

/// The zone and the instant a run observes, shared by every event in the run.
#[derive(Debug, Clone, Copy)]
pub struct TimeContext {
    zone: Tz,
    now: DateTime<Utc>,
}

impl TimeContext {
    pub fn current(zone: Tz) -> Self {
        Self::at(zone, Utc::now())
    }

    pub fn at(zone: Tz, now: DateTime<Utc>) -> Self {
        Self { zone, now }
    }

    /// UTC offset of the zone at `now`, formatted `±HHMM`.
    pub fn offset(&self) -> String {
        self.now.with_timezone(&self.zone).format("%z").to_string()
    }

    /// Build the start or end payload for an event.
    ///
    /// `time` is ignored for all-day events.
    pub fn materialize(&self, date: NaiveDate, time: TimeOfDay, all_day: bool) -> TimeSpec {
        let time_zone = self.zone.name().to_string();

        if all_day {
            return TimeSpec::AllDay { date, time_zone };
        }

        TimeSpec::Timed {
            date_time: format!("{}T{}{}", date.format("%Y-%m-%d"), time, self.offset()),
            time_zone,
        }
    }
}
