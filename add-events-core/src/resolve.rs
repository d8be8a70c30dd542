use crate::config::{Defaults, EventSpec};
use crate::id::event_id;
use crate::time::{TimeContext, TimeSpec};
use serde::Serialize;

/// An event with prefix and defaults applied, ready for the calendar.
///
/// Serializes to the insert request body; the calendar id travels in the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEvent {
    pub id: String,
    #[serde(rename = "summary")]
    pub title: String,
    pub location: String,
    pub start: TimeSpec,
    pub end: TimeSpec,
    #[serde(skip)]
    pub calendar_id: String,
}

pub fn resolve(
    prefix: &str,
    spec: &EventSpec,
    defaults: &Defaults,
    time: &TimeContext,
) -> ResolvedEvent {
    let title = format!("{} {}", prefix, spec.title);

    let start = spec.start.unwrap_or(defaults.start);
    let end = spec.end.unwrap_or(defaults.end);

    ResolvedEvent {
        id: event_id(&title),
        title,
        location: spec
            .location
            .clone()
            .unwrap_or_else(|| defaults.location.clone()),
        start: time.materialize(spec.date, start, spec.all_day),
        end: time.materialize(spec.date, end, spec.all_day),
        calendar_id: spec
            .calendar_id
            .clone()
            .unwrap_or_else(|| defaults.calendar_id.clone()),
    }
}
