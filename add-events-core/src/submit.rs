//! The submission loop: resolve each declared event and insert it, in order.

use crate::config::CalendarConfig;
use crate::error::{Error, Result};
use crate::resolve::{ResolvedEvent, resolve};
use crate::sink::{EventSink, SinkError};
use crate::time::TimeContext;
use std::collections::HashSet;
use std::io::Write;
use tracing::{debug, warn};

/// An event the sink rejected without stopping the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub title: String,
    pub reason: String,
}

/// Outcome of a run that was not aborted.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub created: usize,
    pub failures: Vec<Failure>,
}

impl RunSummary {
    pub fn attempted(&self) -> usize {
        self.created + self.failures.len()
    }
}

/// Submit every event in `config`, chunk by chunk, in declaration order.
///
/// A progress report for each event is written to `out` before it is
/// submitted. Recoverable rejections are reported and skipped; the first
/// fatal rejection aborts the run with [`Error::Rejected`].
pub async fn submit_all<S, W>(
    sink: &S,
    config: &CalendarConfig,
    time: &TimeContext,
    out: &mut W,
) -> Result<RunSummary>
where
    S: EventSink,
    W: Write,
{
    let mut summary = RunSummary::default();
    let mut seen_ids = HashSet::new();

    for chunk in &config.events {
        for spec in &chunk.events {
            let event = resolve(&chunk.chunk_prefix, spec, &config.defaults, time);

            if !seen_ids.insert(event.id.clone()) {
                warn!(title = %event.title, "Title appears more than once; later inserts reuse the same id");
            }

            report(out, &event)?;

            debug!(calendar_id = %event.calendar_id, id = %event.id, "Inserting event");

            let outcome = sink.insert(&event.calendar_id, &event).await;

            match outcome {
                Ok(()) => {
                    writeln!(out, "  ✓ created")?;
                    summary.created += 1;
                }
                Err(err) if err.is_fatal() => {
                    writeln!(out, "  ✗ {} (aborting)", err.reason)?;
                    out.flush()?;
                    return Err(rejected(event, err));
                }
                Err(err) => {
                    writeln!(out, "  ✗ {}", err.reason)?;
                    debug!(title = %event.title, reason = %err.reason, "Insert failed, continuing");
                    summary.failures.push(Failure {
                        title: event.title,
                        reason: err.reason,
                    });
                }
            }

            writeln!(out)?;
        }
    }

    out.flush()?;

    Ok(summary)
}

fn report<W: Write>(out: &mut W, event: &ResolvedEvent) -> std::io::Result<()> {
    writeln!(out, "📅 {}", event.title)?;
    writeln!(out, "  id:       {}", event.id)?;
    writeln!(out, "  start:    {}", event.start)?;
    writeln!(out, "  end:      {}", event.end)?;
    writeln!(out, "  location: {}", event.location)?;
    writeln!(out, "  calendar: {}", event.calendar_id)?;
    Ok(())
}

fn rejected(event: ResolvedEvent, err: SinkError) -> Error {
    Error::Rejected {
        title: event.title,
        reason: err.reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::event_id;
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;

    const CONFIG: &str = r#"
defaults:
  start: "09:00"
  end: "10:00"
  location: HQ
  calendarId: primary
events:
  - chunk_prefix: Team
    events:
      - date: 2024-05-01
        title: Standup
      - date: 2024-05-02
        title: Retro
  - chunk_prefix: CS101
    events:
      - date: 2024-09-03
        title: Lecture 1
        calendarId: school
"#;

    /// Records every insert and fails the ones at the configured positions.
    #[derive(Default)]
    struct RecordingSink {
        calls: RefCell<Vec<(String, String)>>,
        failures: Vec<(usize, SinkError)>,
    }

    impl RecordingSink {
        fn failing_at(index: usize, err: SinkError) -> Self {
            Self {
                failures: vec![(index, err)],
                ..Default::default()
            }
        }

        fn titles(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|(_, t)| t.clone()).collect()
        }
    }

    impl EventSink for RecordingSink {
        async fn insert(&self, calendar_id: &str, event: &ResolvedEvent) -> Result<(), SinkError> {
            let index = self.calls.borrow().len();
            self.calls
                .borrow_mut()
                .push((calendar_id.to_string(), event.title.clone()));

            match self.failures.iter().find(|(i, _)| *i == index) {
                Some((_, err)) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    fn context() -> TimeContext {
        TimeContext::at(
            chrono_tz::America::New_York,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
    }

    fn config() -> CalendarConfig {
        CalendarConfig::from_yaml(CONFIG).unwrap()
    }

    #[tokio::test]
    async fn submits_in_declaration_order() {
        let sink = RecordingSink::default();
        let mut out = Vec::new();

        let summary = submit_all(&sink, &config(), &context(), &mut out)
            .await
            .unwrap();

        assert_eq!(summary.created, 3);
        assert!(summary.failures.is_empty());
        assert_eq!(
            *sink.calls.borrow(),
            vec![
                ("primary".to_string(), "Team Standup".to_string()),
                ("primary".to_string(), "Team Retro".to_string()),
                ("school".to_string(), "CS101 Lecture 1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn fatal_failure_aborts_the_run() {
        let sink = RecordingSink::failing_at(1, SinkError::fatal("Bad Request"));
        let mut out = Vec::new();

        let err = submit_all(&sink, &config(), &context(), &mut out)
            .await
            .unwrap_err();

        assert_eq!(sink.titles(), vec!["Team Standup", "Team Retro"]);
        match err {
            Error::Rejected { title, reason } => {
                assert_eq!(title, "Team Retro");
                assert_eq!(reason, "Bad Request");
            }
            other => panic!("unexpected error: {other}"),
        }

        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("✗ Bad Request (aborting)"));
        assert!(!report.contains("CS101 Lecture 1"));
    }

    #[tokio::test]
    async fn recoverable_failure_continues() {
        let sink = RecordingSink::failing_at(1, SinkError::recoverable("Rate Limit Exceeded"));
        let mut out = Vec::new();

        let summary = submit_all(&sink, &config(), &context(), &mut out)
            .await
            .unwrap();

        assert_eq!(sink.titles().len(), 3);
        assert_eq!(summary.created, 2);
        assert_eq!(summary.attempted(), 3);
        assert_eq!(
            summary.failures,
            vec![Failure {
                title: "Team Retro".to_string(),
                reason: "Rate Limit Exceeded".to_string(),
            }]
        );
        assert!(String::from_utf8(out).unwrap().contains("✗ Rate Limit Exceeded\n"));
    }

    #[tokio::test]
    async fn report_lists_resolved_fields() {
        let sink = RecordingSink::default();
        let mut out = Vec::new();

        submit_all(&sink, &config(), &context(), &mut out)
            .await
            .unwrap();

        let report = String::from_utf8(out).unwrap();
        let first: Vec<&str> = report.lines().take(7).collect();

        assert_eq!(first[0], "📅 Team Standup");
        assert_eq!(first[1], format!("  id:       {}", event_id("Team Standup")));
        assert_eq!(first[2], "  start:    2024-05-01T09:00:00-0400 (America/New_York)");
        assert_eq!(first[3], "  end:      2024-05-01T10:00:00-0400 (America/New_York)");
        assert_eq!(first[4], "  location: HQ");
        assert_eq!(first[5], "  calendar: primary");
        assert_eq!(first[6], "  ✓ created");
    }

    #[tokio::test]
    async fn repeated_titles_share_an_id() {
        let yaml = CONFIG.replace("title: Retro", "title: Standup");
        let config = CalendarConfig::from_yaml(&yaml).unwrap();
        let sink = RecordingSink::default();
        let mut out = Vec::new();

        let summary = submit_all(&sink, &config, &context(), &mut out)
            .await
            .unwrap();

        assert_eq!(summary.created, 3);
        assert_eq!(sink.titles()[0], sink.titles()[1]);
    }
}
