//! Google Calendar event sink over the v3 REST API.

use add_events_core::{Credential, EventSink, FailureClass, ResolvedEvent, SinkError};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use url::Url;

const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

pub struct GoogleEventSink {
    http: reqwest::Client,
    base_url: String,
    credential: Credential,
}

impl GoogleEventSink {
    pub fn new(credential: Credential) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: CALENDAR_API.to_string(),
            credential,
        }
    }

    /// Point the sink at another API root (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn events_url(&self, calendar_id: &str) -> Result<Url, SinkError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SinkError::fatal(format!("Invalid API URL {}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| SinkError::fatal(format!("Invalid API URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(["calendars", calendar_id, "events"]);

        Ok(url)
    }
}

impl EventSink for GoogleEventSink {
    async fn insert(&self, calendar_id: &str, event: &ResolvedEvent) -> Result<(), SinkError> {
        let url = self.events_url(calendar_id)?;

        // No HTTP response at all means nothing else will get through either
        let response = self
            .http
            .post(url)
            .bearer_auth(self.credential.access_token())
            .json(event)
            .send()
            .await
            .map_err(|e| SinkError::fatal(format!("Request to Google Calendar failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(status = %status, "Failed to read error body: {}", e);
                String::new()
            }
        };

        Err(SinkError::new(classify(status), reason(status, &body)))
    }
}

/// A malformed request will fail the same way for every later event.
pub fn classify(status: StatusCode) -> FailureClass {
    if status == StatusCode::BAD_REQUEST {
        FailureClass::Fatal
    } else {
        FailureClass::Recoverable
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// `"<reason phrase>: <message>"`, using the message from Google's error body when there is one.
fn reason(status: StatusCode, body: &str) -> String {
    let phrase = status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string());

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => {
            format!("{}: {}", phrase, parsed.error.message)
        }
        _ => phrase,
    }
}
