//! Capabilities the submission loop depends on.

use crate::resolve::ResolvedEvent;
use std::fmt;
use thiserror::Error;

/// Whether a failed insert should stop the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The request itself is malformed; every following event would fail too.
    Fatal,
    /// Report and move on to the next event.
    Recoverable,
}

/// A rejected insert, with the reason reported by the backend.
#[derive(Debug, Clone, Error)]
#[error("{reason}")]
pub struct SinkError {
    pub class: FailureClass,
    pub reason: String,
}

impl SinkError {
    pub fn new(class: FailureClass, reason: impl Into<String>) -> Self {
        Self {
            class,
            reason: reason.into(),
        }
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::new(FailureClass::Fatal, reason)
    }

    pub fn recoverable(reason: impl Into<String>) -> Self {
        Self::new(FailureClass::Recoverable, reason)
    }

    pub fn is_fatal(&self) -> bool {
        self.class == FailureClass::Fatal
    }
}

/// Somewhere events can be inserted, keyed by calendar and event id.
///
/// Inserting an id that already exists must not create a second event.
#[allow(async_fn_in_trait)]
pub trait EventSink {
    async fn insert(&self, calendar_id: &str, event: &ResolvedEvent) -> Result<(), SinkError>;
}

/// A bearer token for the calendar API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Produces a valid credential, refreshing or re-authorizing and persisting
/// the renewed state as needed. Called once per run.
#[allow(async_fn_in_trait)]
pub trait CredentialProvider {
    type Error;

    async fn acquire(&self) -> Result<Credential, Self::Error>;
}
