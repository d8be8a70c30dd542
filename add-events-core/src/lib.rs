//! Core of add-events.
//!
//! This crate turns a calendar YAML file into calendar-ready events and pushes
//! them through an [`EventSink`]:
//! - `config` for the YAML model
//! - `time` and `id` for start/end payloads and deterministic event ids
//! - `resolve` for applying chunk prefixes and defaults
//! - `submit` for the ordered, fail-fast-on-fatal submission loop

pub mod config;
pub mod error;
pub mod id;
pub mod resolve;
pub mod sink;
pub mod submit;
pub mod time;

pub use config::CalendarConfig;
pub use error::{Error, Result};
pub use resolve::ResolvedEvent;
pub use sink::{Credential, CredentialProvider, EventSink, FailureClass, SinkError};
pub use submit::{RunSummary, submit_all};
pub use time::{TimeContext, TimeSpec};
