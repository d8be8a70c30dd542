//! Google Calendar backend for add-events.
//!
//! The provider manages its own OAuth state, by default in the working directory:
//!   credentials.json (client secret, downloaded from the Google Cloud console)
//!   token.json       (cached access/refresh tokens, written on first authorization)

mod authenticate;
pub mod client_secret;
pub mod credentials;
pub mod events;
pub mod session;

pub use credentials::{AuthPaths, GoogleCredentialProvider, SCOPES};
pub use events::GoogleEventSink;
