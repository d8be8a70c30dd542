//! Google implementation of [`CredentialProvider`].

use add_events_core::{Credential, CredentialProvider};
use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::authenticate;
use crate::client_secret::ClientSecret;
use crate::session::Session;

/// Only events on calendars the user owns.
pub const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar.events.owned"];

const TOKEN_FILE_ENV: &str = "ADD_EVENTS_TOKEN_FILE";
const CLIENT_SECRET_FILE_ENV: &str = "ADD_EVENTS_CLIENT_SECRET_FILE";

/// Where the token cache and the client secret live.
#[derive(Debug, Clone)]
pub struct AuthPaths {
    pub token: PathBuf,
    pub client_secret: PathBuf,
}

impl Default for AuthPaths {
    fn default() -> Self {
        Self {
            token: PathBuf::from("token.json"),
            client_secret: PathBuf::from("credentials.json"),
        }
    }
}

impl AuthPaths {
    /// Defaults in the working directory, overridable through the environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            token: std::env::var_os(TOKEN_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.token),
            client_secret: std::env::var_os(CLIENT_SECRET_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.client_secret),
        }
    }
}

pub struct GoogleCredentialProvider {
    paths: AuthPaths,
}

impl GoogleCredentialProvider {
    pub fn new(paths: AuthPaths) -> Self {
        Self { paths }
    }

    async fn authorize(&self) -> Result<Credential> {
        let secret = ClientSecret::load(&self.paths.client_secret)?;
        let data = authenticate::run(&secret, SCOPES).await?;

        let session = Session::new(&self.paths.token, data);
        session.save()?;
        info!(path = %self.paths.token.display(), "Saved new Google session");

        Ok(session.credential())
    }
}

impl CredentialProvider for GoogleCredentialProvider {
    type Error = anyhow::Error;

    async fn acquire(&self) -> Result<Credential> {
        let Some(mut session) = Session::load(&self.paths.token)? else {
            return self.authorize().await;
        };

        if !session.is_expired(Utc::now()) {
            return Ok(session.credential());
        }

        if session.can_refresh() {
            info!("Access token expired, refreshing");

            let refreshed = match ClientSecret::load(&self.paths.client_secret) {
                Ok(secret) => session.refresh(&secret).await,
                Err(e) => Err(e),
            };

            match refreshed {
                Ok(()) => return Ok(session.credential()),
                Err(e) => warn!("Token refresh failed, re-authorizing: {:#}", e),
            }
        }

        self.authorize().await
    }
}
