//! The OAuth client secret downloaded from the Google Cloud console.
//!
//! Only needed for the first interactive authorization and for refreshing
//! an expired access token.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Google OAuth client credentials (user-provided).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
}

/// The console wraps the credentials in `installed` (desktop app) or `web`.
#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Google client secret not found at {}.\n\n\
                Create a \"Desktop app\" OAuth client at\n\
                https://console.cloud.google.com/apis/credentials\n\
                and download its JSON to that path.",
                path.display()
            );
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read client secret from {}", path.display()))?;

        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse client secret from {}", path.display()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let file: ClientSecretFile = serde_json::from_str(contents)?;

        file.installed
            .or(file.web)
            .ok_or_else(|| anyhow::anyhow!("Expected an \"installed\" or \"web\" client entry"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_installed_layout() {
        let json = r#"{
            "installed": {
                "client_id": "123.apps.googleusercontent.com",
                "project_id": "add-events",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "client_secret": "shh",
                "redirect_uris": ["http://localhost"]
            }
        }"#;

        let secret = ClientSecret::from_json(json).unwrap();
        assert_eq!(secret.client_id, "123.apps.googleusercontent.com");
        assert_eq!(secret.client_secret, "shh");
    }

    #[test]
    fn reads_web_layout() {
        let json = r#"{"web": {"client_id": "web-id", "client_secret": "web-secret"}}"#;

        let secret = ClientSecret::from_json(json).unwrap();
        assert_eq!(secret.client_id, "web-id");
    }

    #[test]
    fn rejects_unknown_layout() {
        let json = r#"{"client_id": "id", "client_secret": "secret"}"#;
        assert!(ClientSecret::from_json(json).is_err());
    }

    #[test]
    fn missing_file_explains_setup() {
        let err = ClientSecret::load(Path::new("/nonexistent/credentials.json")).unwrap_err();
        assert!(err.to_string().contains("console.cloud.google.com"));
    }
}
