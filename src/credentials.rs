//! Loaders for the two Google credential files that supply OAuth client credentials.
//!
//! - `ClientSecrets`: the `client_secret.json` downloaded from Google Cloud Console for
//!   an installed (desktop) or web OAuth client.
//! - `AuthorizedUser`: an application default credentials file of type
//!   `authorized_user`, as written by `gcloud auth application-default login`.
//!
//! Both are inputs only. Nothing here is ever written back; the cached token record
//! lives in its own file (see `cache`).
use std::{fs, path::Path};

use serde::Deserialize;
use tracing::error;

use crate::{
    config::{Config, ConfigBuilder},
    error::Error,
    refresh_token::RefreshToken,
};

/// Client id and secret of an OAuth client registered in Google Cloud Console.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum ClientSecretsFile {
    Installed(ClientSecrets),
    Web(ClientSecrets),
}

impl ClientSecrets {
    /// Parses a `client_secret.json` holding either an `installed` or a `web` section.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let file = serde_json::from_slice::<ClientSecretsFile>(bytes).map_err(|e| {
            error!("Failed to parse client secrets: {}", e);
            Error::Config(format!("client secrets file: {}", e))
        })?;
        match file {
            ClientSecretsFile::Installed(v) | ClientSecretsFile::Web(v) => Ok(v),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_slice(&read(path.as_ref())?)
    }

    /// Starts a `ConfigBuilder` for `audience` with these client credentials.
    pub fn config_builder(&self, audience: &str) -> ConfigBuilder {
        Config::builder()
            .audience(audience)
            .client_id(&self.client_id)
            .client_secret(&self.client_secret)
    }
}

/// User credentials from an application default credentials file.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: RefreshToken,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AdcFile {
    AuthorizedUser {
        client_id: String,
        client_secret: String,
        refresh_token: RefreshToken,
    },
}

impl AuthorizedUser {
    /// Parses an ADC file. Any `type` other than `authorized_user` is rejected.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let AdcFile::AuthorizedUser {
            client_id,
            client_secret,
            refresh_token,
        } = serde_json::from_slice::<AdcFile>(bytes).map_err(|e| {
            error!("Failed to parse application default credentials: {}", e);
            Error::Config(format!("application default credentials: {}", e))
        })?;
        if refresh_token.is_empty() {
            return Err(Error::Config(
                "application default credentials have an empty refresh_token".to_string(),
            ));
        }
        Ok(Self {
            client_id,
            client_secret,
            refresh_token,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_slice(&read(path.as_ref())?)
    }

    /// Starts a `ConfigBuilder` for `audience` with these client credentials.
    pub fn config_builder(&self, audience: &str) -> ConfigBuilder {
        Config::builder()
            .audience(audience)
            .client_id(&self.client_id)
            .client_secret(&self.client_secret)
    }
}

fn read(path: &Path) -> Result<Vec<u8>, Error> {
    fs::read(path).map_err(|e| {
        error!("Failed to read {}: {}", path.display(), e);
        Error::Config(format!("unable to read {}: {}", path.display(), e))
    })
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use crate::{error::Error, refresh_token::RefreshToken};

    use super::{AuthorizedUser, ClientSecrets};

    #[test]
    fn test_client_secrets_installed() {
        let json = r#"{
            "installed": {
                "client_id": "my_client_id.apps.googleusercontent.com",
                "project_id": "my-project",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "client_secret": "my_secret",
                "redirect_uris": ["http://localhost"]
            }
        }"#;
        let secrets = ClientSecrets::from_slice(json.as_bytes()).unwrap();
        assert_eq!(secrets.client_id, "my_client_id.apps.googleusercontent.com");
        assert_eq!(secrets.client_secret, "my_secret");
    }

    #[test]
    fn test_client_secrets_web() {
        let json = r#"{"web": {"client_id": "web_id", "client_secret": "web_secret"}}"#;
        let secrets = ClientSecrets::from_slice(json.as_bytes()).unwrap();
        assert_eq!(secrets.client_id, "web_id");

        let config = secrets.config_builder("my_audience").build().unwrap();
        assert_eq!(config.client_id(), "web_id");
        assert_eq!(config.audience(), "my_audience");
    }

    #[test]
    fn test_client_secrets_unknown_section() {
        let json = r#"{"service_account": {"client_id": "id", "client_secret": "s"}}"#;
        let secrets = ClientSecrets::from_slice(json.as_bytes());
        assert!(matches!(secrets, Err(Error::Config(_))));
    }

    #[test]
    fn test_client_secrets_missing_file() {
        let secrets = ClientSecrets::from_file("/nonexistent/client_secret.json");
        assert!(matches!(secrets, Err(Error::Config(msg)) if msg.contains("unable to read")));
    }

    #[test]
    fn test_authorized_user() {
        let json = r#"{
            "client_id": "adc_id",
            "client_secret": "adc_secret",
            "refresh_token": "adc_refresh",
            "type": "authorized_user"
        }"#;
        let adc = AuthorizedUser::from_slice(json.as_bytes()).unwrap();
        assert_eq!(adc.client_id, "adc_id");
        assert_eq!(adc.client_secret, "adc_secret");
        assert_eq!(adc.refresh_token, RefreshToken::new("adc_refresh"));
    }

    #[test]
    fn test_authorized_user_rejects_service_account() {
        let json = r#"{"type": "service_account", "client_id": "id", "private_key": "k"}"#;
        let adc = AuthorizedUser::from_slice(json.as_bytes());
        assert!(matches!(adc, Err(Error::Config(_))));
    }

    #[test]
    fn test_authorized_user_empty_refresh_token() {
        let json = r#"{
            "client_id": "adc_id",
            "client_secret": "adc_secret",
            "refresh_token": "",
            "type": "authorized_user"
        }"#;
        let adc = AuthorizedUser::from_slice(json.as_bytes());
        assert!(matches!(adc, Err(Error::Config(msg)) if msg.contains("refresh_token")));
    }
}
