//! provides functionality for handling refresh tokens.
//!
//! This module includes:
//! - RefreshToken: A structure representing the refresh token.
//! - RefreshTokenRequest: A structure for exchanging a refresh token for an id_token
//!   minted for a given audience.

use serde::{Deserialize, Serialize};

use crate::config::{Audience, ClientID, ClientSecret, Config, TokenEndPoint};

/// Represents an OAuth 2.0 refresh token, which is used to obtain new tokens without user interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshToken(pub(crate) String);

impl RefreshToken {
    /// Creates a new refresh token from a string.
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }
    /// Returns the refresh token as a String.
    pub fn value(&self) -> String {
        self.0.to_owned()
    }
    /// Returns the refresh token as a str.
    pub fn value_as_str(&self) -> &str {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Represents a request to exchange a refresh token for an id_token.
#[derive(Debug, Clone)]
pub struct RefreshTokenRequest {
    pub(crate) token_endpoint: TokenEndPoint,
    pub(crate) audience: Audience,
    pub(crate) client_id: ClientID,
    pub(crate) client_secret: ClientSecret,
    pub(crate) refresh_token: RefreshToken,
    pub(crate) grant_type: String,
}

impl RefreshTokenRequest {
    /// Creates a new RefreshTokenRequest from the endpoint, audience and client credentials in `config`.
    pub fn new(config: &Config, refresh_token: &RefreshToken) -> Self {
        Self {
            token_endpoint: config.token_endpoint.to_owned(),
            audience: config.audience.to_owned(),
            client_id: config.client_id.to_owned(),
            client_secret: config.client_secret.to_owned(),
            refresh_token: refresh_token.to_owned(),
            grant_type: "refresh_token".to_string(),
        }
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint.0
    }

    pub fn refresh_token(&self) -> &RefreshToken {
        &self.refresh_token
    }

    /// Form fields sent to the token endpoint.
    pub(crate) fn form(&self) -> [(&'static str, &str); 5] {
        [
            ("client_id", self.client_id.0.as_str()),
            ("client_secret", self.client_secret.0.as_str()),
            ("refresh_token", self.refresh_token.0.as_str()),
            ("grant_type", self.grant_type.as_str()),
            ("audience", self.audience.0.as_str()),
        ]
    }
}
