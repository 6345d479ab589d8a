//! Provides decoding and validation of the id_token returned by the token endpoint.
//!
//! This module:
//! IDTokenRow: A structure representing an encoded ID token (compact JWS) before decoding.
//! IDToken: A data structure representing the decoded payload of an ID token.
//!
//! The signature is never verified here. Claims are only used to pick an expiry and
//! to decide whether a cached token may be handed out again; a relying party that
//! receives the token must verify it.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::Error;

/// Represents a decoded ID token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IDToken {
    pub iss: Option<String>,  // Issuer (e.g., "https://accounts.google.com")
    pub aud: String,  // Audience the token was minted for
    pub sub: Option<String>,  // User ID
    pub azp: Option<String>,  // Authorized party (the client id that asked for it)
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub at_hash: Option<String>,
    pub iat: Option<i64>,  // Issued-at timestamp (UNIX time)
    pub nbf: Option<i64>,  // Not-before timestamp (UNIX time)
    pub exp: i64,  // Expiration timestamp (UNIX time)
}

impl IDToken {
    /// Decodes an IDTokenRow (encoded ID token) into an IDToken.
    ///
    /// Requires exactly three dot separated segments and a Base64URL JSON payload.
    pub fn decode_from_row(id_token: &IDTokenRow) -> Result<Self, Error> {
        let split: Vec<_> = id_token.0.split('.').collect();
        if split.len() != 3 || split.iter().any(|s| s.is_empty()) {
            return Err(Error::Decode("id_token: expected header.payload.signature".to_string()));
        }
        let bytes = BASE64_URL_SAFE_NO_PAD.decode(split[1]).map_err(|e| {
            error!("Failed to decode IDToken: {}", e);
            Error::Decode(format!("id_token payload: {}", e))
        })?;

        let id_token = serde_json::from_slice::<IDToken>(&bytes).map_err(|e| {
            error!("Failed to deserialize IDToken: {}", e);
            Error::Decode(format!("id_token claims: {}", e))
        })?;
        Ok(id_token)
    }

    /// The `exp` claim as a timestamp.
    pub fn expiry(&self) -> Result<DateTime<Utc>, Error> {
        DateTime::from_timestamp(self.exp, 0)
            .ok_or_else(|| Error::Decode(format!("id_token exp out of range: {}", self.exp)))
    }

    /// Standard time checks: `exp` strictly after `now`, `iat` and `nbf` not after `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        let now = now.timestamp();
        if self.exp <= now {
            debug!(exp = self.exp, now, "id_token expired");
            return false;
        }
        if self.iat.is_some_and(|iat| iat > now) {
            debug!(iat = ?self.iat, now, "id_token used before issued");
            return false;
        }
        if self.nbf.is_some_and(|nbf| nbf > now) {
            debug!(nbf = ?self.nbf, now, "id_token not valid yet");
            return false;
        }
        true
    }

    /// True when the token is live at `now` and its `aud` is exactly `audience`.
    pub fn is_valid_for(&self, audience: &str, now: DateTime<Utc>) -> bool {
        if self.aud != audience {
            debug!(cached = %self.aud, requested = %audience, "id_token audience mismatch");
            return false;
        }
        self.is_live_at(now)
    }
}

/// Represents an encoded ID token, which must be decoded before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IDTokenRow(pub(crate) String);

impl IDTokenRow {
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    pub fn value_as_str(&self) -> &str {
        &self.0
    }

    pub fn decode(&self) -> Result<IDToken, Error> {
        IDToken::decode_from_row(self)
    }
}
