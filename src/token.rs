//! The token record exchanged with Google and persisted between runs.
//!
//! - AccessToken: opaque OAuth 2.0 bearer token.
//! - TokenResponse: the JSON body of a successful token endpoint response.
//! - TokenRecord: the canonical on-disk shape of the credential file.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::Error, id_token::IDTokenRow, refresh_token::RefreshToken};

/// Represents an OAuth 2.0 access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken(pub(crate) String);

impl AccessToken {
    /// Retrieves the access token as a string.
    pub fn value(&self) -> String {
        self.0.clone()
    }
}

/// Body of a 200 response from the token endpoint.
///
/// Google does not always echo `refresh_token` back, hence the `Option`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub(crate) access_token: Option<AccessToken>,
    #[serde(default)]
    pub(crate) token_type: String,
    pub(crate) id_token: Option<IDTokenRow>,
    #[serde(default)]
    pub(crate) expires_in: i64,
    pub(crate) refresh_token: Option<RefreshToken>,
}

impl TokenResponse {
    /// Turns the response into a record authenticated by `refresh_token`.
    ///
    /// The expiry is `now + expires_in`, replaced by the id_token's `exp` claim when
    /// an id_token is present. The refresh token always becomes the one that was sent.
    pub fn into_record(
        self,
        refresh_token: &RefreshToken,
        now: DateTime<Utc>,
    ) -> Result<TokenRecord, Error> {
        let id_token = self.id_token.filter(|row| !row.0.is_empty());
        let mut expiry = None;
        if self.expires_in > 0 {
            expiry = Duration::try_seconds(self.expires_in).and_then(|d| now.checked_add_signed(d));
        }
        if let Some(row) = &id_token {
            expiry = Some(row.decode()?.expiry()?);
        }
        if let Some(echoed) = &self.refresh_token {
            if echoed != refresh_token {
                debug!("token endpoint returned a different refresh_token, keeping the one sent");
            }
        }

        Ok(TokenRecord {
            access_token: self.access_token,
            token_type: self.token_type,
            id_token,
            expires_in: self.expires_in,
            refresh_token: refresh_token.to_owned(),
            expiry,
        })
    }
}

/// Token material cached in the credential file.
///
/// ```json
/// {
///   "access_token": "ya29...",
///   "token_type": "Bearer",
///   "id_token": "eyJhbGciOi...",
///   "expires_in": 3599,
///   "refresh_token": "1//0g...",
///   "expiry": "2026-10-15T10:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) access_token: Option<AccessToken>,
    #[serde(default)]
    pub(crate) token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id_token: Option<IDTokenRow>,
    #[serde(default)]
    pub(crate) expires_in: i64,
    pub(crate) refresh_token: RefreshToken,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) expiry: Option<DateTime<Utc>>,
}

impl TokenRecord {
    /// A record holding nothing but a refresh token, e.g. one seeded from an ADC file.
    pub fn from_refresh_token(refresh_token: RefreshToken) -> Self {
        Self {
            access_token: None,
            token_type: String::new(),
            id_token: None,
            expires_in: 0,
            refresh_token,
            expiry: None,
        }
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn id_token(&self) -> Option<&IDTokenRow> {
        self.id_token.as_ref()
    }

    pub fn expires_in(&self) -> i64 {
        self.expires_in
    }

    pub fn refresh_token(&self) -> &RefreshToken {
        &self.refresh_token
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }

    /// Whether the cached id_token can be handed out for `audience` right now.
    pub fn is_reusable(&self, audience: &str) -> bool {
        self.is_reusable_at(audience, Utc::now())
    }

    /// Whether the cached id_token is well formed, live at `now` and minted for `audience`.
    /// Every failure is a cache miss, never an error.
    pub fn is_reusable_at(&self, audience: &str, now: DateTime<Utc>) -> bool {
        let Some(row) = &self.id_token else {
            return false;
        };
        match row.decode() {
            Ok(claims) => claims.is_valid_for(audience, now),
            Err(e) => {
                debug!("cached id_token is unusable: {}", e);
                false
            }
        }
    }
}
