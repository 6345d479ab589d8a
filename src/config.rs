//! Defines structures and builders for the refresh-token exchange configuration.
//!
//! Holds the audience the id_token is minted for, the OAuth2 client credentials
//! and the token endpoint. Values are checked once in `ConfigBuilder::build`, so a
//! `Config` that exists is always usable for an exchange.
//!
//! ## Structures
//! - `Config`: Stores everything needed to exchange a refresh token.
//! - `ConfigBuilder`: A builder for constructing a `Config` instance.
//!
//! # Example
//! ```rust,no_run
//! use google_id_token::config::Config;
//!
//! let config = Config::builder()
//!     .audience("1071284184436-xxxx.apps.googleusercontent.com")
//!     .client_id("your-client-id")
//!     .client_secret("your-client-secret")
//!     .build()
//!     .unwrap();
//! ```
use tracing::error;

use crate::error::Error;

/// Google's OAuth2 token endpoint.
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Holds the inputs of a refresh-token-for-id-token exchange.
///
/// It is immutable once constructed.
///
/// # Fields
/// - `audience`: OAuth client id of the relying party, becomes the `aud` claim.
/// - `client_id`: The client ID the refresh token was issued to.
/// - `client_secret`: The client secret linked to the client ID.
/// - `token_endpoint`: The token exchange endpoint URL.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) audience: Audience,
    pub(crate) client_id: ClientID,
    pub(crate) client_secret: ClientSecret,
    pub(crate) token_endpoint: TokenEndPoint,
}

// ==========impl Config==========
impl Config {
    /// Returns a new `ConfigBuilder` instance to create a `Config` object.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn audience(&self) -> &str {
        &self.audience.0
    }

    pub fn client_id(&self) -> &str {
        &self.client_id.0
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint.0
    }
}

/// Provides a way to create a `Config` instance step by step.
///
/// The token endpoint defaults to Google's; every other field is required.
///
/// # Example
/// ```rust,no_run
/// use google_id_token::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .audience("relying-party-client-id")
///     .client_id("your-client-id")
///     .client_secret("your-client-secret")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    audience: Audience,
    client_id: ClientID,
    client_secret: ClientSecret,
    token_endpoint: Option<TokenEndPoint>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Audience(pub String);

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ClientID(pub String);

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ClientSecret(pub String);

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TokenEndPoint(pub String);

// ==========impl ConfigBuilder==========
impl ConfigBuilder {
    /// Creates a new `ConfigBuilder` instance with default values.
    pub fn new() -> Self {
        ConfigBuilder::default()
    }

    /// Sets the audience (the relying party's OAuth client id).
    pub fn audience(mut self, audience: &str) -> Self {
        self.audience = Audience(audience.to_string());
        self
    }

    /// Sets the client ID obtained from Google Cloud Console.
    pub fn client_id(mut self, client_id: &str) -> Self {
        self.client_id = ClientID(client_id.to_string());
        self
    }

    /// Sets the client secret associated with the client ID.
    pub fn client_secret(mut self, client_secret: &str) -> Self {
        self.client_secret = ClientSecret(client_secret.to_string());
        self
    }

    /// Overrides the token exchange endpoint URL.
    pub fn token_endpoint(mut self, token_endpoint: &str) -> Self {
        self.token_endpoint = Some(TokenEndPoint(token_endpoint.to_string()));
        self
    }

    /// Constructs a `Config`, rejecting empty fields and an unparsable endpoint.
    pub fn build(self) -> Result<Config, Error> {
        require("audience", &self.audience.0)?;
        require("client_id", &self.client_id.0)?;
        require("client_secret", &self.client_secret.0)?;

        let token_endpoint = self
            .token_endpoint
            .unwrap_or_else(|| TokenEndPoint(GOOGLE_TOKEN_ENDPOINT.to_string()));
        url::Url::parse(&token_endpoint.0).map_err(|e| {
            error!("Failed to parse token endpoint: {}", e);
            Error::Config(format!("invalid token endpoint {}: {}", token_endpoint.0, e))
        })?;

        Ok(Config {
            audience: self.audience,
            client_id: self.client_id,
            client_secret: self.client_secret,
            token_endpoint,
        })
    }
}

fn require(name: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{} must be set", name)));
    }
    Ok(())
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use crate::{
        config::{Config, GOOGLE_TOKEN_ENDPOINT},
        error::Error,
    };

    use super::ConfigBuilder;

    #[test]
    fn test_config_builder() {
        let audience = "my_audience";
        let client_id = "my_client_id";
        let client_secret = "my_secret";
        let token_endpoint = "https://token.example.com";

        let config = ConfigBuilder::new()
            .audience(audience)
            .client_id(client_id)
            .client_secret(client_secret)
            .token_endpoint(token_endpoint)
            .build()
            .unwrap();

        assert_eq!(config.audience.0, audience);
        assert_eq!(config.client_id.0, client_id);
        assert_eq!(config.client_secret.0, client_secret);
        assert_eq!(config.token_endpoint.0, token_endpoint);
    }

    #[test]
    fn test_config_builder_default_endpoint() {
        let config = Config::builder()
            .audience("my_audience")
            .client_id("my_client_id")
            .client_secret("my_secret")
            .build()
            .unwrap();

        assert_eq!(config.token_endpoint(), GOOGLE_TOKEN_ENDPOINT);
    }

    #[test]
    fn test_config_builder_empty_audience() {
        let config = ConfigBuilder::new()
            .client_id("my_client_id")
            .client_secret("my_secret")
            .build();

        assert!(matches!(config, Err(Error::Config(msg)) if msg.contains("audience")));
    }

    #[test]
    fn test_config_builder_blank_secret() {
        let config = ConfigBuilder::new()
            .audience("my_audience")
            .client_id("my_client_id")
            .client_secret("   ")
            .build();

        assert!(matches!(config, Err(Error::Config(msg)) if msg.contains("client_secret")));
    }

    #[test]
    fn test_config_builder_invalid_endpoint() {
        let config = ConfigBuilder::new()
            .audience("my_audience")
            .client_id("my_client_id")
            .client_secret("my_secret")
            .token_endpoint("not a url")
            .build();

        assert!(matches!(config, Err(Error::Config(_))));
    }
}
