//! Exchange a Google OAuth2 refresh token for an OpenID Connect id_token.
//!
//! The refresh token comes from a desktop ("installed") OAuth client login or from an
//! application default credentials file. The exchanged token record is cached in a
//! local JSON file, so later runs hand back the cached id_token while it is still
//! valid for the requested audience.
//! [google document](https://cloud.google.com/iap/docs/authentication-howto#authenticating_from_a_desktop_app)
//! # Feature
//! - Exchange a refresh token for an id_token minted for an audience (using reqwest)
//! - Decode id_token (Base64URLDecode) to read its expiry and audience
//! - Cache the token record in an owner-only credential file
//! - Read client credentials from `client_secret.json` or an ADC file
//! # Caution
//! - The id_token signature is **not** verified. The relying party that receives the
//!   token has to verify it.
//! - The interactive authorization-code login that produces the first refresh token is
//!   not part of this crate.
//! # Example
//! ```rust,no_run
//! use google_id_token::{cache::CredentialCache, credentials::AuthorizedUser, provider::IdTokenProvider};
//!
//! # async fn run() -> Result<(), google_id_token::error::Error> {
//! let adc = AuthorizedUser::from_file("application_default_credentials.json")?;
//! let config = adc.config_builder("relying-party.apps.googleusercontent.com").build()?;
//!
//! let provider = IdTokenProvider::new(CredentialCache::new("creds.json"))
//!     .seed(adc.refresh_token.clone());
//! let id_token = provider.id_token(&config).await?;
//! println!("{}", id_token.value_as_str());
//! # Ok(())
//! # }
//! ```
pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod executer;
pub mod id_token;
pub mod provider;
pub mod refresh_token;
pub mod token;
