//! Composes the credential cache and the token exchange.
//!
//! Per call:
//! 1. Load the credential file.
//! 2. Unless a refresh is forced, hand back the cached id_token if it is live and
//!    minted for the configured audience.
//! 3. Otherwise exchange a refresh token (an explicit seed first, else the cached one).
//! 4. Save the new record, then return its id_token.
//!
//! A failed exchange leaves the credential file untouched.
use tracing::{debug, error, info};

use crate::{
    cache::CredentialCache,
    config::Config,
    error::Error,
    executer::{ExchangeExe, Executer},
    id_token::IDTokenRow,
    refresh_token::{RefreshToken, RefreshTokenRequest},
    token::TokenRecord,
};

/// Where a returned id_token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cache,
    Exchange,
}

#[derive(Debug)]
pub struct IdTokenProvider<E = ExchangeExe> {
    exe: E,
    cache: CredentialCache,
    force_refresh: bool,
    seed: Option<RefreshToken>,
}

impl IdTokenProvider<ExchangeExe> {
    pub fn new(cache: CredentialCache) -> Self {
        Self::with_executer(ExchangeExe::default(), cache)
    }
}

impl<E> IdTokenProvider<E>
where
    E: for<'a> Executer<'a, RefreshTokenRequest, Response = TokenRecord, Error = Error>,
{
    pub fn with_executer(exe: E, cache: CredentialCache) -> Self {
        Self {
            exe,
            cache,
            force_refresh: false,
            seed: None,
        }
    }

    /// Skip the cached id_token and always exchange. The result is still saved.
    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    /// Refresh token to use instead of the cached one, e.g. from an ADC file.
    pub fn seed(mut self, refresh_token: RefreshToken) -> Self {
        self.seed = Some(refresh_token);
        self
    }

    pub fn cache(&self) -> &CredentialCache {
        &self.cache
    }

    /// Returns an id_token for `config.audience()`.
    pub async fn id_token(&self, config: &Config) -> Result<IDTokenRow, Error> {
        self.id_token_with_source(config).await.map(|(row, _)| row)
    }

    pub async fn id_token_with_source(
        &self,
        config: &Config,
    ) -> Result<(IDTokenRow, TokenSource), Error> {
        let cached = self.cache.load()?;

        if let Some(record) = &cached {
            if self.force_refresh {
                debug!("forced refresh, skipping cached id_token");
            } else if record.is_reusable(config.audience()) {
                if let Some(row) = record.id_token() {
                    info!(path = %self.cache.path().display(), "using cached id_token");
                    return Ok((row.to_owned(), TokenSource::Cache));
                }
            }
        }

        let refresh_token = match (&self.seed, &cached) {
            (Some(seed), _) => seed.to_owned(),
            (None, Some(record)) => record.refresh_token().to_owned(),
            (None, None) => {
                error!(path = %self.cache.path().display(), "No refresh token available");
                return Err(Error::Config(format!(
                    "no credential file at {} and no refresh token supplied; complete the browser login first",
                    self.cache.path().display()
                )));
            }
        };
        if refresh_token.is_empty() {
            error!("Refusing to exchange an empty refresh token");
            return Err(Error::Config("refresh_token must not be empty".to_string()));
        }

        let req = RefreshTokenRequest::new(config, &refresh_token);
        let record = self.exe.execute(&req).await?;
        let Some(row) = record.id_token().cloned() else {
            error!("Token response did not include an id_token");
            return Err(Error::Decode("token response: missing id_token".to_string()));
        };

        self.cache.save(&record)?;
        info!(path = %self.cache.path().display(), "exchanged refresh token for a new id_token");
        Ok((row, TokenSource::Exchange))
    }
}
