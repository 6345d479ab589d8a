//! Provides an asynchronous execution framework for sending HTTP requests to Google.
//!
//! This module:
//! - Defines the Executer trait, which provides a unified interface for making HTTP requests.
//! - Implements ExchangeExe, which trades a refresh token for an id_token.

use std::{error::Error as StdError, pin::Pin};

use chrono::Utc;
use http::StatusCode;
use reqwest::{Client, Response, Url};
use tracing::{debug, error};

use crate::{
    error::Error,
    refresh_token::RefreshTokenRequest,
    token::{TokenRecord, TokenResponse},
};

/// Upper bound on how much of a response body is read.
pub const MAX_BODY_BYTES: usize = 1 << 20;

/// generic asynchronous execution interface for sending HTTP requests.
/// Key Components:
/// - Req: The request type that the executer will handle.
/// - Response: The expected response type.
/// - Error: The error type that will be returned on failure.
/// - Future: The asynchronous execution result, returning either Response or Error
pub trait Executer<'a, Req>
where
    Req: Send,
{
    type Response;
    type Error: StdError;
    type Future: Future<Output = Result<Self::Response, Self::Error>> + Send + 'a;

    fn execute(&'a self, req: &'a Req) -> Self::Future;
}

/// Exchanges a refresh token for an id_token minted for the request's audience.
///
/// Holds one `reqwest::Client`; no other state survives between calls.
#[derive(Debug, Clone, Default)]
pub struct ExchangeExe {
    client: Client,
}

impl ExchangeExe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Request Workflow
/// 1. Parse the token endpoint URL.
/// 2. POST the form-encoded refresh grant with the audience.
/// 3. Fail with the response body on any status other than 200.
/// 4. Parse the body and derive the expiry, re-stamping the refresh token that was sent.
impl<'a> Executer<'a, RefreshTokenRequest> for ExchangeExe {
    type Response = TokenRecord;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'a>>;

    fn execute(&'a self, req: &'a RefreshTokenRequest) -> Self::Future {
        Box::pin(async move {
            let url = Url::parse(req.token_endpoint()).map_err(|e| {
                error!("Failed to parse url: {:?}", e);
                Error::Config(format!("invalid token endpoint: {}", e))
            })?;

            let res = self
                .client
                .post(url)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .form(&req.form()[..])
                .send()
                .await
                .map_err(|e| {
                    error!("Failed to send request: {:?}", e);
                    Error::Transport(e.to_string())
                })?;

            let status = res.status();
            let body = read_body(res).await?;
            if status != StatusCode::OK {
                let body = String::from_utf8_lossy(&body).into_owned();
                error!(status = status.as_u16(), "Token endpoint rejected the exchange");
                return Err(Error::Exchange {
                    status: status.as_u16(),
                    body,
                });
            }

            let token = serde_json::from_slice::<TokenResponse>(&body).map_err(|e| {
                error!("Failed to parse JSON: {:?}", e);
                Error::Decode(format!("token response: {}", e))
            })?;
            let record = token.into_record(req.refresh_token(), Utc::now())?;
            debug!(expiry = ?record.expiry(), "exchanged refresh token");
            Ok(record)
        })
    }
}

/// Reads at most `MAX_BODY_BYTES` of the body, dropping the rest.
async fn read_body(mut res: Response) -> Result<Vec<u8>, Error> {
    let mut body = Vec::new();
    while let Some(chunk) = res.chunk().await.map_err(|e| {
        error!("Failed to read response body: {:?}", e);
        Error::Transport(e.to_string())
    })? {
        let room = MAX_BODY_BYTES - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
