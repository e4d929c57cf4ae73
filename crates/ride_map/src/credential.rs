//! Acquisition of the map-service access token.
//!
//! Nothing may be drawn until [`CredentialGate::acquire`] resolves. The gate is
//! consumed by `acquire`, so a token is produced at most once per gate.

use crate::error::{CredentialError, MapError, Result};
use log::{debug, error, info};
use reqwest::Client;
use serde_json::Value;
use std::{fmt, time::Duration};

pub const DEFAULT_CREDENTIAL_URL: &str = "http://localhost:5000/secret";
pub const DEFAULT_TOKEN_KEY: &str = "mapquest";

/// Opaque token handed once to the map engine.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value, for the map initializer only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Something that can produce an access token with a single request.
#[allow(async_fn_in_trait)]
pub trait CredentialSource {
    async fn fetch_token(&self) -> std::result::Result<AccessToken, CredentialError>;
}

/// Fetches the token with one GET against a fixed endpoint.
///
/// The endpoint answers with a JSON object carrying the token under
/// `token_key`. No parameters, no auth headers, no retries.
#[derive(Debug, Clone)]
pub struct HttpCredentialSource {
    client: Client,
    url: String,
    token_key: String,
}

impl HttpCredentialSource {
    pub fn new(url: impl Into<String>, token_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url, token_key)
    }

    pub fn with_client(client: Client, url: impl Into<String>, token_key: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            token_key: token_key.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpCredentialSource {
    fn default() -> Self {
        Self::new(DEFAULT_CREDENTIAL_URL, DEFAULT_TOKEN_KEY)
    }
}

impl CredentialSource for HttpCredentialSource {
    async fn fetch_token(&self) -> std::result::Result<AccessToken, CredentialError> {
        debug!("Requesting map credential from {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CredentialError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        token_from_payload(&body, &self.token_key)
    }
}

/// Extracts the token stored under `key` in a JSON object payload.
pub fn token_from_payload(
    body: &str,
    key: &str,
) -> std::result::Result<AccessToken, CredentialError> {
    let payload: Value = serde_json::from_str(body)?;
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|token| !token.trim().is_empty())
        .map(AccessToken::new)
        .ok_or_else(|| CredentialError::MissingToken {
            key: key.to_string(),
        })
}

/// Blocks rendering on the arrival of a single access token.
pub struct CredentialGate<S> {
    source: S,
    timeout: Option<Duration>,
}

impl<S: CredentialSource> CredentialGate<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Awaits the token. Every failure is terminal and surfaces as
    /// [`MapError::CredentialUnavailable`].
    pub async fn acquire(self) -> Result<AccessToken> {
        let fetched = match self.timeout {
            Some(after) => tokio::time::timeout(after, self.source.fetch_token())
                .await
                .unwrap_or(Err(CredentialError::TimedOut { after })),
            None => self.source.fetch_token().await,
        };

        match fetched {
            Ok(token) => {
                info!("Map credential acquired");
                Ok(token)
            }
            Err(e) => {
                error!("Map credential unavailable: {e}");
                Err(MapError::CredentialUnavailable(e))
            }
        }
    }
}
