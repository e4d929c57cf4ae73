use std::time::Duration;
use thiserror::Error;

/// Reasons the credential endpoint could not produce a token.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Credential request failed")]
    Request(#[from] reqwest::Error),

    #[error("Credential endpoint {url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("Credential payload is not valid JSON")]
    Payload(#[from] serde_json::Error),

    #[error("Credential payload has no token under key '{key}'")]
    MissingToken { key: String },

    #[error("Credential request timed out after {after:?}")]
    TimedOut { after: Duration },
}

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Map credential unavailable")]
    CredentialUnavailable(#[from] CredentialError),

    #[error("Malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("Dataset parse error: {0}")]
    Dataset(#[from] serde_json::Error),

    #[error("Dataset must be a JSON array, found {found}")]
    NotAnArray { found: &'static str },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, MapError>;
