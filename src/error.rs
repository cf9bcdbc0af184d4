//! Error types shared by the Spotify client, the export pipeline and the
//! configuration loader.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures raised while talking to the Spotify Web API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The token endpoint answered with something other than 200.
    #[error("token request failed with status {status}: {body}")]
    AuthFailure { status: StatusCode, body: String },

    /// A resource request failed with a status that is not retried.
    #[error("request to {url} failed with status {status}: {body}")]
    RequestFailure {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// Still rate limited after every allowed attempt.
    #[error("request to {url} still rate limited after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::AuthFailure { status, .. } | ApiError::RequestFailure { status, .. } => {
                Some(*status)
            }
            ApiError::RetriesExhausted { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            ApiError::Network(err) => err.status(),
            ApiError::Decode { .. } | ApiError::InvalidUrl(_) => None,
        }
    }
}

/// Failures that abort an export run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}
