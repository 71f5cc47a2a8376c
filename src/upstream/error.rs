use reqwest::StatusCode;
use thiserror::Error;

/// Errors that occur while talking to the upstream social API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream API returned status {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("upstream returned a non-numeric id '{0}'")]
    MalformedId(String),
    #[error("upstream client configuration error: {0}")]
    Config(String),
}

impl UpstreamError {
    pub fn status(status: StatusCode, message: String) -> Self {
        UpstreamError::Status { status, message }
    }
}
