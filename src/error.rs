use reqwest::StatusCode;
use thiserror::Error;

/// Anything that stops a feed snapshot from being produced.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid feed URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("feed returned HTTP {0}")]
    Status(StatusCode),

    #[error("feed body is not a vehicle list: {0}")]
    Decode(#[from] serde_json::Error),
}
