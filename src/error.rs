use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url `{url}`: {reason}")]
    InvalidServerUrl { url: String, reason: String },

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {detail}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        detail: String,
    },

    #[error("invalid JSON from {endpoint}: {source}")]
    InvalidJson {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} response is missing `{field}`")]
    MissingField {
        endpoint: &'static str,
        field: &'static str,
    },

    #[error("file type not allowed: {0}")]
    UnsupportedFile(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

impl ClientError {
    pub fn transport(endpoint: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| ClientError::Transport { endpoint, source }
    }
}
