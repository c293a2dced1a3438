use thiserror::Error;

/// Result of a dictionary API call.
pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Failures talking to the dictionary API.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("invalid upstream base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("upstream request to {url} failed: {source}")]
    Unavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream answered {status} for {url}")]
    ServerStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed upstream payload from {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl UpstreamError {
    /// True when the API answered but its body did not match the schema.
    pub fn is_malformed(&self) -> bool {
        matches!(self, UpstreamError::Malformed { .. })
    }
}
