use crate::directory::Directory;
use crate::encode_segment;
use crate::error::{Result, UpstreamError};
use crate::term::SearchResult;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

pub const DEFAULT_UPSTREAM: &str = "https://berry.starshines.xyz/api/v1";

/// Live, uncached access to the dictionary API.
///
/// Responses with a status of 500 or above are failures. Anything else that
/// is not a success (404 included) counts as an answer with no data.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: Client,
    base_url: String,
}

impl DirectoryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if let Err(err) = reqwest::Url::parse(&base_url) {
            return Err(UpstreamError::InvalidBaseUrl {
                url: base_url,
                reason: err.to_string(),
            });
        }
        let http = Client::builder()
            .user_agent(concat!("termgloss-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(UpstreamError::Client)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /list`: every term, in upstream order.
    pub async fn fetch_all(&self) -> Result<Directory> {
        self.get_json("/list").await
    }

    /// `GET /search/{query}` with the query lower-cased.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let path = format!("/search/{}", encode_segment(&query.to_lowercase()));
        self.get_json(&path).await
    }

    async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Requesting upstream");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| UpstreamError::Unavailable {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status.as_u16() >= 500 {
            return Err(UpstreamError::ServerStatus { url, status });
        }
        if !status.is_success() {
            debug!(%url, %status, "Upstream returned no data");
            return Ok(T::default());
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| UpstreamError::Unavailable {
                url: url.clone(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| UpstreamError::Malformed { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let client = DirectoryClient::new("http://127.0.0.1:9/api/v1/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9/api/v1");
    }

    #[test]
    fn relative_base_urls_are_rejected() {
        let err = DirectoryClient::new("not a url").unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidBaseUrl { .. }), "{err}");
    }
}
