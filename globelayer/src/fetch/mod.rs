//! Asset fetch abstraction.
//!
//! Everything this crate downloads (the capabilities document and every
//! tile payload) goes through the [`AssetFetcher`] trait, so network I/O
//! can be swapped out for scripted responses in tests. The real
//! implementation is [`ReqwestFetcher`].
//!
//! The trait returns boxed futures so a single `Arc<dyn AssetFetcher>` can
//! be shared across concurrently spawned tile fetch tasks.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use url::Url;

/// Boxed future returned by [`AssetFetcher::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Bytes, FetchError>> + Send + 'a>>;

/// Errors surfaced by an asset fetch.
///
/// Retries and timeouts are the fetcher's own business; this crate never
/// retries and treats every error as final for the request it belongs to.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The transport failed before a response arrived (DNS, connect,
    /// timeout, TLS, ...).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-success status code.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },
}

/// A source of raw bytes addressed by URL.
///
/// Implementations must deliver exactly one completion per call: either the
/// full response body or an error. Completions may run on any thread.
pub trait AssetFetcher: Send + Sync {
    /// Fetches the resource at `url`, sending `headers` with the request.
    fn fetch<'a>(&'a self, url: Url, headers: &'a [(String, String)]) -> FetchFuture<'a>;
}

/// HTTP fetcher backed by [`reqwest::Client`].
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Creates a fetcher with a 30 second request timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(30)
    }

    /// Creates a fetcher with a custom request timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

impl AssetFetcher for ReqwestFetcher {
    fn fetch<'a>(&'a self, url: Url, headers: &'a [(String, String)]) -> FetchFuture<'a> {
        Box::pin(async move {
            let mut request = self.client.get(url.clone());
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }

            let response = request.send().await.map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::HttpStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            response.bytes().await.map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: format!("failed to read response body: {}", e),
            })
        })
    }
}
