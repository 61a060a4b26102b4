//! HTTP retrieval of provider files over reqwest.

use async_trait::async_trait;
use edits_core::config::HttpConfig;
use edits_core::error::AppError;
use edits_core::traits::RemoteFetcher;
use reqwest::{Client, StatusCode, Url};

/// HTTP client retrieving provider metadata files.
///
/// Each call to [`RemoteFetcher::fetch`] performs exactly one GET request. Failed
/// requests are not retried.
///
/// # Examples
///
/// ```no_run
/// use edits_client::HttpFetcher;
/// use edits_core::RemoteFetcher;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::new()?;
/// let bytes = fetcher.fetch("https://example.org/meta.zip").await?;
/// println!("Downloaded {} bytes", bytes.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    /// Creates a fetcher with the default [`HttpConfig`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::Generic` if the HTTP client cannot be built.
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(&HttpConfig::default())
    }

    /// Creates a fetcher with the given user agent and timeout.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Generic` if the HTTP client cannot be built.
    pub fn with_config(config: &HttpConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Generic(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    fn retrieval_error(url: &str, reason: impl Into<String>) -> AppError {
        AppError::RetrievalError {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// Maps a transport failure to a retrieval error.
    fn transport_error(&self, url: &str, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            Self::retrieval_error(
                url,
                format!("request timed out after {} seconds", self.timeout_secs),
            )
        } else if e.is_connect() {
            Self::retrieval_error(url, format!("connection failed: {}", e))
        } else {
            Self::retrieval_error(url, e.to_string())
        }
    }

    /// Maps a non-success status to a retrieval error.
    fn status_error(url: &str, status: StatusCode) -> AppError {
        Self::retrieval_error(url, format!("HTTP {}", status.as_u16()))
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let parsed = Url::parse(url)
            .map_err(|e| Self::retrieval_error(url, format!("invalid URL: {}", e)))?;

        tracing::debug!("GET {}", parsed);

        let resp = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::status_error(url, status));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        Ok(body.to_vec())
    }
}
