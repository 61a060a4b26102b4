//! Trait seams between the pipeline and its I/O.

use async_trait::async_trait;

use crate::error::AppError;

/// Retrieves the raw bytes behind a URL.
///
/// Implementations perform one attempt per call, never retry, and do not
/// interpret the content.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Returns the full body of `url`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::RetrievalError` on network failure, timeout or a
    /// non-success response.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError>;
}
