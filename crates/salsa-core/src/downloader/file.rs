//! File downloader for HTTP/HTTPS artifacts.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::http::{HttpClient, HttpError, ProgressFn};
use crate::{Result, SalsaError};

use super::archive::ArchiveExtractor;

/// Moves bytes from a URL to disk and unpacks archives
///
/// The installer only talks to this trait, so tests can count calls without
/// touching the network.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Stream `url` to `dest`, overwriting any existing file
    async fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: Option<&ProgressFn>,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Extract a supported archive into `dest_dir`, overwriting existing files
    async fn extract(
        &self,
        archive: &Path,
        dest_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<()>;
}

/// Production downloader backed by [`HttpClient`] and [`ArchiveExtractor`]
pub struct HttpDownloader {
    http_client: Arc<HttpClient>,
}

impl HttpDownloader {
    /// Create a new file downloader
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: Option<&ProgressFn>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let bytes = self
            .http_client
            .download(url, dest, progress, cancel)
            .await
            .map_err(|e| match e {
                HttpError::Cancelled => SalsaError::Cancelled,
                other => SalsaError::Transfer {
                    url: redact_query(url),
                    reason: other.to_string(),
                },
            })?;

        log::debug!("Downloaded {} bytes to {}", bytes, dest.display());
        Ok(())
    }

    async fn extract(
        &self,
        archive: &Path,
        dest_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<()> {
        ArchiveExtractor::extract(archive, dest_dir, cancel).await
    }
}

/// Drop the query string from a URL for error messages
///
/// CDN links carry signed tokens in the query.
pub fn redact_query(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{}?...", base),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_downloader_creation() {
        let client = Arc::new(HttpClient::new().unwrap());
        let _downloader = HttpDownloader::new(client);
    }

    #[test]
    fn test_redact_query() {
        assert_eq!(
            redact_query("https://cdn.example.com/file.zip?md5=abc&expires=123"),
            "https://cdn.example.com/file.zip?..."
        );
        assert_eq!(
            redact_query("https://cdn.example.com/file.zip"),
            "https://cdn.example.com/file.zip"
        );
    }

    #[tokio::test]
    async fn test_download_unreachable_is_transfer_error() {
        let client = Arc::new(HttpClient::new().unwrap());
        let downloader = HttpDownloader::new(client);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let cancel = CancellationToken::new();

        let result = downloader
            .download(
                "http://127.0.0.1:9/unreachable.zip",
                &temp_dir.path().join("x.zip"),
                None,
                &cancel,
            )
            .await;

        assert!(matches!(result, Err(SalsaError::Transfer { .. })));
    }
}
