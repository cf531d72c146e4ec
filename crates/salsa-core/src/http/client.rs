//! HTTP client shared by the manifest loader, the Nexus client and the downloader.
//!
//! This module provides a thin wrapper around `reqwest`:
//! - One attempt per request; non-2xx responses become [`HttpError::HttpStatus`]
//! - Document requests get a total deadline; downloads only an idle read timeout
//! - Streamed downloads with percentage progress and cooperative cancellation
//! - Custom User-Agent, default headers (sensitive values are never printed) and proxy support
//!
//! # Examples
//!
//! ```no_run
//! use salsa_core::http::{HttpClient, HttpClientConfig};
//! use tokio_util::sync::CancellationToken;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpClientConfig::new().with_timeout(Duration::from_secs(60));
//! let client = HttpClient::with_config(config)?;
//!
//! let text = client.get_text("https://example.com/mods.json").await?;
//!
//! let cancel = CancellationToken::new();
//! client.download(
//!     "https://example.com/mod.zip",
//!     "/tmp/mod.zip".as_ref(),
//!     Some(&|pct: f64| println!("{:.1}%", pct)),
//!     &cancel,
//! ).await?;
//! # Ok(())
//! # }
//! ```

use futures_util::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::config::HttpSettings;

const DEFAULT_USER_AGENT: &str = concat!("salsa/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Progress callback receiving a percentage in `[0, 100]`
pub type ProgressFn = dyn Fn(f64) + Send + Sync;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Request(reqwest::Error),

    #[error("Timed out waiting for the server")]
    Timeout(#[source] reqwest::Error),

    #[error("HTTP {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization error: {0}")]
    JsonParse(String),

    #[error("Invalid header {0}")]
    InvalidHeader(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout(err)
        } else {
            HttpError::Request(err)
        }
    }
}

impl HttpError {
    /// HTTP status code, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::HttpStatus { status, .. } => Some(*status),
            HttpError::Request(e) | HttpError::Timeout(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub struct HttpClient {
    client: Client,
    user_agent: String,
    /// Deadline for whole document requests, never applied to downloads
    timeout: Duration,
}

impl HttpClient {
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self, HttpError> {
        let mut headers = HeaderMap::new();
        for header in &config.headers {
            let name = HeaderName::from_bytes(header.name.as_bytes())
                .map_err(|_| HttpError::InvalidHeader(header.name.clone()))?;
            let mut value = HeaderValue::from_str(&header.value)
                .map_err(|_| HttpError::InvalidHeader(header.name.clone()))?;
            value.set_sensitive(header.sensitive);
            headers.insert(name, value);
        }

        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .gzip(true)
            .user_agent(&config.user_agent)
            .default_headers(headers);

        // Add proxy if configured
        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            user_agent: config.user_agent,
            timeout: config.timeout,
        })
    }

    /// Perform a single GET request bounded by the total timeout, failing on non-success status
    pub async fn get(&self, url: &str) -> Result<Response, HttpError> {
        self.send(url, Some(self.timeout)).await
    }

    async fn send(&self, url: &str, deadline: Option<Duration>) -> Result<Response, HttpError> {
        log::debug!("HTTP GET {}", url);
        let mut request = self.client.get(url);
        if let Some(deadline) = deadline {
            request = request.timeout(deadline);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("HTTP {} {}", status.as_u16(), url);
            return Err(HttpError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    /// GET and return the body as text
    pub async fn get_text(&self, url: &str) -> Result<String, HttpError> {
        let response = self.get(url).await?;
        Ok(response.text().await?)
    }

    /// GET JSON and deserialize
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let text = self.get_text(url).await?;
        serde_json::from_str(&text).map_err(|e| HttpError::JsonParse(e.to_string()))
    }

    /// Stream a URL to `dest`, overwriting it, and report percentage progress
    ///
    /// Progress is only reported when the server sends a Content-Length.
    /// There is no total deadline; a stalled transfer fails after the read
    /// timeout. Returns the number of bytes written. A failed or cancelled transfer
    /// leaves whatever was already written in place.
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: Option<&ProgressFn>,
        cancel: &CancellationToken,
    ) -> Result<u64, HttpError> {
        let response = cancellable(cancel, self.send(url, None)).await?;
        let content_length = response.content_length();

        // Create parent directories if they don't exist
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        write_stream(response.bytes_stream(), content_length, dest, progress, cancel).await
    }

    /// Get the configured user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Run a request future, aborting with [`HttpError::Cancelled`] when the token fires
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, HttpError>
where
    F: Future<Output = Result<T, HttpError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(HttpError::Cancelled),
        result = fut => result,
    }
}

/// Write a stream of body chunks to `dest`
///
/// `content_length` of `None` or `0` disables progress reporting. Reported
/// values are clamped to `[0, 100]` so an over-long body cannot exceed 100.
/// Cancellation is checked between chunks.
pub async fn write_stream<S, B, E>(
    stream: S,
    content_length: Option<u64>,
    dest: &Path,
    progress: Option<&ProgressFn>,
    cancel: &CancellationToken,
) -> Result<u64, HttpError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<HttpError>,
{
    let total = content_length.filter(|&n| n > 0);
    let mut stream = std::pin::pin!(stream);

    let mut file = File::create(dest).await?;
    let mut received: u64 = 0;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(HttpError::Cancelled),
            next = stream.next() => next,
        };

        let Some(chunk) = next else {
            break;
        };
        let chunk = chunk.map_err(Into::into)?;
        let bytes = chunk.as_ref();

        file.write_all(bytes).await?;
        received += bytes.len() as u64;

        if let (Some(total), Some(callback)) = (total, progress) {
            callback(percentage(received, total));
        }
    }

    file.flush().await?;

    Ok(received)
}

fn percentage(received: u64, total: u64) -> f64 {
    (received as f64 * 100.0 / total as f64).clamp(0.0, 100.0)
}

/// A header sent with every request from a client
#[derive(Debug, Clone)]
pub struct DefaultHeader {
    pub name: String,
    pub value: String,
    pub sensitive: bool,
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Longest wait for the next read on a connection
    pub read_timeout: Duration,
    pub proxy: Option<String>,
    pub user_agent: String,
    pub headers: Vec<DefaultHeader>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            proxy: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
        }
    }
}

impl From<&HttpSettings> for HttpClientConfig {
    fn from(settings: &HttpSettings) -> Self {
        Self {
            timeout: settings.timeout(),
            connect_timeout: settings.connect_timeout(),
            read_timeout: settings.read_timeout(),
            proxy: settings.proxy.clone(),
            user_agent: settings.user_agent.clone(),
            headers: Vec::new(),
        }
    }
}

impl HttpClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push(DefaultHeader {
            name: name.to_string(),
            value: value.to_string(),
            sensitive: false,
        });
        self
    }

    /// Add a header whose value must never show up in debug output
    pub fn with_sensitive_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push(DefaultHeader {
            name: name.to_string(),
            value: value.to_string(),
            sensitive: true,
        });
        self
    }
}
