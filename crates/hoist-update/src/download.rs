//! Streaming downloads with progress reporting and cooperative cancellation
//!
//! This module provides functionality for fetching release metadata and
//! artifacts with:
//! - A bounded read timeout on every read (response headers and each chunk)
//! - Throttled progress reports through a [`ProgressSink`]
//! - Cancellation checks at every chunk boundary
//! - Authenticated fetches via an `access_token` query parameter
//!
//! # Example
//!
//! ```no_run
//! use hoist_update::{Downloader, NoopSink};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> hoist_update::Result<()> {
//!     let downloader = Downloader::with_settings(
//!         Duration::from_secs(30),
//!         Duration::from_millis(100),
//!         "hoist-example",
//!     )?;
//!     let written = downloader
//!         .fetch_to_path(
//!             "https://example.com/app",
//!             Path::new("app"),
//!             None,
//!             &NoopSink::new(),
//!         )
//!         .await?;
//!     println!("Downloaded {} bytes", written);
//!     Ok(())
//! }
//! ```

use futures_util::StreamExt;
use hoist_core::BootstrapConfig;
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Response, Url};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::error::{Result, UpdateError};
use crate::progress::{ProgressEvent, ProgressSink, ProgressThrottle};

/// Accept header for binary asset downloads
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Query parameter carrying the access token
const ACCESS_TOKEN_PARAM: &str = "access_token";

/// HTTP fetcher shared by the release resolver and the artifact download
#[derive(Debug, Clone)]
pub struct Downloader {
    /// HTTP client
    client: reqwest::Client,

    /// Bound on any single read
    read_timeout: Duration,

    /// Minimum spacing between progress reports
    progress_interval: Duration,
}

impl Downloader {
    /// Create a downloader from the bootstrap settings
    pub fn new(config: &BootstrapConfig) -> Result<Self> {
        Self::with_settings(
            config.read_timeout,
            config.progress_interval,
            &config.user_agent,
        )
    }

    /// Create a downloader with explicit settings
    pub fn with_settings(
        read_timeout: Duration,
        progress_interval: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .read_timeout(read_timeout)
            .build()
            .map_err(|e| UpdateError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            read_timeout,
            progress_interval,
        })
    }

    /// Configured read timeout
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Stream `url` onto `destination`, replacing its contents.
    ///
    /// The destination is only opened once the server has answered with a
    /// success status. On `Cancelled` or any error after that point the file
    /// is left partially written; discarding it is the caller's job.
    pub async fn fetch_to_path(
        &self,
        url: &str,
        destination: &Path,
        access_token: Option<&str>,
        sink: &dyn ProgressSink,
    ) -> Result<u64> {
        let name = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| destination.display().to_string());
        let label = format!("Updating {}...", name);

        sink.begin(&label);
        let result = self
            .download_file(url, destination, access_token, sink)
            .await;
        sink.finish();

        if let Ok(written) = &result {
            info!("Downloaded {} ({})", name, human_readable_size(*written));
        }
        result
    }

    async fn download_file(
        &self,
        url: &str,
        destination: &Path,
        access_token: Option<&str>,
        sink: &dyn ProgressSink,
    ) -> Result<u64> {
        let response = self
            .send(self.request(url, access_token, OCTET_STREAM)?, sink)
            .await?;

        let mut file = tokio::fs::File::create(destination).await.map_err(|e| {
            UpdateError::io(format!("Failed to open {}", destination.display()), e)
        })?;

        let written = self.stream_body(response, &mut file, sink).await?;

        file.flush()
            .await
            .map_err(|e| UpdateError::io("Failed to flush download", e))?;
        file.sync_all()
            .await
            .map_err(|e| UpdateError::io("Failed to sync download", e))?;

        Ok(written)
    }

    /// Fetch `url` into memory, e.g. a metadata document
    pub async fn fetch_bytes(
        &self,
        url: &str,
        access_token: Option<&str>,
        accept: &str,
        label: &str,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<u8>> {
        sink.begin(label);
        let result = async {
            let response = self
                .send(self.request(url, access_token, accept)?, sink)
                .await?;
            let mut body = Vec::new();
            self.stream_body(response, &mut body, sink).await?;
            Ok::<_, UpdateError>(body)
        }
        .await;
        sink.finish();
        result
    }

    fn request(
        &self,
        url: &str,
        access_token: Option<&str>,
        accept: &str,
    ) -> Result<RequestBuilder> {
        // Logged before the token is attached.
        debug!("GET {} (authenticated: {})", url, access_token.is_some());

        let mut target = Url::parse(url)
            .map_err(|e| UpdateError::network(format!("Invalid URL '{}': {}", url, e)))?;
        if let Some(token) = access_token {
            target
                .query_pairs_mut()
                .append_pair(ACCESS_TOKEN_PARAM, token);
        }

        Ok(self.client.get(target).header(ACCEPT, accept))
    }

    /// Send a request and wait for a success status, bounded by the read timeout
    async fn send(&self, request: RequestBuilder, sink: &dyn ProgressSink) -> Result<Response> {
        if sink.is_cancelled() {
            return Err(UpdateError::Cancelled);
        }

        let response = tokio::time::timeout(self.read_timeout, request.send())
            .await
            .map_err(|_| {
                UpdateError::network(format!(
                    "no response within {}s",
                    self.read_timeout.as_secs_f64()
                ))
            })??;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::network(format!(
                "server returned HTTP {}",
                status
            )));
        }

        Ok(response)
    }

    /// Copy the response body into `writer`, reporting and polling `sink`
    async fn stream_body<W>(
        &self,
        response: Response,
        writer: &mut W,
        sink: &dyn ProgressSink,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let total_size = response.content_length();
        let mut stream = response.bytes_stream();
        let mut throttle = ProgressThrottle::new(self.progress_interval);
        let mut bytes_read: u64 = 0;
        let mut last_reported: Option<u64> = None;

        loop {
            if sink.is_cancelled() {
                debug!("Transfer cancelled after {} bytes", bytes_read);
                return Err(UpdateError::Cancelled);
            }

            let next = tokio::time::timeout(self.read_timeout, stream.next())
                .await
                .map_err(|_| {
                    UpdateError::network(format!(
                        "transfer stalled for {}s after {} bytes",
                        self.read_timeout.as_secs_f64(),
                        bytes_read
                    ))
                })?;

            let Some(chunk) = next else {
                break;
            };
            let chunk: bytes::Bytes = chunk?;

            writer
                .write_all(&chunk)
                .await
                .map_err(|e| UpdateError::io("Failed to write downloaded data", e))?;
            bytes_read += chunk.len() as u64;

            if throttle.ready(Instant::now()) {
                sink.report_progress(&ProgressEvent {
                    bytes_read,
                    total_size,
                    cancelled: sink.is_cancelled(),
                });
                last_reported = Some(bytes_read);
            }
        }

        if sink.is_cancelled() {
            return Err(UpdateError::Cancelled);
        }

        if last_reported != Some(bytes_read) {
            throttle.force(Instant::now());
            sink.report_progress(&ProgressEvent {
                bytes_read,
                total_size,
                cancelled: false,
            });
        }

        if let Some(expected) = total_size {
            if bytes_read != expected {
                return Err(UpdateError::network(format!(
                    "stream truncated: expected {} bytes, received {}",
                    expected, bytes_read
                )));
            }
        }

        Ok(bytes_read)
    }
}

/// Convert bytes to human-readable size
pub fn human_readable_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}
