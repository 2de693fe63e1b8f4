//! Release feed resolution
//!
//! The feed is a GitHub-style "latest release" document:
//!
//! ```text
//! {
//!   "tag_name": "v1.2.0",
//!   "assets": [
//!     { "name": "app.bin", "browser_download_url": "...", "url": "..." }
//!   ]
//! }
//! ```

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::download::Downloader;
use crate::error::{Result, UpdateError};
use crate::progress::ProgressSink;

/// Accept header for the metadata request
const METADATA_ACCEPT: &str = "application/vnd.github+json";

/// The latest release as seen by the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    tag: String,
    download_url: Option<String>,
    asset_url: Option<String>,
}

impl Release {
    /// A release with no matching asset
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            download_url: None,
            asset_url: None,
        }
    }

    /// Attach the public and API-level URLs of the matching asset
    pub fn with_asset(mut self, download_url: impl Into<String>, asset_url: impl Into<String>) -> Self {
        self.download_url = Some(download_url.into());
        self.asset_url = Some(asset_url.into());
        self
    }

    /// Release tag (e.g. "v1.2.0")
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Public download URL, for unauthenticated fetches
    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref()
    }

    /// Asset API URL, for authenticated fetches
    pub fn asset_url(&self) -> Option<&str> {
        self.asset_url.as_deref()
    }

    /// Whether an asset matching the artifact name was found
    pub fn has_asset(&self) -> bool {
        self.download_url.is_some()
    }
}

/// Queries the release feed and extracts the artifact's asset
#[derive(Debug, Clone)]
pub struct ReleaseResolver {
    downloader: Downloader,
    artifact_name: String,
}

impl ReleaseResolver {
    pub fn new(downloader: Downloader, artifact_name: impl Into<String>) -> Self {
        Self {
            downloader,
            artifact_name: artifact_name.into(),
        }
    }

    /// Name matched against asset names
    pub fn artifact_name(&self) -> &str {
        &self.artifact_name
    }

    /// Fetch and parse the latest release from `endpoint`
    pub async fn resolve_latest(
        &self,
        endpoint: &str,
        access_token: Option<&str>,
        sink: &dyn ProgressSink,
    ) -> Result<Release> {
        debug!("Fetching latest release from: {}", endpoint);

        let body = self
            .downloader
            .fetch_bytes(
                endpoint,
                access_token,
                METADATA_ACCEPT,
                "Checking for updates...",
                sink,
            )
            .await
            .inspect_err(|e| {
                if e.is_cancelled() {
                    info!("Update check cancelled");
                }
            })?;

        let release = parse_release(&body, &self.artifact_name)?;
        debug!(
            "Resolved release {} (asset found: {})",
            release.tag(),
            release.has_asset()
        );
        Ok(release)
    }
}

/// Parse a feed document, selecting the first asset named `artifact_name`
/// (case-insensitive).
///
/// A release without a matching asset is not an error here; it comes back
/// with only the tag set.
pub fn parse_release(body: &[u8], artifact_name: &str) -> Result<Release> {
    let document: Value = serde_json::from_slice(body)?;
    let object = document
        .as_object()
        .ok_or_else(|| UpdateError::malformed("Response is not an object"))?;

    let tag = require_str(object, "tag_name", "Tag name cannot be found")?;
    let mut release = Release::new(tag);

    let assets = object
        .get("assets")
        .and_then(Value::as_array)
        .ok_or_else(|| UpdateError::malformed("Assets array cannot be found"))?;

    for entry in assets {
        let asset = entry
            .as_object()
            .ok_or_else(|| UpdateError::malformed("Asset entry is not an object"))?;

        let name = require_str(asset, "name", "Asset name cannot be found")?;
        if !name.eq_ignore_ascii_case(artifact_name) {
            continue;
        }

        let download_url = require_str(
            asset,
            "browser_download_url",
            "Asset download URL cannot be found",
        )?;
        let asset_url = require_str(asset, "url", "Asset API URL cannot be found")?;

        release = release.with_asset(download_url, asset_url);
        break;
    }

    Ok(release)
}

fn require_str<'a>(object: &'a Map<String, Value>, field: &str, message: &str) -> Result<&'a str> {
    object
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| UpdateError::malformed(message))
}
