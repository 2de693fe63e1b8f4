//! Runtime configuration types for operational parameters
//!
//! These types define configuration that controls runtime behavior like
//! the release feed location, network timeouts and progress display.

use serde::{Deserialize, Serialize};

/// Default release feed queried for the latest release
pub const DEFAULT_UPDATE_URL: &str =
    "https://api.github.com/repos/hoist-dev/hoist-app/releases/latest";

/// Default file name of the managed artifact
pub const DEFAULT_ARTIFACT_NAME: &str = "hoist-app";

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Release feed and artifact settings
    #[serde(default)]
    pub release: ReleaseConfig,

    /// Display and output settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Network and HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Upper bound for any single read (headers or body chunk), in seconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Minimum spacing between progress reports, in milliseconds
    #[serde(default = "default_progress_interval")]
    pub progress_interval_ms: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            read_timeout_secs: default_read_timeout(),
            progress_interval_ms: default_progress_interval(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_read_timeout() -> u64 {
    30
}
fn default_progress_interval() -> u64 {
    100
}
fn default_user_agent() -> String {
    format!(
        "hoist/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Release feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseConfig {
    /// Release metadata endpoint
    #[serde(default = "default_update_url")]
    pub update_url: String,

    /// Access token for private feeds
    #[serde(default)]
    pub access_token: Option<String>,

    /// Asset name to look for in the release (matched case-insensitively)
    #[serde(default = "default_artifact_name")]
    pub artifact_name: String,

    /// Install location of the artifact; defaults to `artifact_name`
    #[serde(default)]
    pub artifact_path: Option<String>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            update_url: default_update_url(),
            access_token: None,
            artifact_name: default_artifact_name(),
            artifact_path: None,
        }
    }
}

fn default_update_url() -> String {
    DEFAULT_UPDATE_URL.to_string()
}
fn default_artifact_name() -> String {
    DEFAULT_ARTIFACT_NAME.to_string()
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DisplayConfig {
    /// Show an interactive progress display during transfers
    #[serde(default = "default_true")]
    pub progress_ui: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { progress_ui: true }
    }
}

fn default_true() -> bool {
    true
}
