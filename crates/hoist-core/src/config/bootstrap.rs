//! The immutable configuration value for one bootstrap run

use crate::types::RuntimeConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line overrides applied on top of the loaded [`RuntimeConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Release feed endpoint
    pub update_url: Option<String>,

    /// Access token for private feeds
    pub access_token: Option<String>,

    /// Install location of the artifact
    pub artifact_path: Option<PathBuf>,

    /// Disable the interactive progress display
    pub no_gui: bool,

    /// Skip the update and load the artifact directly
    pub skip_update: bool,
}

/// Settings for one bootstrap run.
///
/// Built once from the layered runtime configuration and the CLI flags,
/// then passed by reference to everything that needs it.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Release metadata endpoint
    pub endpoint: String,

    /// Access token for private feeds; switches downloads to the asset API form
    pub access_token: Option<String>,

    /// Asset name matched case-insensitively against the feed
    pub artifact_name: String,

    /// Where the artifact is installed
    pub artifact_path: PathBuf,

    /// Whether transfers drive the interactive progress display
    pub ui_enabled: bool,

    /// Skip the update check entirely
    pub skip_update: bool,

    /// Bound on any single network read
    pub read_timeout: Duration,

    /// Minimum spacing between progress reports
    pub progress_interval: Duration,

    /// User agent for HTTP requests
    pub user_agent: String,
}

impl BootstrapConfig {
    /// Resolve the final settings; CLI overrides win over the runtime config
    pub fn resolve(runtime: &RuntimeConfig, overrides: ConfigOverrides) -> Self {
        let artifact_path = overrides
            .artifact_path
            .or_else(|| runtime.release.artifact_path.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(&runtime.release.artifact_name));

        Self {
            endpoint: overrides
                .update_url
                .unwrap_or_else(|| runtime.release.update_url.clone()),
            access_token: overrides
                .access_token
                .or_else(|| runtime.release.access_token.clone())
                .filter(|t| !t.is_empty()),
            artifact_name: runtime.release.artifact_name.clone(),
            artifact_path,
            ui_enabled: runtime.display.progress_ui && !overrides.no_gui,
            skip_update: overrides.skip_update,
            read_timeout: Duration::from_secs(runtime.network.read_timeout_secs),
            progress_interval: Duration::from_millis(runtime.network.progress_interval_ms),
            user_agent: runtime.network.user_agent.clone(),
        }
    }

    /// Settings for tests and embedders that do not load files
    pub fn for_endpoint(
        endpoint: impl Into<String>,
        artifact_name: impl Into<String>,
        artifact_path: impl Into<PathBuf>,
    ) -> Self {
        let mut runtime = RuntimeConfig::default();
        runtime.release.update_url = endpoint.into();
        runtime.release.artifact_name = artifact_name.into();
        runtime.display.progress_ui = false;

        Self::resolve(
            &runtime,
            ConfigOverrides {
                artifact_path: Some(artifact_path.into()),
                ..Default::default()
            },
        )
    }

    /// Replace the access token
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Replace the read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Replace the progress interval
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}
