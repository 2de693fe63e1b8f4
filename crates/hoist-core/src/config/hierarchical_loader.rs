//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Runtime config (~/.hoist/hoist-runtime.yaml)
//! 3. Environment variables (HOIST_* prefix)
//! 4. CLI flags (handled by caller, see [`super::ConfigOverrides`])

use crate::error::{Error, Result};
use crate::types::RuntimeConfig;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// File name of the user runtime config inside the config directory
const RUNTIME_CONFIG_FILE: &str = "hoist-runtime.yaml";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a new hierarchical config loader rooted at ~/.hoist
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the standard config directory (~/.hoist)
    ///
    /// `HOME` wins over the passwd entry so containers with a remapped home
    /// behave like the shell does.
    fn get_config_dir() -> Result<Utf8PathBuf> {
        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .ok()
            .or_else(|| dirs::home_dir().and_then(|p| p.to_str().map(String::from)))
            .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?;

        Ok(Utf8PathBuf::from(home).join(".hoist"))
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load_runtime_config(&self) -> Result<RuntimeConfig> {
        let mut config = Self::load_embedded_config::<RuntimeConfig>("runtime-defaults.yaml")?;

        let runtime_config_path = self.config_dir.join(RUNTIME_CONFIG_FILE);
        if runtime_config_path.exists() {
            debug!("Loading runtime config from {}", runtime_config_path);
            let file_config = self.load_yaml_file::<RuntimeConfig>(&runtime_config_path)?;
            config = Self::merge_runtime_config(config, file_config);
        }

        config = self.apply_env_overrides(config)?;
        Self::validate(&config)?;

        Ok(config)
    }

    /// Reject settings that would make every update attempt fail
    fn validate(config: &RuntimeConfig) -> Result<()> {
        if config.network.read_timeout_secs == 0 {
            return Err(Error::invalid_config(
                "read-timeout-secs must be at least 1 (HOIST_READ_TIMEOUT_SECS)",
            ));
        }
        Ok(())
    }

    /// Load an embedded configuration file
    fn load_embedded_config<T: DeserializeOwned>(filename: &str) -> Result<T> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        let config: T = serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })?;

        Ok(config)
    }

    /// Load a YAML file and parse it
    fn load_yaml_file<T: DeserializeOwned>(&self, path: &Utf8Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let config: T = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;
        Ok(config)
    }

    /// Merge two runtime configs (base is overridden by overlay)
    ///
    /// Sections are replaced wholesale; missing keys inside an overlay
    /// section fall back to the serde field defaults, not to `base`.
    fn merge_runtime_config(base: RuntimeConfig, overlay: RuntimeConfig) -> RuntimeConfig {
        let mut release = overlay.release;
        if release.access_token.is_none() {
            release.access_token = base.release.access_token;
        }

        RuntimeConfig {
            network: overlay.network,
            release,
            display: overlay.display,
        }
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(&self, mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if let Ok(val) = env::var("HOIST_READ_TIMEOUT_SECS") {
            config.network.read_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("HOIST_READ_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("HOIST_PROGRESS_INTERVAL_MS") {
            config.network.progress_interval_ms = val.parse().map_err(|_| {
                Error::invalid_config("HOIST_PROGRESS_INTERVAL_MS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("HOIST_UPDATE_URL") {
            config.release.update_url = val;
        }

        if let Ok(val) = env::var("HOIST_UPDATE_TOKEN") {
            if !val.is_empty() {
                config.release.access_token = Some(val);
            }
        }

        if let Ok(val) = env::var("HOIST_ARTIFACT_NAME") {
            config.release.artifact_name = val;
        }

        if let Ok(val) = env::var("HOIST_ARTIFACT_PATH") {
            config.release.artifact_path = Some(val);
        }

        if let Ok(val) = env::var("HOIST_NO_GUI") {
            if is_truthy(&val) {
                config.display.progress_ui = false;
            }
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
