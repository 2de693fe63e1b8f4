//! Helpers for updater and loader tests

use hoist_core::BootstrapConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::constants::*;

/// Installed artifact inside a temp directory
pub struct Installed {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl Installed {
    /// Install `content` as the artifact
    pub fn with_content(content: &[u8]) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(ARTIFACT_NAME);
        fs::write(&path, content).unwrap();
        Self { dir, path }
    }

    /// Nothing installed yet
    pub fn absent() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(ARTIFACT_NAME);
        Self { dir, path }
    }

    pub fn read(&self) -> Vec<u8> {
        fs::read(&self.path).unwrap()
    }

    /// Files left in the directory other than the artifact itself
    pub fn leftovers(&self) -> Vec<PathBuf> {
        fs::read_dir(self.dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|e| e.path())
            .filter(|p| p != &self.path)
            .collect()
    }
}

/// Bootstrap settings for a test run against `endpoint`
pub fn test_config(endpoint: &str, artifact: &Path) -> BootstrapConfig {
    BootstrapConfig::for_endpoint(endpoint, ARTIFACT_NAME, artifact)
        .with_read_timeout(std::time::Duration::from_secs(5))
        .with_progress_interval(PROGRESS_INTERVAL)
}

/// Create a script that prints `output` for `--version` and otherwise exits
/// with the number of arguments it received
#[cfg(unix)]
pub fn create_version_script(dir: &Path, name: &str, output: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    let script = format!(
        "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then\n  echo '{}'\n  exit 0\nfi\nexit $#\n",
        output
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Create a script whose version query fails
#[cfg(unix)]
pub fn create_failing_script(dir: &Path, name: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, "#!/bin/sh\necho 'boom' >&2\nexit 3\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Install test logging; repeated calls are harmless
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("hoist_update=debug")
        .try_init();
}
