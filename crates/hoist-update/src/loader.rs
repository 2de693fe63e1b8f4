//! Boundary to whatever runs the artifact once the update attempt is over
//!
//! The update engine never looks inside the artifact. It only needs the
//! installed version string before deciding whether to update, and a way to
//! hand control over afterwards.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Failure to start the artifact
#[derive(Error, Debug)]
pub enum LoadError {
    /// No artifact installed at the path
    #[error("Artifact not found: {0}")]
    NotFound(PathBuf),

    /// The artifact exists but could not be started
    #[error("Failed to start {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How the loaded artifact finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Exit code; `None` when terminated by a signal
    pub exit_code: Option<i32>,
}

impl LoadOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Reads the installed version and runs the artifact
#[async_trait]
pub trait Loader: Send + Sync {
    /// Version string of the artifact at `path`, or `None` if unavailable
    async fn get_version(&self, path: &Path) -> Option<String>;

    /// Run the artifact with pass-through arguments
    async fn load(&self, path: &Path, args: &[String]) -> Result<LoadOutcome, LoadError>;
}

/// Current installed version, as reported by `loader`
pub async fn current_version<L: Loader + ?Sized>(loader: &L, artifact: &Path) -> Option<String> {
    let version = loader.get_version(artifact).await;
    match &version {
        Some(v) => info!("Current version is: {}", v),
        None => info!("No installed version found at {:?}", artifact),
    }
    version
}

/// Runs the artifact as a child process
///
/// The version is the last whitespace-separated token printed by
/// `<artifact> --version` (so `"app 1.2.0"` yields `"1.2.0"`).
#[derive(Debug, Clone)]
pub struct ProcessLoader {
    version_arg: String,
}

impl ProcessLoader {
    pub fn new() -> Self {
        Self {
            version_arg: "--version".to_string(),
        }
    }

    /// Use a different flag to query the version
    pub fn with_version_arg(mut self, arg: impl Into<String>) -> Self {
        self.version_arg = arg.into();
        self
    }
}

impl Default for ProcessLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Loader for ProcessLoader {
    async fn get_version(&self, path: &Path) -> Option<String> {
        if !path.is_file() {
            return None;
        }

        let output = match Command::new(program_path(path))
            .arg(&self.version_arg)
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                debug!("Could not query version of {:?}: {}", path, e);
                return None;
            }
        };

        if !output.status.success() {
            debug!(
                "Version query of {:?} exited with {:?}",
                path,
                output.status.code()
            );
            return None;
        }

        parse_version_output(&String::from_utf8_lossy(&output.stdout))
    }

    async fn load(&self, path: &Path, args: &[String]) -> Result<LoadOutcome, LoadError> {
        if !path.is_file() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        let program = program_path(path);
        debug!("Loading {:?} with {} argument(s)", program, args.len());
        let status = Command::new(&program)
            .args(args)
            .status()
            .await
            .map_err(|source| LoadError::Spawn {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(LoadOutcome {
            exit_code: status.code(),
        })
    }
}

/// A bare file name would be looked up on PATH; anchor it to the working directory
fn program_path(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new(".").join(path),
        _ => path.to_path_buf(),
    }
}

fn parse_version_output(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find(|line| !line.trim().is_empty())
        .and_then(|line| line.split_whitespace().last())
        .map(String::from)
}
