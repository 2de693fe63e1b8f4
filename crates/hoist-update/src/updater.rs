//! Update orchestration with backup and rollback
//!
//! One run walks this state machine:
//!
//! ```text
//! Idle -> Resolving -> Comparing -> UpToDate
//!                               \-> BackingUp -> Downloading -> Committed
//!                                                           \-> RollingBack -> RolledBack
//! ```
//!
//! The artifact is only written while a backup exists (between `BackingUp`
//! and `Committed`/`RolledBack`). Every failure is turned into an
//! [`UpdateOutcome`]; nothing propagates past [`Updater::run`].

use hoist_core::BootstrapConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::download::Downloader;
use crate::error::{Result, UpdateError};
use crate::progress::ProgressSink;
use crate::releases::{Release, ReleaseResolver};
use crate::rollback::RollbackManager;

/// States of one update run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    Idle,
    Resolving,
    Comparing,
    UpToDate,
    BackingUp,
    Downloading,
    Committed,
    RollingBack,
    RolledBack,
}

impl UpdatePhase {
    /// Whether `next` is a legal successor of this phase
    pub fn can_advance_to(self, next: UpdatePhase) -> bool {
        use UpdatePhase::*;
        matches!(
            (self, next),
            (Idle, Resolving)
                | (Resolving, Comparing)
                | (Comparing, UpToDate)
                | (Comparing, BackingUp)
                | (BackingUp, Downloading)
                | (Downloading, Committed)
                | (Downloading, RollingBack)
                | (RollingBack, RolledBack)
        )
    }

    /// Whether the run ends in this phase
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            UpdatePhase::UpToDate | UpdatePhase::Committed | UpdatePhase::RolledBack
        )
    }
}

/// Terminal result of one update run
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Installed version already matches the latest release
    UpToDate,

    /// The artifact was replaced with the latest release
    Updated,

    /// The user aborted; the artifact is unchanged
    Cancelled,

    /// The update failed; the artifact was left as it was or restored
    Failed(UpdateError),
}

impl UpdateOutcome {
    /// Message to show the user, if any. Cancellation is deliberately silent.
    pub fn warning(&self) -> Option<String> {
        match self {
            UpdateOutcome::Failed(e) => Some(format!(
                "Update failed ({}), continuing with the installed version: {}",
                e.kind(),
                e
            )),
            _ => None,
        }
    }
}

/// Drives one update attempt against a single artifact
pub struct Updater {
    resolver: ReleaseResolver,
    downloader: Downloader,
    rollback: RollbackManager,
    endpoint: String,
    access_token: Option<String>,
    artifact_path: PathBuf,
}

impl Updater {
    /// Create an updater from the bootstrap settings
    pub fn new(config: &BootstrapConfig) -> Result<Self> {
        let downloader = Downloader::new(config)?;

        debug!(
            "Updater initialized: endpoint={}, artifact={:?}",
            config.endpoint, config.artifact_path
        );

        Ok(Self {
            resolver: ReleaseResolver::new(downloader.clone(), config.artifact_name.clone()),
            downloader,
            rollback: RollbackManager::new(),
            endpoint: config.endpoint.clone(),
            access_token: config.access_token.clone(),
            artifact_path: config.artifact_path.clone(),
        })
    }

    /// Run one update attempt.
    ///
    /// `current_version` is the installed version, `None` when nothing usable
    /// is installed (which never matches a release tag).
    pub async fn run(&self, current_version: Option<&str>, sink: &dyn ProgressSink) -> UpdateOutcome {
        let mut phase = PhaseTracker::new();

        phase.advance(UpdatePhase::Resolving);
        let release = match self
            .resolver
            .resolve_latest(&self.endpoint, self.access_token.as_deref(), sink)
            .await
        {
            Ok(release) => release,
            Err(e) if e.is_cancelled() => return UpdateOutcome::Cancelled,
            Err(e) => {
                debug!("Update check failed: {}", e);
                return UpdateOutcome::Failed(e);
            }
        };

        phase.advance(UpdatePhase::Comparing);
        info!("New version is: {}", release.tag());
        if current_version == Some(release.tag()) {
            phase.advance(UpdatePhase::UpToDate);
            info!("Already up to date!");
            return UpdateOutcome::UpToDate;
        }

        let url = match self.select_url(&release) {
            Ok(url) => url,
            Err(e) => {
                debug!("{}", e);
                return UpdateOutcome::Failed(e);
            }
        };

        info!("Attempting to update...");
        phase.advance(UpdatePhase::BackingUp);
        let backup = match self.rollback.backup(&self.artifact_path) {
            Ok(handle) => handle,
            Err(e) => {
                debug!("Could not back up artifact, skipping update: {}", e);
                return UpdateOutcome::Failed(e);
            }
        };
        let first_install = !backup.had_original();

        phase.advance(UpdatePhase::Downloading);
        let result = self
            .downloader
            .fetch_to_path(
                url,
                &self.artifact_path,
                self.access_token.as_deref(),
                sink,
            )
            .await;

        match result {
            Ok(_) => {
                self.rollback.commit(backup);
                phase.advance(UpdatePhase::Committed);
                if first_install {
                    mark_executable(&self.artifact_path);
                }
                info!("Update successful!");
                UpdateOutcome::Updated
            }
            Err(e) => {
                phase.advance(UpdatePhase::RollingBack);
                if let Err(rollback_err) = self.rollback.rollback(Some(backup)) {
                    error!(
                        "Rollback of {:?} failed: {}",
                        self.artifact_path, rollback_err
                    );
                }
                phase.advance(UpdatePhase::RolledBack);

                if e.is_cancelled() {
                    info!("Update cancelled, previous version kept");
                    UpdateOutcome::Cancelled
                } else {
                    debug!("Update download failed, rolled back: {}", e);
                    UpdateOutcome::Failed(e)
                }
            }
        }
    }

    /// Authenticated fetches must use the asset API URL; anonymous ones the
    /// public download URL.
    fn select_url<'a>(&self, release: &'a Release) -> Result<&'a str> {
        let url = if self.access_token.is_some() {
            release.asset_url()
        } else {
            release.download_url()
        };

        url.ok_or_else(|| {
            UpdateError::malformed(format!(
                "no asset named '{}' found in release {}",
                self.resolver.artifact_name(),
                release.tag()
            ))
        })
    }
}

struct PhaseTracker {
    current: UpdatePhase,
}

impl PhaseTracker {
    fn new() -> Self {
        Self {
            current: UpdatePhase::Idle,
        }
    }

    fn advance(&mut self, next: UpdatePhase) {
        debug_assert!(
            self.current.can_advance_to(next),
            "illegal update transition {:?} -> {:?}",
            self.current,
            next
        );
        debug!("Update phase: {:?} -> {:?}", self.current, next);
        self.current = next;
    }
}

/// Give a freshly installed artifact the executable bits
#[cfg(unix)]
fn mark_executable(path: &Path) {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let result = fs::metadata(path).and_then(|meta| {
        let mut perms = meta.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)
    });
    if let Err(e) = result {
        tracing::warn!("Failed to mark {:?} executable: {}", path, e);
    }
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) {}
