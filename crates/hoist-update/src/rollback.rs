//! Backup and restore of the installed artifact
//!
//! A backup is a hidden temporary copy created next to the artifact, so the
//! restore is a same-filesystem rename. The copy lives exactly as long as its
//! [`BackupHandle`]: committing or dropping the handle deletes it, rolling
//! back moves it over the artifact.

use std::fs::{self, File, Permissions};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Result, UpdateError};

/// Backup file extension
const BACKUP_EXT: &str = ".bak";

/// Snapshot of the artifact taken before mutation
#[derive(Debug)]
pub struct BackupHandle {
    /// Artifact the snapshot belongs to
    path: PathBuf,

    snapshot: Snapshot,
}

#[derive(Debug)]
enum Snapshot {
    /// Prior bytes and permissions
    Copy {
        file: NamedTempFile,
        permissions: Permissions,
    },

    /// Nothing was installed; restoring means removing what was written
    Absent,
}

impl BackupHandle {
    /// Artifact path this backup restores
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the snapshot file, if the artifact existed
    pub fn backup_path(&self) -> Option<&Path> {
        match &self.snapshot {
            Snapshot::Copy { file, .. } => Some(file.path()),
            Snapshot::Absent => None,
        }
    }

    /// Whether an artifact existed when the backup was taken
    pub fn had_original(&self) -> bool {
        matches!(self.snapshot, Snapshot::Copy { .. })
    }
}

/// Creates, restores and discards artifact backups
#[derive(Debug, Clone, Default)]
pub struct RollbackManager;

impl RollbackManager {
    pub fn new() -> Self {
        Self
    }

    /// Snapshot `path` before it is modified
    pub fn backup(&self, path: &Path) -> Result<BackupHandle> {
        let mut source = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No artifact at {:?}, backup records absence", path);
                return Ok(BackupHandle {
                    path: path.to_path_buf(),
                    snapshot: Snapshot::Absent,
                });
            }
            Err(e) => {
                return Err(UpdateError::io(
                    format!("Failed to read {}", path.display()),
                    e,
                ))
            }
        };

        let permissions = source
            .metadata()
            .map_err(|e| UpdateError::io(format!("Failed to stat {}", path.display()), e))?
            .permissions();

        let mut file = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name(path)))
            .suffix(BACKUP_EXT)
            .tempfile_in(parent_dir(path))
            .map_err(|e| UpdateError::io("Failed to create backup file", e))?;

        io::copy(&mut source, file.as_file_mut())
            .and_then(|_| file.as_file().sync_all())
            .map_err(|e| UpdateError::io(format!("Failed to back up {}", path.display()), e))?;

        info!("Backup created: {:?}", file.path());
        Ok(BackupHandle {
            path: path.to_path_buf(),
            snapshot: Snapshot::Copy { file, permissions },
        })
    }

    /// Put the snapshot back in place and discard it.
    ///
    /// `None` is accepted so callers can roll back unconditionally.
    pub fn rollback(&self, handle: Option<BackupHandle>) -> Result<()> {
        let Some(handle) = handle else {
            debug!("No backup to restore");
            return Ok(());
        };

        info!("Rolling back {:?}", handle.path);

        match handle.snapshot {
            Snapshot::Absent => match fs::remove_file(&handle.path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(UpdateError::io(
                        format!("Failed to remove partial {}", handle.path.display()),
                        e,
                    ))
                }
            },
            Snapshot::Copy { file, permissions } => {
                restore(file, permissions, &handle.path)?;
            }
        }

        info!("Rollback completed successfully");
        Ok(())
    }

    /// Discard the snapshot; the update is kept
    pub fn commit(&self, handle: BackupHandle) {
        match handle.snapshot {
            Snapshot::Copy { file, .. } => {
                let backup_path = file.path().to_path_buf();
                if let Err(e) = file.close() {
                    warn!("Failed to remove backup {:?}: {}", backup_path, e);
                } else {
                    debug!("Backup {:?} discarded", backup_path);
                }
            }
            Snapshot::Absent => {}
        }
    }
}

fn restore(file: NamedTempFile, permissions: Permissions, target: &Path) -> Result<()> {
    if let Err(e) = fs::set_permissions(file.path(), permissions) {
        warn!("Failed to reapply permissions to backup: {}", e);
    }

    // Rename first; fall back to copying the bytes over the target when the
    // rename is refused (e.g. the target is held open).
    match file.persist(target) {
        Ok(_) => Ok(()),
        Err(err) => {
            warn!("Atomic restore failed ({}), copying backup in place", err.error);
            let backup = err.file;
            let mut source = backup
                .reopen()
                .map_err(|e| UpdateError::io("Failed to reopen backup", e))?;
            let mut dest = File::create(target).map_err(|e| {
                UpdateError::io(format!("Failed to open {}", target.display()), e)
            })?;
            io::copy(&mut source, &mut dest)
                .and_then(|_| dest.sync_all())
                .map_err(|e| {
                    UpdateError::io(format!("Failed to restore {}", target.display()), e)
                })?;
            Ok(())
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string())
}
