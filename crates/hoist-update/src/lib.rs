//! Self-update engine for hoist
//!
//! Provides:
//! - Latest-release resolution from a GitHub-style release feed
//! - Streaming artifact download with throttled progress and cancellation
//! - Backup of the installed artifact and rollback on failure
//! - Update orchestration producing a single [`UpdateOutcome`]
//! - The loader boundary used to read the installed version and run it

pub mod download;
pub mod error;
pub mod loader;
pub mod progress;
pub mod releases;
pub mod rollback;
pub mod updater;

pub use download::Downloader;
pub use error::{ErrorKind, Result, UpdateError};
pub use loader::{current_version, LoadError, LoadOutcome, Loader, ProcessLoader};
pub use progress::{
    CancellationToken, ChannelSink, NoopSink, ProgressEvent, ProgressMessage, ProgressSink,
};
pub use releases::{Release, ReleaseResolver};
pub use rollback::{BackupHandle, RollbackManager};
pub use updater::{UpdateOutcome, UpdatePhase, Updater};
