//! The launch sequence: an optional update attempt, then hand-off to the artifact

use anyhow::Result;
use hoist_core::BootstrapConfig;
use hoist_update::{
    current_version, CancellationToken, ChannelSink, LoadOutcome, Loader, NoopSink,
    UpdateOutcome, Updater,
};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{output, progress_ui};

/// Update the artifact if needed, then run it with `args`.
///
/// Update problems never stop the launch; only a failure to start the
/// artifact is an error.
pub async fn run(
    config: &BootstrapConfig,
    loader: &dyn Loader,
    args: &[String],
) -> Result<LoadOutcome> {
    if config.skip_update {
        info!("Update check skipped");
    } else {
        let outcome = update(config, loader).await;
        report(&outcome);
    }

    let outcome = loader.load(&config.artifact_path, args).await?;
    debug!("Artifact exited with {:?}", outcome.exit_code);
    Ok(outcome)
}

async fn update(config: &BootstrapConfig, loader: &dyn Loader) -> UpdateOutcome {
    let updater = match Updater::new(config) {
        Ok(updater) => updater,
        Err(e) => return UpdateOutcome::Failed(e),
    };

    let current = current_version(loader, &config.artifact_path).await;
    let token = CancellationToken::new();

    if config.ui_enabled && console::user_attended_stderr() {
        let (sink, receiver) = ChannelSink::new(token.clone());
        let display = progress_ui::spawn(receiver, token);
        let outcome = updater.run(current.as_deref(), &sink).await;

        // Closing the channel ends the display task.
        drop(sink);
        if let Err(e) = display.await {
            debug!("Progress display ended abnormally: {}", e);
        }
        outcome
    } else {
        let interrupt = watch_interrupt(token.clone());
        let outcome = updater
            .run(current.as_deref(), &NoopSink::with_token(token))
            .await;
        interrupt.abort();
        outcome
    }
}

/// Headless runs still cancel on Ctrl-C
fn watch_interrupt(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, cancelling update");
            token.cancel();
        }
    })
}

/// Only failures are shown; a cancelled update is silent
fn report(outcome: &UpdateOutcome) {
    if let Some(warning) = outcome.warning() {
        output::warning(&warning);
    }
}

/// Process exit status mirroring the artifact's own
pub fn exit_status(outcome: &LoadOutcome) -> u8 {
    outcome
        .exit_code
        .and_then(|code| u8::try_from(code).ok())
        .unwrap_or(1)
}
