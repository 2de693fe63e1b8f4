//! Terminal rendering of update progress
//!
//! Runs as its own task. Transfers never touch the display: they post
//! [`ProgressMessage`]s that this task applies in order. Ctrl-C while the
//! display is running requests cancellation through the shared token.

use hoist_update::{CancellationToken, ProgressEvent, ProgressMessage};
use indicatif::ProgressBar;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::output;

/// Start the display task; it ends once every sender is dropped
pub fn spawn(
    receiver: UnboundedReceiver<ProgressMessage>,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(render(receiver, token))
}

async fn render(mut receiver: UnboundedReceiver<ProgressMessage>, token: CancellationToken) {
    let mut display = Display::default();
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    let mut interrupted = false;

    loop {
        tokio::select! {
            message = receiver.recv() => match message {
                Some(message) => display.apply(message),
                None => break,
            },
            result = &mut interrupt, if !interrupted => {
                interrupted = true;
                match result {
                    Ok(()) => {
                        debug!("Interrupt received, cancelling update");
                        display.set_message("Cancelling...");
                        token.cancel();
                    }
                    Err(e) => debug!("Could not listen for Ctrl-C: {}", e),
                }
            }
        }
    }

    display.clear();
}

/// The progress bar of the transfer in flight, if any
#[derive(Default)]
struct Display {
    bar: Option<ProgressBar>,
}

impl Display {
    fn apply(&mut self, message: ProgressMessage) {
        match message {
            ProgressMessage::Begin(label) => {
                self.clear();
                self.bar = Some(output::transfer_spinner(&label));
            }
            ProgressMessage::Progress(event) => {
                if let Some(bar) = &self.bar {
                    update_bar(bar, &event);
                }
            }
            ProgressMessage::Finish => self.clear(),
        }
    }

    fn set_message(&self, msg: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(msg.to_string());
        }
    }

    fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Switch from spinner to bar as soon as the size is known
fn update_bar(bar: &ProgressBar, event: &ProgressEvent) {
    if let Some(total) = event.total_size {
        if bar.length() != Some(total) {
            bar.set_length(total);
            bar.set_style(output::transfer_bar_style());
        }
    }
    bar.set_position(event.bytes_read);
}
