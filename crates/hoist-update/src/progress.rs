//! Progress reporting and cooperative cancellation for network transfers
//!
//! Transfers report through a [`ProgressSink`] and poll it for cancellation
//! at every chunk boundary. A sink may live on another execution context
//! (an interactive display), so nothing here assumes the observer runs
//! synchronously on the transfer's task:
//! - [`NoopSink`] for headless runs
//! - [`ChannelSink`] posts [`ProgressMessage`]s to a UI task and reads a
//!   [`CancellationToken`] that the UI task sets

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Default minimum spacing between progress reports
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// One progress observation within a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Bytes received so far; never decreases within one transfer
    pub bytes_read: u64,

    /// Advertised size, if the response declared one
    pub total_size: Option<u64>,

    /// Whether cancellation had been requested when the event was produced
    pub cancelled: bool,
}

/// Shared cancellation flag
///
/// Clones observe the same flag. Setting it is sticky for the lifetime of
/// the token.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Observer and cancellation source for one long-running transfer
pub trait ProgressSink: Send + Sync {
    /// A transfer labelled `label` is starting
    fn begin(&self, _label: &str) {}

    /// Report progress for the current transfer
    fn report_progress(&self, event: &ProgressEvent);

    /// Polled at every chunk boundary
    fn is_cancelled(&self) -> bool;

    /// The current transfer ended, successfully or not
    fn finish(&self) {}
}

/// Sink that discards progress; cancellable only through its token
#[derive(Debug, Clone, Default)]
pub struct NoopSink {
    token: Option<CancellationToken>,
}

impl NoopSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Honor cancellation requested through `token` (e.g. by a signal handler)
    pub fn with_token(token: CancellationToken) -> Self {
        Self { token: Some(token) }
    }
}

impl ProgressSink for NoopSink {
    fn report_progress(&self, _event: &ProgressEvent) {}

    fn is_cancelled(&self) -> bool {
        self.token.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

/// Messages posted from a transfer to the UI context
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    /// Open a progress display with this label
    Begin(String),

    /// Update the display
    Progress(ProgressEvent),

    /// Close the display
    Finish,
}

/// UI-backed sink
///
/// Progress flows to the UI as queued messages; cancellation flows back as a
/// token the UI sets. A closed receiver is ignored: the transfer keeps going
/// without a display.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<ProgressMessage>,
    token: CancellationToken,
}

impl ChannelSink {
    /// Create a sink and the receiving end for the UI task
    pub fn new(token: CancellationToken) -> (Self, mpsc::UnboundedReceiver<ProgressMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender, token }, receiver)
    }

    /// The token the UI context should set to cancel
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    fn post(&self, message: ProgressMessage) {
        let _ = self.sender.send(message);
    }
}

impl ProgressSink for ChannelSink {
    fn begin(&self, label: &str) {
        self.post(ProgressMessage::Begin(label.to_string()));
    }

    fn report_progress(&self, event: &ProgressEvent) {
        self.post(ProgressMessage::Progress(*event));
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    fn finish(&self) {
        self.post(ProgressMessage::Finish);
    }
}

/// Rate limiter for progress reports
///
/// The first report always passes; after that at most one per interval.
/// The terminal report bypasses the limiter via [`ProgressThrottle::force`].
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Whether a report may be emitted at `now`; records it if so
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Record an unconditional report at `now`
    pub fn force(&mut self, now: Instant) {
        self.last = Some(now);
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}
