//! Shared constants for test infrastructure

use std::time::Duration;

// Version constants
pub const VERSION_1_0_0: &str = "1.0.0";
pub const VERSION_1_1_0: &str = "1.1.0";

// Artifact names
pub const ARTIFACT_NAME: &str = "hoist-app";
pub const ARTIFACT_NAME_UPPER: &str = "HOIST-APP";

// Feed and asset paths on the mock server
pub const FEED_PATH: &str = "/repos/hoist-dev/hoist-app/releases/latest";
pub const DOWNLOAD_PATH: &str = "/download/v1.1.0/hoist-app";
pub const ASSET_API_PATH: &str = "/repos/hoist-dev/hoist-app/releases/assets/42";

// Authentication
pub const ACCESS_TOKEN: &str = "secret-token";

// Artifact content
pub const ORIGINAL_CONTENT: &[u8] = b"original artifact bytes v1.0.0";
pub const NEW_CONTENT: &[u8] = b"replacement artifact bytes for v1.1.0, somewhat longer";

// Timing
pub const SHORT_READ_TIMEOUT: Duration = Duration::from_millis(300);
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Deterministic payload of `len` bytes
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
