//! Common test infrastructure for hoist-update tests
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: Version strings, artifact names, test data
//! - `builders`: Fluent builder for release feed documents
//! - `logs`: Capture of WARN-level tracing output
//! - `mock_server`: Wiremock setup helpers for feed and artifact endpoints
//! - `stream_server`: Raw TCP servers for paced, truncated and stalled bodies
//! - `sinks`: Recording and cancelling progress sinks
//! - `updater_helpers`: Artifact files, scripts and config helpers

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod logs;
pub mod mock_server;
pub mod stream_server;
pub mod updater_helpers;

pub use builders::*;
pub use constants::*;
pub use logs::*;
pub use mock_server::*;
pub use sinks::*;
pub use stream_server::*;
pub use updater_helpers::*;
