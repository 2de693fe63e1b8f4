//! # hoist-core
//!
//! Core library for hoist providing:
//! - Runtime configuration types (network, release feed, display)
//! - Hierarchical configuration loading (embedded, file, environment)
//! - The immutable [`BootstrapConfig`] handed to the updater

pub mod config;
pub mod error;
pub mod types;

pub use config::{BootstrapConfig, ConfigOverrides, HierarchicalConfigLoader};
pub use error::{Error, Result};
pub use types::RuntimeConfig;
