//! Type definitions for hoist configuration

mod runtime_config;

pub use runtime_config::*;
