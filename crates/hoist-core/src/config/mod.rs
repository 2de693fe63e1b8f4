//! Configuration loading and management

mod bootstrap;
mod hierarchical_loader;

pub use bootstrap::{BootstrapConfig, ConfigOverrides};
pub use hierarchical_loader::HierarchicalConfigLoader;
