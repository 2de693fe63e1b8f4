//! hoist - keep an installed artifact current, then run it
//!
//! This is the main entry point for the hoist launcher.

mod bootstrap;
mod cli;
mod output;
mod progress_ui;

use anyhow::Result;
use clap::Parser;
use hoist_core::{BootstrapConfig, HierarchicalConfigLoader};
use hoist_update::ProcessLoader;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let runtime = HierarchicalConfigLoader::new()?.load_runtime_config()?;
    let config = BootstrapConfig::resolve(&runtime, cli.overrides());

    match bootstrap::run(&config, &ProcessLoader::new(), &cli.args).await {
        Ok(outcome) => Ok(ExitCode::from(bootstrap::exit_status(&outcome))),
        Err(e) => {
            output::error(&format!("{:#}", e));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Status lines ("Current version", "New version", ...) are info
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
