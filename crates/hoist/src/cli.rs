//! CLI argument parsing with clap

use clap::Parser;
use hoist_core::ConfigOverrides;
use std::path::PathBuf;

/// hoist - update an installed artifact from its release feed, then run it
#[derive(Parser, Debug)]
#[command(name = "hoist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Release feed endpoint
    #[arg(long, value_name = "URL")]
    pub update_url: Option<String>,

    /// Access token for private release feeds
    #[arg(long, value_name = "TOKEN")]
    pub update_token: Option<String>,

    /// Skip the update check and run the installed artifact
    #[arg(long)]
    pub no_update: bool,

    /// Location of the artifact
    #[arg(long, value_name = "PATH")]
    pub artifact: Option<PathBuf>,

    /// Disable the interactive progress display
    #[arg(short = 'g', long)]
    pub no_gui: bool,

    /// Arguments passed to the artifact
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

impl Cli {
    /// Flags that override the loaded configuration
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            update_url: self.update_url.clone(),
            access_token: self.update_token.clone(),
            artifact_path: self.artifact.clone(),
            no_gui: self.no_gui,
            skip_update: self.no_update,
        }
    }
}
