//! CLI commands
//!
//! Running `llama-launch` without a subcommand is the same as `llama-launch launch`,
//! which keeps the old `run.sh [dialogs.json]` calling convention working.

mod init;
mod launch;
mod list;

pub use init::init_config;
pub use launch::launch;
pub use list::list;

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::config::{Profile, DEFAULT_CONFIG_FILE};

/// llama-launch - start distributed llama inference runs
#[derive(Parser)]
#[command(name = "llama-launch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub launch: LaunchArgs,
}

impl Cli {
    /// The command to run; a bare invocation launches.
    ///
    /// Launch options placed before a subcommand are rejected instead of
    /// being dropped.
    pub fn into_command(self) -> Result<Commands, clap::Error> {
        match self.command {
            None => Ok(Commands::Launch(self.launch)),
            Some(_) if self.launch != LaunchArgs::default() => Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                "launch options must follow the subcommand, e.g. `llama-launch launch --dry-run`",
            )),
            Some(command) => Ok(command),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve settings, find the model directory and start the workers
    Launch(LaunchArgs),

    /// List model directories the launcher would consider
    List {
        /// Show checkpoint details for each directory
        #[arg(long, short)]
        verbose: bool,

        /// Directory name prefix to search for
        #[arg(long)]
        model_prefix: Option<String>,
    },

    /// Write the resolved settings to a config file
    InitConfig {
        /// Output file
        #[arg(long, short, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,

        /// Settings profile
        #[arg(long, value_enum)]
        profile: Option<Profile>,
    },
}

/// Options for a launch.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchArgs {
    /// Dialog file handed to the entry point as-is
    ///
    /// A file named like a subcommand (`launch`, `list`, `init-config`) is
    /// read as that subcommand; pass it as `./list` instead.
    pub dialogs: Option<PathBuf>,

    /// Config file (JSON, or YAML by extension); environment variables still win
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Settings profile (fixed raises the default max_seq_len to 512)
    #[arg(long, value_enum)]
    pub profile: Option<Profile>,

    /// Directory name prefix used when MODEL_DIR does not exist
    #[arg(long)]
    pub model_prefix: Option<String>,

    /// Script the launcher runs on every worker
    #[arg(long)]
    pub entry_point: Option<String>,

    /// Print the launcher command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}
