//! Launch command

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::{EnvSettings, LauncherConfig, Overrides};
use crate::error::LaunchError;
use crate::launch::{self, DistributedLauncher, LaunchRequest, Torchrun};

use super::LaunchArgs;

/// Resolve everything and start the worker group with torchrun
pub async fn launch(args: LaunchArgs) -> Result<()> {
    let env = EnvSettings::from_env();
    let search_root = std::env::current_dir().context("failed to read the working directory")?;

    run_launch(&Torchrun, args, &env, &search_root).await?;
    Ok(())
}

/// The launch pipeline with the launcher and environment supplied by the caller.
async fn run_launch<L: DistributedLauncher>(
    launcher: &L,
    args: LaunchArgs,
    env: &EnvSettings,
    search_root: &Path,
) -> Result<(), LaunchError> {
    let file = match &args.config {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            LauncherConfig::load(search_root.join(path))?
        }
        None => LauncherConfig::default(),
    };
    let overrides = Overrides {
        profile: args.profile,
        model_dir_prefix: args.model_prefix,
        entry_point: args.entry_point,
    };

    let config = launch::prepare(env, &file, &overrides, search_root, args.dialogs)?;
    tracing::info!(
        "Using model {} with {} worker(s), max_seq_len={}, max_batch_size={}",
        config.model_dir().display(),
        config.workers(),
        config.max_seq_len(),
        config.max_batch_size()
    );

    if args.dry_run {
        let request = LaunchRequest::new(&config, Some(search_root.to_path_buf()));
        println!("{}", request.command_line());
        return Ok(());
    }

    launch::invoke(launcher, config, Some(search_root.to_path_buf())).await
}
