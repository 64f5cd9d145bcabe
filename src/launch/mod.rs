//! Launch orchestration
//!
//! The pipeline runs once per invocation, in this order:
//! - settings are resolved from the environment snapshot, config file and defaults
//! - the model directory is located
//! - the result is validated and frozen into a [`LaunchConfig`]
//! - the config is handed to a [`DistributedLauncher`]
//!
//! Every step before the hand-off is synchronous and side-effect free apart
//! from reading the filesystem.

mod invoker;
mod torchrun;
mod validate;

pub use invoker::{invoke, DistributedLauncher, LaunchRequest};
pub use torchrun::Torchrun;
pub use validate::{validate, LaunchConfig};

use std::path::{Path, PathBuf};

use crate::config::{EnvSettings, LauncherConfig, Overrides, ResolvedSettings};
use crate::error::LaunchError;
use crate::model::{locate_model_dir, CheckpointInfo, ModelDirPattern};

/// Resolve, locate and validate. No process is started.
pub fn prepare(
    env: &EnvSettings,
    file: &LauncherConfig,
    overrides: &Overrides,
    search_root: &Path,
    dialog_path: Option<PathBuf>,
) -> Result<LaunchConfig, LaunchError> {
    let settings = ResolvedSettings::resolve(env, file, overrides);
    let pattern = ModelDirPattern::new(settings.model_dir_prefix.clone());
    let resolution = locate_model_dir(&settings.model_dir, search_root, &pattern);
    let config = validate(settings, resolution, dialog_path)?;

    if let Some((requested, shards)) = parallelism_mismatch(&config, search_root) {
        tracing::warn!(
            "{} has {} checkpoint shard(s) but {} worker(s) were requested; the launch will likely fail",
            config.model_dir().display(),
            shards,
            requested
        );
    }
    if let Some(dialog_path) = config.dialog_path() {
        if !search_root.join(dialog_path).exists() {
            tracing::warn!("Dialog file {} does not exist", dialog_path.display());
        }
    }

    Ok(config)
}

/// Requested workers and checkpoint shards, when both are known and differ.
///
/// A mismatch does not stop the launch; the workers report the real error.
fn parallelism_mismatch(config: &LaunchConfig, search_root: &Path) -> Option<(usize, usize)> {
    let info = CheckpointInfo::inspect(&search_root.join(config.model_dir()));
    match (config.workers().count(), info.parallelism()) {
        (Some(requested), Some(shards)) if requested != shards => Some((requested, shards)),
        (_, None) => {
            tracing::debug!(
                "No consolidated.*.pth shards in {}",
                config.model_dir().display()
            );
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::env::{ENV_MODEL_DIR, ENV_NPROC_PER_NODE};

    fn sharded_checkpoint(shards: usize) -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let model = root.path().join("llama-2-13b-chat");
        fs::create_dir(&model).unwrap();
        for i in 0..shards {
            fs::write(model.join(format!("consolidated.{i:02}.pth")), b"").unwrap();
        }
        root
    }

    fn with_workers(workers: &str) -> EnvSettings {
        let workers = workers.to_string();
        EnvSettings::from_lookup(move |key| (key == ENV_NPROC_PER_NODE).then(|| workers.clone()))
    }

    #[test]
    fn test_prepare_discovers_directory() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("llama-2-7b-chat")).unwrap();
        fs::create_dir(root.path().join("notes")).unwrap();

        let env = EnvSettings::from_lookup(|key| (key == ENV_MODEL_DIR).then(|| "nowhere".into()));
        let config = prepare(
            &env,
            &LauncherConfig::default(),
            &Overrides::default(),
            root.path(),
            None,
        )
        .unwrap();
        assert_eq!(config.model_dir(), root.path().join("llama-2-7b-chat"));
    }

    #[test]
    fn test_prepare_fails_without_candidates() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("notes")).unwrap();

        let err = prepare(
            &EnvSettings::default(),
            &LauncherConfig::default(),
            &Overrides::default(),
            root.path(),
            Some(PathBuf::from("dialogs.json")),
        )
        .unwrap_err();
        assert!(matches!(err, LaunchError::ModelDirectoryNotFound { .. }));
    }

    #[test]
    fn test_worker_count_below_shard_count_is_flagged() {
        let root = sharded_checkpoint(2);
        let config = prepare(
            &with_workers("1"),
            &LauncherConfig::default(),
            &Overrides::default(),
            root.path(),
            None,
        )
        .unwrap();

        assert_eq!(parallelism_mismatch(&config, root.path()), Some((1, 2)));
    }

    #[test]
    fn test_matching_or_symbolic_worker_count_is_not_flagged() {
        let root = sharded_checkpoint(2);
        for workers in ["2", "gpu"] {
            let config = prepare(
                &with_workers(workers),
                &LauncherConfig::default(),
                &Overrides::default(),
                root.path(),
                None,
            )
            .unwrap();
            assert_eq!(parallelism_mismatch(&config, root.path()), None);
        }
    }
}
