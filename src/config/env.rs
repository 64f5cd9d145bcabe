//! Environment-driven settings resolution
//!
//! The process environment is read once, into [`EnvSettings`]. Everything
//! after that works on the snapshot, never on `std::env`.

use std::path::PathBuf;

use super::{GenerationOverrides, LauncherConfig, Profile, WorkerCount};
use crate::model::DEFAULT_MODEL_DIR_PREFIX;

/// Workers to start per node.
pub const ENV_NPROC_PER_NODE: &str = "NPROC_PER_NODE";
/// Model directory override.
pub const ENV_MODEL_DIR: &str = "MODEL_DIR";
/// Maximum batch size passed to every worker.
pub const ENV_MAX_BATCH_SIZE: &str = "MAX_BATCH_SIZE";
/// Maximum sequence length passed to every worker.
pub const ENV_MAX_SEQ_LEN: &str = "MAX_SEQ_LEN";

pub const DEFAULT_NPROC_PER_NODE: &str = "1";
pub const DEFAULT_MODEL_DIR: &str = "llama-2-7b-chat";
pub const DEFAULT_MAX_BATCH_SIZE: &str = "6";
pub const DEFAULT_TOKENIZER_PATH: &str = "tokenizer.model";
pub const DEFAULT_ENTRY_POINT: &str = "example_chat_completion.py";
pub const DEFAULT_LAUNCHER: &str = "torchrun";

/// Launch-relevant environment variables, captured once.
///
/// Unset and empty variables are both recorded as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSettings {
    pub nproc_per_node: Option<String>,
    pub model_dir: Option<String>,
    pub max_batch_size: Option<String>,
    pub max_seq_len: Option<String>,
}

impl EnvSettings {
    /// Read from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            nproc_per_node: get(ENV_NPROC_PER_NODE),
            model_dir: get(ENV_MODEL_DIR),
            max_batch_size: get(ENV_MAX_BATCH_SIZE),
            max_seq_len: get(ENV_MAX_SEQ_LEN),
        }
    }
}

/// Values given on the command line. They beat the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub profile: Option<Profile>,
    pub model_dir_prefix: Option<String>,
    pub entry_point: Option<String>,
}

/// Launch settings after all layers are merged, before the model directory
/// has been located.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub profile: Profile,
    pub workers: WorkerCount,
    /// Directory hint; may not exist yet
    pub model_dir: PathBuf,
    pub max_batch_size: String,
    pub max_seq_len: String,
    pub tokenizer_path: PathBuf,
    pub entry_point: String,
    pub launcher: String,
    pub model_dir_prefix: String,
    pub generation: GenerationOverrides,
}

impl ResolvedSettings {
    /// Merge environment, config file and defaults.
    ///
    /// Environment wins over the file, the file wins over defaults. The
    /// profile only changes defaults, so an explicit `MAX_SEQ_LEN` still
    /// applies under the fixed profile.
    pub fn resolve(env: &EnvSettings, file: &LauncherConfig, overrides: &Overrides) -> Self {
        let profile = overrides.profile.or(file.profile).unwrap_or_default();

        let workers = pick(
            "nproc_per_node",
            env.nproc_per_node.clone(),
            file.nproc_per_node.as_ref().map(ToString::to_string),
            DEFAULT_NPROC_PER_NODE,
        );
        let model_dir = pick(
            "model_dir",
            env.model_dir.clone(),
            file.model_dir.clone(),
            DEFAULT_MODEL_DIR,
        );
        let max_batch_size = pick(
            "max_batch_size",
            env.max_batch_size.clone(),
            file.max_batch_size.as_ref().map(ToString::to_string),
            DEFAULT_MAX_BATCH_SIZE,
        );
        let max_seq_len = pick(
            "max_seq_len",
            env.max_seq_len.clone(),
            file.max_seq_len.as_ref().map(ToString::to_string),
            profile.default_max_seq_len(),
        );

        Self {
            profile,
            workers: WorkerCount::from(workers.as_str()),
            model_dir: PathBuf::from(model_dir),
            max_batch_size,
            max_seq_len,
            tokenizer_path: PathBuf::from(
                file.tokenizer_path
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TOKENIZER_PATH.to_string()),
            ),
            entry_point: overrides
                .entry_point
                .clone()
                .or_else(|| file.entry_point.clone())
                .unwrap_or_else(|| DEFAULT_ENTRY_POINT.to_string()),
            launcher: file
                .launcher
                .clone()
                .unwrap_or_else(|| DEFAULT_LAUNCHER.to_string()),
            model_dir_prefix: overrides
                .model_dir_prefix
                .clone()
                .or_else(|| file.model_dir_prefix.clone())
                .unwrap_or_else(|| DEFAULT_MODEL_DIR_PREFIX.to_string()),
            generation: file.generation.clone(),
        }
    }

    /// Environment and defaults only.
    pub fn from_env(env: &EnvSettings) -> Self {
        Self::resolve(env, &LauncherConfig::default(), &Overrides::default())
    }
}

fn pick(name: &str, env: Option<String>, file: Option<String>, default: &str) -> String {
    if let Some(value) = env {
        tracing::debug!("{name}: using environment value '{value}'");
        value
    } else if let Some(value) = file.filter(|value| !value.is_empty()) {
        tracing::debug!("{name}: using config file value '{value}'");
        value
    } else {
        tracing::debug!("{name}: using default '{default}'");
        default.to_string()
    }
}
