//! Launch parameter validation

use std::path::{Path, PathBuf};

use crate::config::{parse_positive, GenerationOverrides, ResolvedSettings, WorkerCount};
use crate::error::LaunchError;
use crate::model::Resolution;

/// Frozen parameters for one launch attempt.
///
/// Only [`validate`] builds one, so holding a `LaunchConfig` means a model
/// directory was resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchConfig {
    workers: WorkerCount,
    model_dir: PathBuf,
    tokenizer_path: PathBuf,
    max_seq_len: String,
    max_batch_size: String,
    generation: GenerationOverrides,
    entry_point: String,
    launcher: String,
    dialog_path: Option<PathBuf>,
}

impl LaunchConfig {
    pub fn workers(&self) -> &WorkerCount {
        &self.workers
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn tokenizer_path(&self) -> &Path {
        &self.tokenizer_path
    }

    pub fn max_seq_len(&self) -> &str {
        &self.max_seq_len
    }

    pub fn max_batch_size(&self) -> &str {
        &self.max_batch_size
    }

    pub fn generation(&self) -> &GenerationOverrides {
        &self.generation
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Distributed launcher executable
    pub fn launcher(&self) -> &str {
        &self.launcher
    }

    pub fn dialog_path(&self) -> Option<&Path> {
        self.dialog_path.as_deref()
    }
}

/// Freeze the settings once a model directory has been found.
///
/// An unresolved directory aborts the launch. Nothing else is checked;
/// odd-looking numbers and worker counts are only reported, since the
/// launcher and entry point have the final say on them.
pub fn validate(
    settings: ResolvedSettings,
    resolution: Resolution,
    dialog_path: Option<PathBuf>,
) -> Result<LaunchConfig, LaunchError> {
    let model_dir = match resolution {
        Resolution::Explicit(path) | Resolution::Discovered { path, .. } => path,
        Resolution::Unresolved {
            hint,
            search_root,
            prefix,
        } => {
            return Err(LaunchError::ModelDirectoryNotFound {
                hint,
                search_root,
                prefix,
            })
        }
    };

    if let Err(e) = parse_positive("max_batch_size", &settings.max_batch_size) {
        tracing::warn!("{e}; passing it to the launcher anyway");
    }
    if let Err(e) = parse_positive("max_seq_len", &settings.max_seq_len) {
        tracing::warn!("{e}; passing it to the launcher anyway");
    }
    if !settings.workers.is_recognized() {
        tracing::warn!(
            "nproc_per_node '{}' is not auto, cpu, gpu or a positive integer; passing it to the launcher anyway",
            settings.workers
        );
    }

    Ok(LaunchConfig {
        workers: settings.workers,
        model_dir,
        tokenizer_path: settings.tokenizer_path,
        max_seq_len: settings.max_seq_len,
        max_batch_size: settings.max_batch_size,
        generation: settings.generation,
        entry_point: settings.entry_point,
        launcher: settings.launcher,
        dialog_path,
    })
}
