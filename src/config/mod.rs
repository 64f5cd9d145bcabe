//! Configuration system for llama-launch
//!
//! Launch parameters come from three layers, highest priority first:
//! environment variables, an optional config file, built-in defaults.
//! [`env`] reads the environment once and merges the layers; this module
//! owns the config file format.

pub mod env;
mod generation;
mod workers;

pub use env::{EnvSettings, Overrides, ResolvedSettings};
pub use generation::GenerationOverrides;
pub use workers::WorkerCount;

use std::fmt;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::LaunchError;

/// File name the chat front-end reads its settings from.
pub const DEFAULT_CONFIG_FILE: &str = "llama_steve_config.json";

/// Which set of defaults applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Environment-driven launch with a short context window
    #[default]
    Flexible,
    /// Pinned launch settings with a longer context window
    Fixed,
}

impl Profile {
    pub fn default_max_seq_len(self) -> &'static str {
        match self {
            Profile::Flexible => "256",
            Profile::Fixed => "512",
        }
    }
}

/// A config value written either as a number or as text.
///
/// `nproc_per_node` may be `2` or `"gpu"`; both forms round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(u64),
    Text(String),
}

impl Scalar {
    /// Store integers as numbers so the file stays readable by the chat front-end.
    pub fn from_text(value: &str) -> Self {
        match value.parse::<u64>() {
            Ok(n) => Scalar::Number(n),
            Err(_) => Scalar::Text(value.to_string()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// On-disk launcher configuration.
///
/// Field names match the chat front-end's config file, so one file drives
/// both. Unset fields fall through to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LauncherConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nproc_per_node: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_batch_size: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_seq_len: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer_path: Option<String>,

    /// Script or module the launcher runs on every worker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,

    /// Distributed launcher executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launcher: Option<String>,

    /// Name prefix used when searching for a model directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_dir_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,

    #[serde(flatten)]
    pub generation: GenerationOverrides,
}

impl LauncherConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, picking the format from the file extension.
    ///
    /// `.yaml` and `.yml` are read as YAML, everything else as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, LaunchError> {
        let path = path.as_ref();
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let loaded = if is_yaml {
            Self::from_yaml(path)
        } else {
            Self::from_json(path)
        };
        loaded.map_err(|err| LaunchError::ConfigFile {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// Snapshot fully resolved settings into a config file.
    pub fn from_settings(settings: &ResolvedSettings) -> Self {
        Self {
            nproc_per_node: Some(Scalar::from_text(&settings.workers.to_string())),
            model_dir: Some(settings.model_dir.display().to_string()),
            max_batch_size: Some(Scalar::from_text(&settings.max_batch_size)),
            max_seq_len: Some(Scalar::from_text(&settings.max_seq_len)),
            tokenizer_path: Some(settings.tokenizer_path.display().to_string()),
            entry_point: Some(settings.entry_point.clone()),
            launcher: Some(settings.launcher.clone()),
            model_dir_prefix: Some(settings.model_dir_prefix.clone()),
            profile: Some(settings.profile),
            generation: settings.generation.clone(),
        }
    }

    /// Write as pretty JSON. An existing file is only replaced when `force` is set.
    pub fn save_json<P: AsRef<Path>>(&self, path: P, force: bool) -> Result<()> {
        let path = path.as_ref();
        if path.exists() && !force {
            bail!(
                "{} already exists; pass --force to overwrite it",
                path.display()
            );
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Parse a positive integer setting, for diagnostics only.
///
/// Launch settings stay text all the way to the launcher; this is used to
/// warn about values the entry point will probably reject.
pub fn parse_positive(name: &str, value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(anyhow!("{name} must be positive, got 0")),
        Ok(n) => Ok(n),
        Err(_) => Err(anyhow!("{name} is not an integer: '{value}'")),
    }
}
