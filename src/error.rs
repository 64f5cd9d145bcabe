//! Launch errors
//!
//! Every failure that can stop a launch surfaces as a [`LaunchError`]. Only
//! `main` turns one into a process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code used when no model directory could be resolved.
pub const EXIT_MODEL_DIR_NOT_FOUND: u8 = 2;

/// Exit code used for every other failure that carries no code of its own.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(
        "no model directory found: '{}' does not exist and no directory in {} matches '{}*'",
        .hint.display(),
        .search_root.display(),
        .prefix
    )]
    ModelDirectoryNotFound {
        hint: PathBuf,
        search_root: PathBuf,
        prefix: String,
    },

    #[error("failed to read config file {}: {reason}", .path.display())]
    ConfigFile { path: PathBuf, reason: String },

    #[error("could not start launcher '{program}': {source}")]
    LauncherUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("worker group failed ({})", describe_code(.code))]
    GroupFailed { code: Option<i32> },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl LaunchError {
    /// Process exit code for this failure.
    ///
    /// A failed worker group hands back its own code so wrapper scripts see
    /// what the launcher reported.
    pub fn exit_code(&self) -> u8 {
        match self {
            LaunchError::ModelDirectoryNotFound { .. } => EXIT_MODEL_DIR_NOT_FOUND,
            LaunchError::GroupFailed { code: Some(code) } => u8::try_from(*code)
                .ok()
                .filter(|code| *code != 0)
                .unwrap_or(EXIT_FAILURE),
            _ => EXIT_FAILURE,
        }
    }
}
