//! Model directory resolution
//!
//! An explicit hint wins when it names a directory. Otherwise the immediate
//! children of the search root are scanned for names starting with the
//! configured prefix. Matches are sorted by name so the pick does not depend
//! on the order the filesystem lists entries in.

use std::path::{Path, PathBuf};

/// Prefix Meta's llama 2 checkpoint folders share.
pub const DEFAULT_MODEL_DIR_PREFIX: &str = "llama-2-";

/// Naming rule for model directories discovered by search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDirPattern {
    prefix: String,
}

impl ModelDirPattern {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }
}

impl Default for ModelDirPattern {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_DIR_PREFIX)
    }
}

/// Outcome of a model directory lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The hint named an existing directory and is returned unchanged
    Explicit(PathBuf),
    /// Found by searching; `passed_over` lists other matches, in order
    Discovered {
        path: PathBuf,
        passed_over: Vec<PathBuf>,
    },
    /// Nothing usable
    Unresolved {
        hint: PathBuf,
        search_root: PathBuf,
        prefix: String,
    },
}

impl Resolution {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Resolution::Explicit(path) | Resolution::Discovered { path, .. } => Some(path),
            Resolution::Unresolved { .. } => None,
        }
    }
}

/// Resolve the model directory.
///
/// A relative `hint` is checked against `search_root`, which is also where
/// the launcher runs, so the hint can be forwarded as given.
pub fn locate_model_dir(hint: &Path, search_root: &Path, pattern: &ModelDirPattern) -> Resolution {
    if !hint.as_os_str().is_empty() && search_root.join(hint).is_dir() {
        tracing::debug!("Using model directory {}", hint.display());
        return Resolution::Explicit(hint.to_path_buf());
    }

    tracing::info!(
        "Model directory '{}' not found, searching {} for '{}*'",
        hint.display(),
        search_root.display(),
        pattern.prefix()
    );

    let mut matches = find_candidates(search_root, pattern).into_iter();
    let Some(path) = matches.next() else {
        return Resolution::Unresolved {
            hint: hint.to_path_buf(),
            search_root: search_root.to_path_buf(),
            prefix: pattern.prefix().to_string(),
        };
    };
    let passed_over: Vec<PathBuf> = matches.collect();

    if passed_over.is_empty() {
        tracing::info!("Found model directory {}", path.display());
    } else {
        tracing::warn!(
            "{} directories match '{}*'; using {} and ignoring {}",
            passed_over.len() + 1,
            pattern.prefix(),
            path.display(),
            passed_over
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Resolution::Discovered { path, passed_over }
}

/// Immediate subdirectories of `root` matching `pattern`, sorted by name.
///
/// An unreadable root yields no candidates.
pub fn find_candidates(root: &Path, pattern: &ModelDirPattern) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot read {}: {}", root.display(), e);
            return Vec::new();
        }
    };

    let mut candidates: Vec<(String, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            let path = entry.path();
            (pattern.matches(&name) && path.is_dir()).then_some((name, path))
        })
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0));
    candidates.into_iter().map(|(_, path)| path).collect()
}
