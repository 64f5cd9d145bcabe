//! Checkpoint inspection
//!
//! Meta's llama checkpoints ship one `consolidated.NN.pth` shard per
//! model-parallel rank, so the shard count is the parallelism degree the
//! checkpoint was saved with.

use std::path::{Path, PathBuf};

/// What the launcher can tell about a model directory without loading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointInfo {
    /// Number of `consolidated.*.pth` shards
    pub shards: usize,
    /// Path to `params.json`, if present
    pub params_path: Option<PathBuf>,
}

impl CheckpointInfo {
    /// Inspect a model directory.
    pub fn inspect(dir: &Path) -> Self {
        let params = dir.join("params.json");
        Self {
            shards: count_shards(dir),
            params_path: params.is_file().then_some(params),
        }
    }

    /// Parallelism degree, when the directory holds any shards.
    pub fn parallelism(&self) -> Option<usize> {
        (self.shards > 0).then_some(self.shards)
    }
}

/// Count checkpoint shards in a directory
fn count_shards(dir: &Path) -> usize {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{escaped}/consolidated.*.pth");
    glob::glob(&pattern)
        .map(|paths| paths.filter_map(|r| r.ok()).count())
        .unwrap_or(0)
}
