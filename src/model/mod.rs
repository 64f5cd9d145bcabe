//! Model directory discovery.
//!
//! Finding the checkpoint folder and reading what can be learned from its
//! file listing. Loading weights is left to the inference framework.

mod checkpoint;
mod locate;

pub use checkpoint::CheckpointInfo;
pub use locate::{
    find_candidates, locate_model_dir, ModelDirPattern, Resolution, DEFAULT_MODEL_DIR_PREFIX,
};
