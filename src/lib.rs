//! llama-launch - start distributed llama inference runs
//!
//! llama-launch works out how a llama chat-completion run should be started
//! and hands it to `torchrun`. It does no inference itself.
//!
//! # Architecture
//!
//! - **config**: environment snapshot, config file, defaults
//! - **model**: model directory discovery
//! - **launch**: validation and the hand-off to the distributed launcher
//! - **cli**: command-line surface
//!
//! # Environment
//!
//! | Variable         | Default           |
//! |------------------|-------------------|
//! | `NPROC_PER_NODE` | `1`               |
//! | `MODEL_DIR`      | `llama-2-7b-chat` |
//! | `MAX_BATCH_SIZE` | `6`               |
//! | `MAX_SEQ_LEN`    | `256`             |
//!
//! # Example
//!
//! ```bash
//! # Find a llama-2-* directory and start one worker
//! llama-launch dialogs.json
//!
//! # Two GPUs, longer context, print instead of launching
//! NPROC_PER_NODE=2 MAX_SEQ_LEN=1024 llama-launch launch --dry-run
//!
//! # Show candidate model directories
//! llama-launch list
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod launch;
pub mod logging;
pub mod model;

// Re-export key types
pub use config::{EnvSettings, LauncherConfig, Profile, ResolvedSettings, WorkerCount};
pub use error::LaunchError;
pub use launch::{DistributedLauncher, LaunchConfig, LaunchRequest, Torchrun};
pub use model::{ModelDirPattern, Resolution};
