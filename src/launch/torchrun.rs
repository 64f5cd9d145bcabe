//! torchrun-backed launcher

use std::io;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::LaunchError;

use super::{DistributedLauncher, LaunchRequest};

/// Runs the request through `torchrun` (or any launcher taking the same
/// arguments) with inherited stdio, so worker output and launcher errors
/// reach the operator untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Torchrun;

impl DistributedLauncher for Torchrun {
    async fn run(&self, request: &LaunchRequest) -> Result<(), LaunchError> {
        let mut cmd = Command::new(&request.program);
        cmd.args(request.argv())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &request.working_dir {
            cmd.current_dir(dir);
        }

        let status = match cmd.status().await {
            Ok(status) => status,
            Err(source) => {
                if source.kind() == io::ErrorKind::NotFound {
                    tracing::error!("{} not found in PATH", request.program);
                    tracing::error!(
                        "Install PyTorch in the active environment or set `launcher` in the config file"
                    );
                }
                return Err(LaunchError::LauncherUnavailable {
                    program: request.program.clone(),
                    source,
                });
            }
        };

        if status.success() {
            tracing::info!("Worker group exited cleanly");
            Ok(())
        } else {
            tracing::error!("Worker group failed with exit code: {:?}", status.code());
            Err(LaunchError::GroupFailed {
                code: status.code(),
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::WorkerCount;

    fn request(program: &str) -> LaunchRequest {
        LaunchRequest {
            program: program.to_string(),
            workers: WorkerCount::default(),
            entry_point: "example_chat_completion.py".to_string(),
            args: vec![],
            working_dir: None,
        }
    }

    #[tokio::test]
    async fn test_successful_group() {
        Torchrun.run(&request("true")).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_group_reports_exit_code() {
        let err = Torchrun.run(&request("false")).await.unwrap_err();
        assert!(matches!(err, LaunchError::GroupFailed { code: Some(1) }));
    }

    #[tokio::test]
    async fn test_missing_launcher() {
        let err = Torchrun
            .run(&request("llama-launch-no-such-launcher"))
            .await
            .unwrap_err();
        match err {
            LaunchError::LauncherUnavailable { program, source } => {
                assert_eq!(program, "llama-launch-no-such-launcher");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected LauncherUnavailable, got {other:?}"),
        }
    }
}
