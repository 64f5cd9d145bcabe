//! Hand-off to the distributed launcher

use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::WorkerCount;
use crate::error::LaunchError;

use super::LaunchConfig;

/// One call into the distributed launcher: start `workers` copies of
/// `entry_point` with `args`, as a single group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Launcher executable
    pub program: String,
    pub workers: WorkerCount,
    pub entry_point: String,
    /// Arguments for the entry point, in order
    pub args: Vec<OsString>,
    /// Working directory for the group; relative paths in `args` resolve here
    pub working_dir: Option<PathBuf>,
}

impl LaunchRequest {
    /// Build the request for a validated config.
    ///
    /// The dialog path goes last and only when one was given.
    pub fn new(config: &LaunchConfig, working_dir: Option<PathBuf>) -> Self {
        let mut args: Vec<OsString> = vec![
            "--ckpt_dir".into(),
            config.model_dir().into(),
            "--tokenizer_path".into(),
            config.tokenizer_path().into(),
            "--max_seq_len".into(),
            config.max_seq_len().into(),
            "--max_batch_size".into(),
            config.max_batch_size().into(),
        ];

        for (name, value) in config.generation().to_args() {
            args.push(name.into());
            args.push(value.into());
        }

        if let Some(dialog_path) = config.dialog_path() {
            args.push(dialog_path.into());
        }

        Self {
            program: config.launcher().to_string(),
            workers: config.workers().clone(),
            entry_point: config.entry_point().to_string(),
            args,
            working_dir,
        }
    }

    /// Full launcher argument vector, without the program itself.
    pub fn argv(&self) -> Vec<OsString> {
        let mut argv: Vec<OsString> = vec![
            "--nproc_per_node".into(),
            self.workers.to_string().into(),
            self.entry_point.clone().into(),
        ];
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Shell-like rendering for logs and `--dry-run`.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(
                self.argv()
                    .iter()
                    .map(|arg| quote(&arg.to_string_lossy())),
            )
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@+".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Something that can start a coordinated group of worker processes.
///
/// `run` returns once every worker has exited. A non-zero group exit, for
/// example when the requested worker count does not match the checkpoint's
/// parallelism degree, comes back as [`LaunchError::GroupFailed`]; the
/// launcher's own output is the diagnostic.
#[allow(async_fn_in_trait)]
pub trait DistributedLauncher {
    async fn run(&self, request: &LaunchRequest) -> Result<(), LaunchError>;
}

/// Consume a validated config and run it through `launcher`.
pub async fn invoke<L: DistributedLauncher>(
    launcher: &L,
    config: LaunchConfig,
    working_dir: Option<PathBuf>,
) -> Result<(), LaunchError> {
    let request = LaunchRequest::new(&config, working_dir);
    tracing::info!("Launching: {}", request.command_line());
    launcher.run(&request).await
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::{
        EnvSettings, GenerationOverrides, LauncherConfig, Overrides, ResolvedSettings,
    };
    use crate::launch::validate;
    use crate::model::Resolution;

    fn config(dialog: Option<&str>, generation: GenerationOverrides) -> LaunchConfig {
        let file = LauncherConfig {
            generation,
            ..Default::default()
        };
        let settings =
            ResolvedSettings::resolve(&EnvSettings::default(), &file, &Overrides::default());
        validate(
            settings,
            Resolution::Explicit(PathBuf::from("llama-2-7b-chat")),
            dialog.map(PathBuf::from),
        )
        .unwrap()
    }

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_argument_order() {
        let request = LaunchRequest::new(&config(None, Default::default()), None);
        assert_eq!(request.program, "torchrun");
        assert_eq!(
            strings(&request.argv()),
            vec![
                "--nproc_per_node",
                "1",
                "example_chat_completion.py",
                "--ckpt_dir",
                "llama-2-7b-chat",
                "--tokenizer_path",
                "tokenizer.model",
                "--max_seq_len",
                "256",
                "--max_batch_size",
                "6",
            ]
        );
    }

    #[test]
    fn test_dialog_path_is_appended_last() {
        let request = LaunchRequest::new(&config(Some("dialogs.json"), Default::default()), None);
        let args = strings(&request.args);
        assert_eq!(args.last().map(String::as_str), Some("dialogs.json"));
        assert_eq!(args.len(), 9);
    }

    #[test]
    fn test_missing_dialog_path_leaves_no_trace() {
        let request = LaunchRequest::new(&config(None, Default::default()), None);
        let args = strings(&request.args);
        assert_eq!(args.len(), 8);
        assert!(args.iter().all(|arg| !arg.is_empty()));
    }

    #[test]
    fn test_generation_overrides_precede_dialog() {
        let generation = GenerationOverrides {
            temperature: Some(0.6),
            ..Default::default()
        };
        let request = LaunchRequest::new(&config(Some("d.json"), generation), None);
        let args = strings(&request.args);
        assert_eq!(&args[8..], ["--temperature", "0.6", "d.json"]);
    }

    #[test]
    fn test_command_line_quotes_when_needed() {
        let config = config(Some("my dialogs.json"), Default::default());
        let mut request = LaunchRequest::new(&config, None);
        request.working_dir = Some(Path::new("/work").to_path_buf());
        let line = request.command_line();
        assert!(line.starts_with("torchrun --nproc_per_node 1 example_chat_completion.py"));
        assert!(line.ends_with("'my dialogs.json'"));
        assert_eq!(quote("it's"), r"'it'\''s'");
        assert_eq!(quote(""), "''");
    }
}
