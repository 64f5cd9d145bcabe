//! Config file initialisation command

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{EnvSettings, LauncherConfig, Overrides, Profile, ResolvedSettings};
use crate::model::{locate_model_dir, ModelDirPattern};

/// Write the current environment and defaults out as a config file
pub async fn init_config(output: PathBuf, force: bool, profile: Option<Profile>) -> Result<()> {
    let search_root = std::env::current_dir().context("failed to read the working directory")?;
    let config = snapshot(&EnvSettings::from_env(), profile, &search_root);

    let path = search_root.join(&output);
    config.save_json(&path, force)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Resolved settings with the model directory filled in when it can be found.
fn snapshot(env: &EnvSettings, profile: Option<Profile>, search_root: &Path) -> LauncherConfig {
    let overrides = Overrides {
        profile,
        ..Default::default()
    };
    let mut settings = ResolvedSettings::resolve(env, &LauncherConfig::default(), &overrides);

    let pattern = ModelDirPattern::new(settings.model_dir_prefix.clone());
    match locate_model_dir(&settings.model_dir, search_root, &pattern).path() {
        Some(found) => {
            let relative = found.strip_prefix(search_root).unwrap_or(found);
            settings.model_dir = relative.to_path_buf();
        }
        None => tracing::warn!(
            "No model directory found; writing '{}' as given",
            settings.model_dir.display()
        ),
    }

    LauncherConfig::from_settings(&settings)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::Scalar;

    #[test]
    fn test_snapshot_records_discovered_directory() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("llama-2-13b-chat")).unwrap();

        let config = snapshot(&EnvSettings::default(), Some(Profile::Fixed), root.path());
        assert_eq!(config.model_dir.as_deref(), Some("llama-2-13b-chat"));
        assert_eq!(config.max_seq_len, Some(Scalar::Number(512)));
        assert_eq!(config.max_batch_size, Some(Scalar::Number(6)));
        assert_eq!(config.nproc_per_node, Some(Scalar::Number(1)));
        assert_eq!(config.tokenizer_path.as_deref(), Some("tokenizer.model"));
        assert_eq!(config.profile, Some(Profile::Fixed));
    }

    #[test]
    fn test_snapshot_keeps_hint_when_nothing_found() {
        let root = tempfile::tempdir().unwrap();
        let env = EnvSettings {
            model_dir: Some("weights/llama".to_string()),
            nproc_per_node: Some("gpu".to_string()),
            ..Default::default()
        };

        let config = snapshot(&env, None, root.path());
        assert_eq!(config.model_dir.as_deref(), Some("weights/llama"));
        assert_eq!(config.nproc_per_node, Some(Scalar::Text("gpu".into())));
        assert_eq!(config.profile, Some(Profile::Flexible));
    }

    #[test]
    fn test_written_file_feeds_back_into_launch() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("llama-2-7b-chat")).unwrap();
        let path = root.path().join("launch.json");

        snapshot(&EnvSettings::default(), None, root.path())
            .save_json(&path, false)
            .unwrap();

        let reloaded = LauncherConfig::load(&path).unwrap();
        let settings =
            ResolvedSettings::resolve(&EnvSettings::default(), &reloaded, &Overrides::default());
        assert_eq!(settings.model_dir, PathBuf::from("llama-2-7b-chat"));
        assert_eq!(settings.max_seq_len, "256");
    }
}
