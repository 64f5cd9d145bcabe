//! List model directories command

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::{EnvSettings, ResolvedSettings};
use crate::model::{find_candidates, locate_model_dir, CheckpointInfo, ModelDirPattern, Resolution};

/// List model directories in the working directory, in selection order
pub async fn list(verbose: bool, model_prefix: Option<String>) -> Result<()> {
    let search_root = std::env::current_dir().context("failed to read the working directory")?;
    let settings = ResolvedSettings::from_env(&EnvSettings::from_env());
    let pattern = ModelDirPattern::new(model_prefix.unwrap_or(settings.model_dir_prefix));

    let stdout = io::stdout();
    write_listing(
        &mut stdout.lock(),
        &search_root,
        &settings.model_dir,
        &pattern,
        verbose,
    )?;
    Ok(())
}

fn write_listing<W: Write>(
    out: &mut W,
    search_root: &Path,
    hint: &Path,
    pattern: &ModelDirPattern,
    verbose: bool,
) -> io::Result<()> {
    if let Resolution::Explicit(dir) = locate_model_dir(hint, search_root, pattern) {
        writeln!(out, "MODEL_DIR resolves to {}; no search needed.\n", dir.display())?;
        if verbose {
            print_model_details(out, &search_root.join(&dir), &dir.display().to_string())?;
        }
        return Ok(());
    }

    let candidates = find_candidates(search_root, pattern);
    writeln!(
        out,
        "Model directories in {} matching '{}*':\n",
        search_root.display(),
        pattern.prefix()
    )?;

    if candidates.is_empty() {
        writeln!(out, "  No model directories found.")?;
        writeln!(out, "\nTo add models:")?;
        writeln!(
            out,
            "  - Download a checkpoint into a '{}*' directory here",
            pattern.prefix()
        )?;
        writeln!(out, "  - Or point MODEL_DIR at an existing checkpoint directory")?;
        return Ok(());
    }

    for (i, path) in candidates.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if verbose {
            print_model_details(out, path, &name)?;
        } else if i == 0 {
            writeln!(out, "  {} (selected)", name)?;
        } else {
            writeln!(out, "  {}", name)?;
        }
    }

    Ok(())
}

fn print_model_details<W: Write>(out: &mut W, path: &Path, name: &str) -> io::Result<()> {
    let info = CheckpointInfo::inspect(path);
    writeln!(out, "  {}", name)?;
    writeln!(out, "    Path: {}", path.display())?;
    match info.parallelism() {
        Some(shards) => writeln!(
            out,
            "    Shards: {} (run with NPROC_PER_NODE={})",
            shards, shards
        )?,
        None => writeln!(out, "    Shards: none found")?,
    }
    writeln!(
        out,
        "    params.json: {}",
        if info.params_path.is_some() { "yes" } else { "missing" }
    )?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn render(root: &Path, hint: &str, verbose: bool) -> String {
        let mut out = Vec::new();
        write_listing(
            &mut out,
            root,
            Path::new(hint),
            &ModelDirPattern::default(),
            verbose,
        )
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_lists_matches_in_selection_order() {
        let root = tempfile::tempdir().unwrap();
        for dir in ["llama-2-7b", "llama-2-13b", "notes"] {
            fs::create_dir(root.path().join(dir)).unwrap();
        }

        let output = render(root.path(), "missing", false);
        let first = output.find("llama-2-13b (selected)").unwrap();
        let second = output.find("  llama-2-7b\n").unwrap();
        assert!(first < second);
        assert!(!output.contains("notes"));
    }

    #[test]
    fn test_reports_empty_search() {
        let root = tempfile::tempdir().unwrap();
        let output = render(root.path(), "missing", false);
        assert!(output.contains("No model directories found."));
    }

    #[test]
    fn test_existing_model_dir_short_circuits() {
        let root = tempfile::tempdir().unwrap();
        let model = root.path().join("weights");
        fs::create_dir(&model).unwrap();
        fs::write(model.join("consolidated.00.pth"), b"").unwrap();

        let output = render(root.path(), "weights", true);
        assert!(output.starts_with("MODEL_DIR resolves to weights"));
        assert!(output.contains("Shards: 1 (run with NPROC_PER_NODE=1)"));
        assert!(output.contains("params.json: missing"));
    }
}
