//! `llmbridge onboard`: write a default configuration file.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use llmbridge_core::config::{get_config_path, save_config, Config};

use crate::helpers::display_path;

/// Run the onboard command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    println!();
    println!("{}", "llmbridge setup".cyan().bold());
    println!();

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    if write_default_config(&path)? {
        println!("  {} created config at {}", "✓".green(), display_path(&path));
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            display_path(&path)
        );
    }

    let history_dir = llmbridge_core::utils::get_data_path().join("history");
    std::fs::create_dir_all(&history_dir)
        .with_context(|| format!("failed to create {}", history_dir.display()))?;

    println!();
    println!(
        "{}",
        "  Add an API key under backends.openai.apiKey (or set LLMBRIDGE_BACKENDS__OPENAI__API_KEY),".green()
    );
    println!("{}", "  then run `llmbridge chat` to start talking.".green());
    println!();

    Ok(())
}

/// Write `Config::default()` to `path` unless a file is already there.
/// Returns whether a file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmbridge_core::config::load_config;

    #[test]
    fn writes_loadable_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        assert!(write_default_config(&path).unwrap());
        let config = load_config(Some(path.as_path()));
        assert_eq!(config.backend_keys(), vec!["openai"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"defaultBackend": "mine"}"#).unwrap();

        assert!(!write_default_config(&path).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("mine"));
    }
}
