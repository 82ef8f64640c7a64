//! `llmbridge status`: show configuration and backend status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use llmbridge_core::config::{get_config_path, load_config, Allowlist, BackendConfig};

use crate::helpers::display_path;

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);
    let config = load_config(Some(path.as_path()));

    println!();
    println!("{}", "llmbridge Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        display_path(&path),
        if path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );
    println!("  {:<18} {}", "Database:".bold(), config.database.resolved_url());
    println!(
        "  {:<18} {}s",
        "HTTP timeout:".bold(),
        config.http.timeout_secs
    );

    let allowlist = match &config.allowlist {
        Allowlist::Disabled => "disabled (everyone may talk)".dimmed().to_string(),
        Allowlist::Senders(senders) => format!("{} sender(s)", senders.len()),
    };
    println!("  {:<18} {}", "Allowlist:".bold(), allowlist);

    let default_status = match config.validate() {
        Ok(()) => "✓".green().to_string(),
        Err(e) => format!("{} {}", "✗".red(), e),
    };
    println!(
        "  {:<18} {} {}",
        "Default backend:".bold(),
        config.default_backend,
        default_status
    );

    println!();
    println!("  {}", "Backends:".bold());
    for (key, backend) in &config.backends {
        println!("    {:<16} {}", key, backend_status(backend));
    }
    println!();

    Ok(())
}

/// One-line summary of a backend entry.
fn backend_status(backend: &BackendConfig) -> String {
    let credentials = if backend.is_configured() {
        format!("{}", "✓ configured".green())
    } else {
        format!("{}", "· missing credentials".dimmed())
    };
    let model = backend
        .default_model()
        .map(|m| format!(" | model: {m}"))
        .unwrap_or_default();

    format!("{:<13} {}{}", backend.type_name(), credentials, model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmbridge_core::config::{AnthropicConfig, OpenAiConfig};

    #[test]
    fn backend_status_mentions_type_and_model() {
        colored::control::set_override(false);

        let backend = BackendConfig::Openai(OpenAiConfig {
            api_key: "sk".to_string(),
            default_model: Some("gpt-4o-mini".to_string()),
            ..Default::default()
        });
        let line = backend_status(&backend);
        assert!(line.starts_with("openai"));
        assert!(line.contains("✓ configured"));
        assert!(line.ends_with("| model: gpt-4o-mini"));

        let line = backend_status(&BackendConfig::Anthropic(AnthropicConfig::default()));
        assert!(line.starts_with("anthropic"));
        assert!(line.contains("missing credentials"));
    }
}
