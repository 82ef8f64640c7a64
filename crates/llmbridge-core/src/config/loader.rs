//! Config loader: reads `~/.llmbridge/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.llmbridge/config.json`
//! 3. Environment variables `LLMBRIDGE_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `LLMBRIDGE_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `LLMBRIDGE_DEFAULT_BACKEND` → `defaultBackend`
/// - `LLMBRIDGE_DATABASE__URL` → `database.url`
/// - `LLMBRIDGE_HTTP__TIMEOUT_SECS` → `http.timeoutSecs`
/// - `LLMBRIDGE_BACKENDS__<KEY>__API_KEY` → `backends.<key>.apiKey` (`authorization` for `basic_openai`)
/// - `LLMBRIDGE_BACKENDS__<KEY>__BASE_URL` → `backends.<key>.baseUrl`
/// - `LLMBRIDGE_BACKENDS__<KEY>__DEFAULT_MODEL` → `backends.<key>.defaultModel`
///
/// `<KEY>` is the backend key upper-cased with `-` replaced by `_`. Only
/// backends already present in the config can be overridden.
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("LLMBRIDGE_DEFAULT_BACKEND") {
        config.default_backend = val;
    }
    if let Ok(val) = std::env::var("LLMBRIDGE_DATABASE__URL") {
        config.database.url = Some(val);
    }
    if let Ok(val) = std::env::var("LLMBRIDGE_HTTP__TIMEOUT_SECS") {
        if let Ok(secs) = val.parse::<u64>() {
            config.http.timeout_secs = secs;
        }
    }

    for (key, backend) in config.backends.iter_mut() {
        let name = env_key(key);
        if let Ok(val) = std::env::var(format!("LLMBRIDGE_BACKENDS__{name}__API_KEY")) {
            backend.set_api_key(val);
        }
        if let Ok(val) = std::env::var(format!("LLMBRIDGE_BACKENDS__{name}__BASE_URL")) {
            backend.set_base_url(val);
        }
        if let Ok(val) = std::env::var(format!("LLMBRIDGE_BACKENDS__{name}__DEFAULT_MODEL")) {
            backend.set_default_model(val);
        }
    }

    config
}

fn env_key(backend_key: &str) -> String {
    backend_key.to_uppercase().replace('-', "_")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
