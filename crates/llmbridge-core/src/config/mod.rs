//! Configuration system: schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use llmbridge_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Default backend: {}", cfg.default_backend);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{
    Allowlist, AnthropicConfig, BackendConfig, BasicOpenAiConfig, Config, DatabaseConfig,
    HttpConfig, OpenAiConfig,
};
