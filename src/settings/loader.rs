//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let builder = defaults()
        // External overrides (optional)
        .add_source(File::with_name("config/local").required(false))
        // Environment variables (highest priority); single `_` after the
        // prefix, `__` between nested keys: COVERCREW_RUNTIME__BINARY
        .add_source(
            Environment::with_prefix("COVERCREW")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("models")
                .try_parsing(true),
        );

    let mut config = finish(builder)?;
    apply_ollama_host(&mut config, std::env::var("OLLAMA_HOST").ok());
    Ok(config)
}

fn defaults() -> ConfigBuilder<config::builder::DefaultState> {
    Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
}

fn finish(builder: ConfigBuilder<config::builder::DefaultState>) -> Result<AppConfig> {
    builder
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// `OLLAMA_HOST` is what the runtime itself reads, so it wins over the file
fn apply_ollama_host(config: &mut AppConfig, host: Option<String>) {
    if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
        config.runtime.base_url = host;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse_with(overrides: &str) -> AppConfig {
        finish(defaults().add_source(File::from_str(overrides, FileFormat::Toml))).unwrap()
    }

    #[test]
    fn test_embedded_defaults() {
        let config = finish(defaults()).unwrap();

        assert_eq!(
            config.models,
            vec!["qwen3:latest", "mxbai-embed-large:latest"]
        );
        assert_eq!(config.runtime.binary, "ollama");
        assert_eq!(config.runtime.base_url, "http://localhost:11434");
        assert_eq!(config.runtime.readiness.max_attempts, 10);
        assert_eq!(config.runtime.readiness.initial_delay_ms, 250);
        assert_eq!(config.python.interpreter, "python3");
        assert_eq!(config.project.venv_dir, PathBuf::from("venv"));
        assert!(config.runtime.log_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_are_layered() {
        let config = parse_with(
            r#"
            models = ["llama3.2"]

            [runtime]
            stop_grace_secs = 10

            [runtime.readiness]
            max_attempts = 3

            [python]
            interpreter = "python3.12"
            "#,
        );

        assert_eq!(config.models, vec!["llama3.2"]);
        assert_eq!(config.runtime.stop_grace_secs, 10);
        assert_eq!(config.runtime.readiness.max_attempts, 3);
        // Untouched keys keep their defaults
        assert_eq!(config.runtime.readiness.max_delay_ms, 2000);
        assert_eq!(config.runtime.binary, "ollama");
        assert_eq!(config.python.interpreter, "python3.12");
    }

    #[test]
    fn test_ollama_host_overrides_base_url() {
        let mut config = finish(defaults()).unwrap();

        apply_ollama_host(&mut config, Some("0.0.0.0:11500".to_string()));
        assert_eq!(config.runtime.base_url, "0.0.0.0:11500");
        assert_eq!(
            config.ollama_config().base_url,
            "http://0.0.0.0:11500"
        );

        apply_ollama_host(&mut config, Some("  ".to_string()));
        assert_eq!(config.runtime.base_url, "0.0.0.0:11500");
    }
}
