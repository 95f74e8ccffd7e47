//! Shared wiring for the lifecycle commands

use super::GlobalArgs;
use crate::settings::{load_config, AppConfig};
use anyhow::{Context as _, Result};
use covercrew_core::{InstallerConfig, OllamaRuntime, ProjectLayout, RunnerConfig, VenvEnvironment};
use std::sync::Arc;

/// Loaded configuration plus the concrete runtime and Python environment
pub struct Context {
    pub config: AppConfig,
    pub layout: ProjectLayout,
    pub runtime: Arc<OllamaRuntime>,
    pub python: Arc<VenvEnvironment>,
}

impl Context {
    /// Load configuration, apply CLI overrides and build the collaborators
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let config = apply_overrides(load_config()?, global);
        Self::from_config(config)
    }

    pub fn from_config(config: AppConfig) -> Result<Self> {
        config.validate()?;

        let root = std::path::absolute(&config.project.dir).with_context(|| {
            format!(
                "Failed to resolve project directory {}",
                config.project.dir.display()
            )
        })?;
        let layout = config.layout(&root);

        let ollama = config.ollama_config();
        let runtime = Arc::new(OllamaRuntime::new(&ollama)?);
        // The application talks to the same server we probed
        let python = Arc::new(
            VenvEnvironment::new(&config.python.interpreter)
                .with_app_env("OLLAMA_HOST", &ollama.base_url),
        );

        Ok(Self {
            config,
            layout,
            runtime,
            python,
        })
    }

    pub fn installer_config(&self, reinstall: bool) -> InstallerConfig {
        InstallerConfig {
            models: self.config.model_refs(),
            probe: self.config.probe_policy(),
            stop_grace: self.config.stop_grace(),
            reinstall,
        }
    }

    pub fn runner_config(&self, args: Vec<String>) -> RunnerConfig {
        RunnerConfig {
            models: self.config.model_refs(),
            probe: self.config.probe_policy(),
            stop_grace: self.config.stop_grace(),
            args,
        }
    }
}

/// CLI flags win over every configuration layer
fn apply_overrides(mut config: AppConfig, global: &GlobalArgs) -> AppConfig {
    if !global.models.is_empty() {
        config.models = global.models.clone();
    }
    if let Some(dir) = &global.project_dir {
        config.project.dir = dir.clone();
    }
    config
}
