//! Configuration types
//!
//! Mirrors config/default.toml and converts into the library types.

use covercrew_core::{Error as CoreError, ModelRef, ProbePolicy, ProjectLayout};
use covercrew_ollama::OllamaConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    #[serde(default)]
    pub runtime: RuntimeSettings,
    #[serde(default)]
    pub python: PythonSettings,
    #[serde(default)]
    pub project: ProjectSettings,
}

fn default_models() -> Vec<String> {
    covercrew_core::DEFAULT_MODELS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            models: default_models(),
            runtime: RuntimeSettings::default(),
            python: PythonSettings::default(),
            project: ProjectSettings::default(),
        }
    }
}

/// `[runtime]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub binary: String,
    pub base_url: String,
    pub install_script_url: String,
    pub log_file: Option<PathBuf>,
    pub stop_grace_secs: u64,
    pub request_timeout_secs: u64,
    pub readiness: ReadinessSettings,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            binary: covercrew_ollama::DEFAULT_BINARY.to_string(),
            base_url: covercrew_ollama::DEFAULT_BASE_URL.to_string(),
            install_script_url: covercrew_ollama::DEFAULT_INSTALL_SCRIPT_URL.to_string(),
            log_file: None,
            stop_grace_secs: 5,
            request_timeout_secs: 5,
            readiness: ReadinessSettings::default(),
        }
    }
}

/// `[runtime.readiness]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReadinessSettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    pub jitter: bool,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        let policy = ProbePolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
            multiplier: policy.multiplier,
            jitter: policy.jitter,
        }
    }
}

/// `[python]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PythonSettings {
    pub interpreter: String,
}

impl Default for PythonSettings {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
        }
    }
}

/// `[project]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub dir: PathBuf,
    pub manifest: PathBuf,
    pub venv_dir: PathBuf,
    pub entry_point: PathBuf,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            manifest: PathBuf::from(covercrew_core::layout::DEFAULT_MANIFEST),
            venv_dir: PathBuf::from(covercrew_core::layout::DEFAULT_VENV_DIR),
            entry_point: PathBuf::from(covercrew_core::layout::DEFAULT_ENTRY_POINT),
        }
    }
}

impl AppConfig {
    /// Reject values the lifecycle cannot work with
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.models.iter().all(|m| m.trim().is_empty()) {
            return Err(CoreError::Configuration(
                "at least one model is required".to_string(),
            ));
        }
        if self.runtime.binary.trim().is_empty() {
            return Err(CoreError::Configuration(
                "runtime.binary must not be empty".to_string(),
            ));
        }
        if self.runtime.base_url.trim().trim_end_matches('/').is_empty() {
            return Err(CoreError::Configuration(
                "runtime.base_url must not be empty".to_string(),
            ));
        }
        if self.python.interpreter.trim().is_empty() {
            return Err(CoreError::Configuration(
                "python.interpreter must not be empty".to_string(),
            ));
        }
        let readiness = &self.runtime.readiness;
        if readiness.max_attempts == 0 {
            return Err(CoreError::Configuration(
                "runtime.readiness.max_attempts must be at least 1".to_string(),
            ));
        }
        if !(readiness.multiplier.is_finite() && readiness.multiplier >= 1.0) {
            return Err(CoreError::Configuration(
                "runtime.readiness.multiplier must be >= 1.0".to_string(),
            ));
        }
        Ok(())
    }

    /// Runtime plumbing configuration
    pub fn ollama_config(&self) -> OllamaConfig {
        let mut config = OllamaConfig::new()
            .with_binary(&self.runtime.binary)
            .with_base_url(&self.runtime.base_url)
            .with_timeout(Duration::from_secs(self.runtime.request_timeout_secs.max(1)))
            .with_install_script_url(&self.runtime.install_script_url);

        if let Some(log_file) = &self.runtime.log_file {
            config = config.with_log_file(expand_home(log_file));
        }
        config
    }

    /// Readiness probe policy
    pub fn probe_policy(&self) -> ProbePolicy {
        let readiness = &self.runtime.readiness;
        ProbePolicy::new()
            .with_max_attempts(readiness.max_attempts)
            .with_initial_delay(Duration::from_millis(readiness.initial_delay_ms))
            .with_max_delay(Duration::from_millis(readiness.max_delay_ms))
            .with_multiplier(readiness.multiplier)
            .with_jitter(readiness.jitter)
    }

    /// Grace period before an owned runtime is force-killed
    pub fn stop_grace(&self) -> Duration {
        Duration::from_secs(self.runtime.stop_grace_secs)
    }

    /// Required models, parsed and deduplicated in order
    pub fn model_refs(&self) -> Vec<ModelRef> {
        let mut refs: Vec<ModelRef> = Vec::new();
        for raw in self.models.iter().filter(|m| !m.trim().is_empty()) {
            let model = ModelRef::parse(raw);
            if !refs.contains(&model) {
                refs.push(model);
            }
        }
        refs
    }

    /// Project layout rooted at `root`
    pub fn layout(&self, root: &Path) -> ProjectLayout {
        ProjectLayout::new(root)
            .with_manifest(&self.project.manifest)
            .with_venv_dir(&self.project.venv_dir)
            .with_entry_point(&self.project.entry_point)
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
