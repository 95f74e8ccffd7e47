//! Installer
//!
//! Prepares a working environment: Python, the runtime, the models and
//! the project's virtual environment. Every step is a guarded check; the
//! first failure aborts, stopping a runtime this run started.

use crate::error::{Error, Prerequisite, Result};
use crate::layout::ProjectLayout;
use crate::platform::Platform;
use crate::pyenv::PythonEnv;
use crate::readiness::ProbePolicy;
use crate::runtime::{acquire_ready, Runtime};
use crate::DEFAULT_MODELS;
use covercrew_ollama::ModelRef;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Installer settings
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Models to pull
    pub models: Vec<ModelRef>,
    /// Readiness probe policy
    pub probe: ProbePolicy,
    /// Grace period when stopping an owned runtime
    pub stop_grace: Duration,
    /// Run the runtime install even when the binary is on PATH
    pub reinstall: bool,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            models: DEFAULT_MODELS.iter().map(|m| ModelRef::parse(m)).collect(),
            probe: ProbePolicy::default(),
            stop_grace: Duration::from_secs(5),
            reinstall: false,
        }
    }
}

/// What an install run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// The runtime install method ran
    pub runtime_installed: bool,
    /// A pre-existing runtime server was reused
    pub attached: bool,
    /// Models pulled, in order
    pub models_pulled: Vec<String>,
    /// The virtual environment was created by this run
    pub venv_created: bool,
    /// The dependency manifest was installed
    pub requirements_installed: bool,
}

/// Install lifecycle
pub struct Installer {
    runtime: Arc<dyn Runtime>,
    python: Arc<dyn PythonEnv>,
    layout: ProjectLayout,
    platform: Platform,
    config: InstallerConfig,
}

impl Installer {
    /// Create an installer for the current platform
    pub fn new(
        runtime: Arc<dyn Runtime>,
        python: Arc<dyn PythonEnv>,
        layout: ProjectLayout,
        config: InstallerConfig,
    ) -> Self {
        Self {
            runtime,
            python,
            layout,
            platform: Platform::detect(),
            config,
        }
    }

    /// Override the detected platform
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Run every install step in order
    pub async fn install(&self) -> Result<InstallReport> {
        let mut report = InstallReport::default();

        let interpreter = self.python.find_interpreter().await.ok_or_else(|| {
            Error::missing(Prerequisite::PythonInterpreter, self.python.interpreter_name())
        })?;
        info!(interpreter = %interpreter.display(), "Python interpreter found");

        let manifest = self.layout.find_manifest();
        if manifest.is_none() {
            warn!(
                path = %self.layout.manifest_path().display(),
                "No dependency manifest found, skipping dependency install"
            );
        }

        self.platform.ensure_supported()?;
        info!(platform = %self.platform, "Platform supported");

        if self.config.reinstall || !self.runtime.is_installed().await {
            self.runtime.install(&self.platform).await?;
            report.runtime_installed = true;
        } else {
            info!(binary = %self.runtime.binary(), "Runtime already installed");
        }

        if !self.runtime.is_installed().await {
            return Err(Error::missing(
                Prerequisite::RuntimeBinary,
                self.runtime.binary(),
            ));
        }

        let lease = acquire_ready(
            self.runtime.as_ref(),
            &self.config.probe,
            self.config.stop_grace,
        )
        .await?;
        report.attached = !lease.is_owned();

        let outcome = self.provision(manifest.as_deref(), &mut report).await;
        lease.release(self.config.stop_grace).await;
        outcome?;

        info!("Installation complete");
        Ok(report)
    }

    /// Steps that need a live runtime
    async fn provision(&self, manifest: Option<&Path>, report: &mut InstallReport) -> Result<()> {
        for model in &self.config.models {
            let name = model.to_string();
            self.runtime.pull_model(&name).await?;
            report.models_pulled.push(name);
        }

        let venv = self.layout.venv_path();
        if self.python.exists(&venv) {
            info!(path = %venv.display(), "Virtual environment already exists");
        } else {
            self.python.create(&venv).await?;
            report.venv_created = true;
        }

        if !self.python.exists(&venv) {
            return Err(Error::missing(
                Prerequisite::VirtualEnv,
                venv.display().to_string(),
            ));
        }

        if let Some(manifest) = manifest {
            self.python.install_requirements(&venv, manifest).await?;
            report.requirements_installed = true;
        }

        Ok(())
    }
}
