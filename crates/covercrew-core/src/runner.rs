//! Runner
//!
//! Starts or reuses the runtime, makes sure the models are present and
//! hands control to the application entry point. The application's exit
//! code becomes the runner's result.

use crate::error::{Error, Prerequisite, Result};
use crate::layout::ProjectLayout;
use crate::pyenv::{AppExit, PythonEnv};
use crate::readiness::{wait_until_ready, ProbePolicy};
use crate::runtime::{start_or_attach, Runtime, RuntimeLease};
use crate::shutdown::wait_for_shutdown_signal;
use crate::DEFAULT_MODELS;
use covercrew_ollama::ModelRef;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Runner settings
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Models that must be present
    pub models: Vec<ModelRef>,
    /// Readiness probe policy
    pub probe: ProbePolicy,
    /// Grace period when stopping an owned runtime
    pub stop_grace: Duration,
    /// Arguments forwarded to the entry point
    pub args: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            models: DEFAULT_MODELS.iter().map(|m| ModelRef::parse(m)).collect(),
            probe: ProbePolicy::default(),
            stop_grace: Duration::from_secs(5),
            args: Vec::new(),
        }
    }
}

/// Run lifecycle
pub struct Runner {
    runtime: Arc<dyn Runtime>,
    python: Arc<dyn PythonEnv>,
    layout: ProjectLayout,
    config: RunnerConfig,
}

impl Runner {
    /// Create a runner
    pub fn new(
        runtime: Arc<dyn Runtime>,
        python: Arc<dyn PythonEnv>,
        layout: ProjectLayout,
        config: RunnerConfig,
    ) -> Self {
        Self {
            runtime,
            python,
            layout,
            config,
        }
    }

    /// Run until the application exits or Ctrl+C/SIGTERM arrives
    pub async fn run(&self) -> Result<AppExit> {
        self.run_until(wait_for_shutdown_signal()).await
    }

    /// Run until the application exits or `shutdown` completes.
    ///
    /// `shutdown` is watched from the moment the runtime is started, so an
    /// interrupt during the readiness probe, a model pull or the
    /// application itself stops an owned runtime and yields
    /// [`AppExit::interrupted`].
    pub async fn run_until<F>(&self, shutdown: F) -> Result<AppExit>
    where
        F: Future<Output = ()> + Send,
    {
        self.check_prerequisites().await?;

        tokio::pin!(shutdown);
        let mut lease: Option<RuntimeLease> = None;

        let outcome = tokio::select! {
            biased;
            _ = &mut shutdown => {
                warn!("Interrupted, shutting down");
                Ok(AppExit::interrupted())
            }
            result = self.serve(&mut lease) => result,
        };

        if let Some(lease) = lease {
            lease.release(self.config.stop_grace).await;
        }

        let exit = outcome?;
        if exit.success() {
            info!("Application finished successfully");
        } else {
            warn!(code = exit.code(), "Application exited with failure");
        }
        Ok(exit)
    }

    /// Start-or-attach, wait for readiness, pull models and run the app.
    ///
    /// The lease is stored in `lease` as soon as it exists so the caller
    /// can release it however this future ends.
    async fn serve(&self, lease: &mut Option<RuntimeLease>) -> Result<AppExit> {
        *lease = Some(start_or_attach(self.runtime.as_ref()).await?);

        wait_until_ready(self.runtime.as_ref(), &self.config.probe).await?;
        self.ensure_models().await?;

        let venv = self.layout.venv_path();
        let entry_point = self.layout.entry_point_path();
        self.python
            .run(&venv, &entry_point, &self.config.args)
            .await
    }

    async fn check_prerequisites(&self) -> Result<()> {
        if !self.runtime.is_installed().await {
            return Err(Error::missing(
                Prerequisite::RuntimeBinary,
                self.runtime.binary(),
            ));
        }

        if !self.layout.has_entry_point() {
            return Err(Error::missing(
                Prerequisite::EntryPoint,
                self.layout.entry_point_path().display().to_string(),
            ));
        }

        let venv = self.layout.venv_path();
        if !self.python.exists(&venv) {
            return Err(Error::missing(
                Prerequisite::VirtualEnv,
                venv.display().to_string(),
            ));
        }

        Ok(())
    }

    /// Pull every required model the registry does not have yet
    async fn ensure_models(&self) -> Result<()> {
        let installed = self.runtime.list_models().await?;

        for model in &self.config.models {
            if model.is_present_in(&installed) {
                info!(%model, "Model already present");
                continue;
            }
            self.runtime.pull_model(&model.to_string()).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
