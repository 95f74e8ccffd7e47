//! Runtime seam and start-or-attach lease
//!
//! The lifecycle talks to the LLM runtime only through [`Runtime`], so the
//! installer and runner can be exercised against mocks. Starting the
//! runtime yields a [`RuntimeLease`] that remembers whether this process
//! owns the server and therefore has to stop it.

mod ollama;

pub use ollama::OllamaRuntime;

use crate::error::Result;
use crate::platform::Platform;
use crate::readiness::{wait_until_ready, ProbePolicy};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

/// Operations the lifecycle needs from the LLM runtime
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runtime: Send + Sync {
    /// Binary name or path, for diagnostics
    fn binary(&self) -> String;

    /// Whether the runtime binary is on PATH
    async fn is_installed(&self) -> bool;

    /// Install the runtime with the platform's method
    async fn install(&self, platform: &Platform) -> Result<()>;

    /// Whether a runtime process is already running
    async fn is_running(&self) -> bool;

    /// Start the runtime server in the background
    fn spawn(&self) -> Result<Box<dyn ServeHandle>>;

    /// One readiness probe; returns the runtime version
    async fn probe(&self) -> Result<String>;

    /// Names of the models in the local registry
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Download a model into the local registry
    async fn pull_model(&self, model: &str) -> Result<()>;

    /// Base URL the runtime serves on
    fn base_url(&self) -> String;
}

/// A runtime server process this program started
#[async_trait]
pub trait ServeHandle: Send {
    /// OS process id, if known
    fn pid(&self) -> Option<u32>;

    /// Stop the server, forcefully after `grace`
    async fn terminate(&mut self, grace: Duration) -> Result<()>;
}

/// Whether this invocation owns the runtime server
pub enum RuntimeLease {
    /// A server was already running; it is left alone on release
    Attached,
    /// We spawned the server and stop it on release
    Owned(Box<dyn ServeHandle>),
}

impl RuntimeLease {
    /// Whether release will stop a server
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    /// PID of the owned server
    pub fn pid(&self) -> Option<u32> {
        match self {
            Self::Attached => None,
            Self::Owned(handle) => handle.pid(),
        }
    }

    /// Stop the server if we own it. Errors are logged, never returned.
    pub async fn release(self, grace: Duration) {
        match self {
            Self::Attached => {
                info!("Leaving pre-existing runtime running");
            }
            Self::Owned(mut handle) => {
                let pid = handle.pid();
                info!(pid = ?pid, "Stopping runtime started by this run");
                if let Err(e) = handle.terminate(grace).await {
                    warn!(pid = ?pid, error = %e, "Failed to stop runtime");
                }
            }
        }
    }
}

impl fmt::Debug for RuntimeLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attached => write!(f, "Attached"),
            Self::Owned(handle) => f.debug_tuple("Owned").field(&handle.pid()).finish(),
        }
    }
}

/// Reuse a running server or spawn one we own
pub async fn start_or_attach(runtime: &dyn Runtime) -> Result<RuntimeLease> {
    if runtime.is_running().await {
        info!(base_url = %runtime.base_url(), "Runtime already running, attaching");
        return Ok(RuntimeLease::Attached);
    }

    let handle = runtime.spawn()?;
    info!(pid = ?handle.pid(), "Runtime started");
    Ok(RuntimeLease::Owned(handle))
}

/// Start-or-attach, then wait until the server answers.
///
/// A server spawned here is stopped again when it never becomes ready.
pub async fn acquire_ready(
    runtime: &dyn Runtime,
    policy: &ProbePolicy,
    grace: Duration,
) -> Result<RuntimeLease> {
    let lease = start_or_attach(runtime).await?;

    match wait_until_ready(runtime, policy).await {
        Ok(_) => Ok(lease),
        Err(e) => {
            lease.release(grace).await;
            Err(e)
        }
    }
}
