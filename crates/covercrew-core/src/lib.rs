//! Covercrew Core - install/run lifecycle engine
//!
//! This crate owns the lifecycle of the local cover-letter application:
//! - Installer: prerequisites, runtime install, model pulls, virtual environment
//! - Runner: start-or-attach the runtime, ensure models, launch the entry point
//! - Runtime: the `Runtime` seam, start-or-attach lease and readiness probe
//! - PyEnv: the `PythonEnv` seam and venv-backed implementation
//! - Platform/Layout: supported OS families and fixed project paths

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod installer;
pub mod layout;
pub mod platform;
pub mod pyenv;
pub mod readiness;
pub mod runner;
pub mod runtime;
pub mod shutdown;

pub use error::{
    format_error_for_cli, Error, Prerequisite, Result, UserFriendlyError, EXIT_FAILURE,
};
pub use installer::{InstallReport, Installer, InstallerConfig};
pub use layout::ProjectLayout;
pub use platform::Platform;
pub use pyenv::{AppExit, PythonEnv, VenvEnvironment};
pub use readiness::{wait_until_ready, ProbePolicy};
pub use runner::{Runner, RunnerConfig};
pub use runtime::{
    acquire_ready, start_or_attach, OllamaRuntime, Runtime, RuntimeLease, ServeHandle,
};
pub use shutdown::wait_for_shutdown_signal;

/// Models the application needs: the chat model and the embedding model
pub const DEFAULT_MODELS: [&str; 2] = ["qwen3:latest", "mxbai-embed-large:latest"];

// Re-export runtime plumbing for convenience
pub use covercrew_ollama::ModelRef;
