//! Python virtual environment
//!
//! Activation is never done in the calling shell: the environment is
//! applied to the child process only (`VIRTUAL_ENV`, `PATH`, no
//! `PYTHONHOME`), so there is nothing to deactivate afterwards.

use crate::error::{Error, Result};
use async_trait::async_trait;
use covercrew_ollama::which;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

/// Exit code reported when the run was interrupted by a signal to us
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Exit code of the delegated application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppExit {
    code: i32,
}

impl AppExit {
    /// Wrap a numeric exit code
    pub fn new(code: i32) -> Self {
        Self { code }
    }

    /// Exit after Ctrl+C/SIGTERM
    pub fn interrupted() -> Self {
        Self::new(INTERRUPTED_EXIT_CODE)
    }

    /// Map a process status; a signal-terminated process becomes 128+signal
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::new(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::new(128 + signal);
            }
        }

        Self::new(crate::error::EXIT_FAILURE)
    }

    /// Numeric exit code
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Whether the application succeeded
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Operations the lifecycle needs from Python
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PythonEnv: Send + Sync {
    /// Base interpreter name or path, for diagnostics
    fn interpreter_name(&self) -> String;

    /// Resolve the base interpreter used to create environments
    async fn find_interpreter(&self) -> Option<PathBuf>;

    /// Create a virtual environment at `venv`
    async fn create(&self, venv: &Path) -> Result<()>;

    /// Whether a virtual environment exists at `venv`
    fn exists(&self, venv: &Path) -> bool;

    /// Install a requirements file with the environment's own pip
    async fn install_requirements(&self, venv: &Path, manifest: &Path) -> Result<()>;

    /// Run `entry_point` with the environment activated
    async fn run(&self, venv: &Path, entry_point: &Path, args: &[String]) -> Result<AppExit>;
}

/// `python -m venv` backed environment
#[derive(Debug, Clone)]
pub struct VenvEnvironment {
    interpreter: String,
    app_env: Vec<(String, String)>,
}

impl VenvEnvironment {
    /// Use `interpreter` (name or path) to create environments
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            app_env: Vec::new(),
        }
    }

    /// Extra environment variable for the application process
    #[must_use]
    pub fn with_app_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.app_env.push((key.into(), value.into()));
        self
    }

    /// Configured base interpreter
    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// Executables directory of an environment
    pub fn bin_dir(venv: &Path) -> PathBuf {
        venv.join("bin")
    }

    /// The environment's own interpreter
    pub fn python(venv: &Path) -> PathBuf {
        Self::bin_dir(venv).join("python")
    }

    /// `PATH` value with the environment's executables first
    pub fn activation_env(venv: &Path, current_path: Option<OsString>) -> Result<OsString> {
        let mut paths = vec![Self::bin_dir(venv)];
        if let Some(current) = current_path {
            paths.extend(std::env::split_paths(&current));
        }
        std::env::join_paths(paths).map_err(|e| Error::Activation(e.to_string()))
    }

    async fn run_step(&self, mut command: Command, step: &str) -> Result<()> {
        debug!(step, command = ?command.as_std(), "Running");

        let status = command
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Error::command_failed(step, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::command_failed(step, status))
        }
    }
}

#[async_trait]
impl PythonEnv for VenvEnvironment {
    fn interpreter_name(&self) -> String {
        self.interpreter.clone()
    }

    async fn find_interpreter(&self) -> Option<PathBuf> {
        which(&self.interpreter).await
    }

    async fn create(&self, venv: &Path) -> Result<()> {
        info!(path = %venv.display(), "Creating virtual environment");

        let mut cmd = Command::new(&self.interpreter);
        cmd.arg("-m").arg("venv").arg(venv);
        self.run_step(cmd, "create virtual environment").await
    }

    fn exists(&self, venv: &Path) -> bool {
        venv.is_dir()
    }

    async fn install_requirements(&self, venv: &Path, manifest: &Path) -> Result<()> {
        info!(manifest = %manifest.display(), "Installing Python dependencies");

        let mut cmd = Command::new(Self::python(venv));
        cmd.args(["-m", "pip", "install", "-r"]).arg(manifest);
        self.run_step(cmd, "install Python dependencies").await
    }

    async fn run(&self, venv: &Path, entry_point: &Path, args: &[String]) -> Result<AppExit> {
        let python = Self::python(venv);
        let path = Self::activation_env(venv, std::env::var_os("PATH"))?;

        let mut cmd = Command::new(&python);
        cmd.arg(entry_point)
            .args(args)
            .env("VIRTUAL_ENV", venv)
            .env("PATH", path)
            .env_remove("PYTHONHOME")
            .envs(self.app_env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        if let Some(dir) = entry_point.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }

        info!(entry_point = %entry_point.display(), "Launching application");

        let mut child = cmd.spawn().map_err(|e| {
            Error::Activation(format!("cannot start {}: {}", python.display(), e))
        })?;
        let status = child.wait().await?;

        Ok(AppExit::from_status(status))
    }
}
