//! The `ollama` command-line tool

use crate::error::{Error, Result};
use crate::process::{find_pid, ServeProcess};
use crate::types::OllamaConfig;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Resolve a binary the way the shell would.
///
/// Values containing a path separator are checked directly; bare names
/// are looked up on `PATH` with `which`.
pub async fn which(binary: &str) -> Option<PathBuf> {
    if binary.contains(std::path::MAIN_SEPARATOR) || binary.contains('/') {
        let path = PathBuf::from(binary);
        return path.is_file().then_some(path);
    }

    let output = Command::new("which")
        .arg(binary)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
}

/// Wrapper around the runtime binary
#[derive(Debug, Clone)]
pub struct OllamaCli {
    binary: String,
    base_url: String,
    log_file: Option<PathBuf>,
}

impl OllamaCli {
    /// Create from configuration
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            base_url: config.base_url.clone(),
            log_file: config.log_file.clone(),
        }
    }

    /// Configured binary name or path
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Process name used for lookups (file name of the binary)
    pub fn process_name(&self) -> &str {
        Path::new(&self.binary)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.binary)
    }

    /// Where the binary resolves to, if it is installed
    pub async fn locate(&self) -> Option<PathBuf> {
        which(&self.binary).await
    }

    /// Whether a runtime process is already running
    pub async fn is_running(&self) -> bool {
        match find_pid(self.process_name()).await {
            Some(pid) => {
                debug!(pid, name = self.process_name(), "Found running runtime");
                true
            }
            None => false,
        }
    }

    /// Start `ollama serve` in the background
    pub fn serve(&self) -> Result<ServeProcess> {
        let mut cmd = self.command();
        cmd.arg("serve").stdin(Stdio::null());

        match &self.log_file {
            Some(path) => {
                let log = OpenOptions::new().create(true).append(true).open(path)?;
                let log_err = log.try_clone()?;
                cmd.stdout(Stdio::from(log)).stderr(Stdio::from(log_err));
            }
            None => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }
        }

        info!(binary = %self.binary, base_url = %self.base_url, "Starting runtime");
        ServeProcess::spawn(cmd, format!("{} serve", self.binary))
    }

    /// Download a model into the local registry, streaming progress to the terminal
    pub async fn pull(&self, model: &str) -> Result<()> {
        let label = format!("{} pull {}", self.binary, model);
        info!(model, "Pulling model (this may take a few minutes)");

        let status = self
            .command()
            .args(["pull", model])
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::NotInstalled(self.binary.clone()),
                _ => Error::Command {
                    command: label.clone(),
                    reason: e.to_string(),
                },
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Command {
                command: label,
                reason: status.to_string(),
            })
        }
    }

    /// Base command with the server address exported, so CLI calls and
    /// `serve` agree with the HTTP client on where the server lives.
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.env("OLLAMA_HOST", &self.base_url);
        cmd
    }
}
