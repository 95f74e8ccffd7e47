//! Runtime installation methods

use crate::error::{Error, Result};
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// How the runtime gets installed on a given platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallMethod {
    /// Download the official install script and pipe it to `sh` (Linux)
    Script {
        /// Script URL
        url: String,
    },
    /// `brew install <formula>` (macOS)
    Homebrew {
        /// Formula name
        formula: String,
    },
}

impl InstallMethod {
    /// Install script method
    pub fn script(url: impl Into<String>) -> Self {
        Self::Script { url: url.into() }
    }

    /// Homebrew method
    pub fn homebrew(formula: impl Into<String>) -> Self {
        Self::Homebrew {
            formula: formula.into(),
        }
    }

    /// Program and arguments this method runs
    pub fn argv(&self) -> Vec<String> {
        match self {
            Self::Script { url } => vec![
                "sh".to_string(),
                "-c".to_string(),
                format!("curl -fsSL {} | sh", shell_quote(url)),
            ],
            Self::Homebrew { formula } => vec![
                "brew".to_string(),
                "install".to_string(),
                formula.clone(),
            ],
        }
    }

    /// Run the installation with output going to the terminal
    pub async fn run(&self) -> Result<()> {
        let argv = self.argv();
        info!(method = %self, "Installing runtime");

        let status = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Error::Command {
                command: self.to_string(),
                reason: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Command {
                command: self.to_string(),
                reason: status.to_string(),
            })
        }
    }
}

impl fmt::Display for InstallMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script { url } => write!(f, "curl -fsSL {} | sh", url),
            Self::Homebrew { formula } => write!(f, "brew install {}", formula),
        }
    }
}

/// Single-quote a value for `sh -c`
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
