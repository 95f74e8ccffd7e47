//! Error types for covercrew-core
//!
//! This module provides the lifecycle error taxonomy and user-friendly
//! error formatting. The delegated application's own failure is not an
//! error here; it is reported as an [`AppExit`](crate::AppExit) code.

use std::fmt;
use thiserror::Error;

/// Exit status for every lifecycle failure
pub const EXIT_FAILURE: i32 = 1;

/// Something the lifecycle requires before it can continue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    /// Base Python interpreter used to create the virtual environment
    PythonInterpreter,
    /// The runtime binary (`ollama`)
    RuntimeBinary,
    /// The virtual environment directory
    VirtualEnv,
    /// The application entry point (`main.py`)
    EntryPoint,
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PythonInterpreter => write!(f, "Python interpreter"),
            Self::RuntimeBinary => write!(f, "runtime binary"),
            Self::VirtualEnv => write!(f, "virtual environment"),
            Self::EntryPoint => write!(f, "entry point"),
        }
    }
}

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// A required tool or file is missing
    #[error("missing {prerequisite}: {location}")]
    MissingPrerequisite {
        /// What is missing
        prerequisite: Prerequisite,
        /// Name or path that was looked up
        location: String,
    },

    /// OS family other than Linux or macOS
    #[error("unsupported operating system: {0}")]
    UnsupportedPlatform(String),

    /// An external step (install, pull, venv, pip) failed
    #[error("{step} failed: {reason}")]
    CommandFailed {
        /// Step description
        step: String,
        /// Exit status or spawn error
        reason: String,
    },

    /// The virtual environment could not be activated for the application
    #[error("activation error: {0}")]
    Activation(String),

    /// Readiness probe gave up
    #[error("runtime at {base_url} not ready after {attempts} attempts: {last_error}")]
    RuntimeNotReady {
        /// Probed base URL
        base_url: String,
        /// Probes made
        attempts: u32,
        /// Error from the final probe
        last_error: String,
    },

    /// Runtime plumbing error
    #[error("runtime error: {0}")]
    Runtime(#[from] covercrew_ollama::Error),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a missing prerequisite
    pub fn missing(prerequisite: Prerequisite, location: impl Into<String>) -> Self {
        Self::MissingPrerequisite {
            prerequisite,
            location: location.into(),
        }
    }

    /// Shorthand for a failed external step
    pub fn command_failed(step: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::CommandFailed {
            step: step.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the readiness probe should try again after this error
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Runtime(e) if e.is_transient())
    }

    /// Process exit status for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for user-friendly error messages
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::MissingPrerequisite {
                prerequisite,
                location,
            } => format!("🔍 Missing {}: {}", prerequisite, location),
            Error::UnsupportedPlatform(os) => {
                format!("💻 Unsupported operating system: {}", os)
            }
            Error::CommandFailed { step, reason } => {
                format!("⚡ {} failed: {}", capitalize(step), reason)
            }
            Error::Activation(msg) => format!("🐍 Could not activate the environment: {}", msg),
            Error::RuntimeNotReady {
                base_url,
                attempts,
                ..
            } => format!(
                "⏳ Ollama at {} did not become ready after {} attempts.",
                base_url, attempts
            ),
            Error::Runtime(e) => format!("🤖 Ollama error: {}", e),
            Error::Configuration(msg) => format!("⚙️ Configuration error: {}", msg),
            Error::Io(e) => format!("❌ I/O error: {}", e),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::MissingPrerequisite { prerequisite, .. } => Some(match prerequisite {
                Prerequisite::PythonInterpreter => {
                    "💡 Install Python 3 (with the venv module) and make sure it is on PATH."
                        .to_string()
                }
                Prerequisite::RuntimeBinary | Prerequisite::VirtualEnv => {
                    "💡 Run `covercrew install` first.".to_string()
                }
                Prerequisite::EntryPoint => {
                    "💡 Run from the project directory or pass --project-dir.".to_string()
                }
            }),
            Error::UnsupportedPlatform(_) => {
                Some("💡 Only Linux and macOS are supported.".to_string())
            }
            Error::CommandFailed { .. } => {
                Some("💡 Check the command output above and try again.".to_string())
            }
            Error::Activation(_) => Some(
                "💡 Remove the venv directory and run `covercrew install` again.".to_string(),
            ),
            Error::RuntimeNotReady { .. } => Some(
                "💡 Run `ollama serve` manually to see why it fails to start, or check OLLAMA_HOST."
                    .to_string(),
            ),
            Error::Configuration(_) => Some(
                "💡 Check config/local.toml and COVERCREW_* environment variables.".to_string(),
            ),
            _ => None,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Format an error for display in the CLI
pub fn format_error_for_cli(error: &Error) -> String {
    let mut output = error.user_message();
    output.push('\n');

    if let Some(suggestion) = error.suggestion() {
        output.push('\n');
        output.push_str(&suggestion);
        output.push('\n');
    }

    output
}
