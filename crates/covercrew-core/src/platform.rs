//! Supported OS families

use crate::error::{Error, Result};
use covercrew_ollama::InstallMethod;
use std::fmt;

/// Homebrew formula for the runtime
const HOMEBREW_FORMULA: &str = "ollama";

/// OS family the lifecycle runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    /// Linux (runtime installed with the official script)
    Linux,
    /// macOS (runtime installed with Homebrew)
    MacOs,
    /// Anything else; carries the OS name for diagnostics
    Unsupported(String),
}

impl Platform {
    /// Platform this binary was built for
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS name as reported by `std::env::consts::OS`
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Self::Linux,
            "macos" => Self::MacOs,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Whether the lifecycle can run here
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// Fail with `UnsupportedPlatform` unless this is Linux or macOS
    pub fn ensure_supported(&self) -> Result<()> {
        match self {
            Self::Unsupported(os) => Err(Error::UnsupportedPlatform(os.clone())),
            _ => Ok(()),
        }
    }

    /// How the runtime is installed on this platform
    pub fn install_method(&self, script_url: &str) -> Result<InstallMethod> {
        match self {
            Self::Linux => Ok(InstallMethod::script(script_url)),
            Self::MacOs => Ok(InstallMethod::homebrew(HOMEBREW_FORMULA)),
            Self::Unsupported(os) => Err(Error::UnsupportedPlatform(os.clone())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "Linux"),
            Self::MacOs => write!(f, "macOS"),
            Self::Unsupported(os) => write!(f, "{} (unsupported)", os),
        }
    }
}
