//! Covercrew Ollama - local LLM runtime plumbing
//!
//! Everything covercrew needs to drive a local Ollama installation:
//! - Client: HTTP API (`/api/version`, `/api/tags`)
//! - Command: the `ollama` binary (`serve`, `pull`) and PATH lookup
//! - Process: background serve process, lookup by name, termination
//! - Install: platform install methods (install script, Homebrew)
//! - Model: model reference parsing and `:latest` aware matching

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod command;
pub mod error;
pub mod install;
pub mod model;
pub mod process;
pub mod types;

pub use client::OllamaClient;
pub use command::{which, OllamaCli};
pub use error::{Error, Result};
pub use install::InstallMethod;
pub use model::ModelRef;
pub use process::{find_pid, ServeProcess};
pub use types::{
    normalize_base_url, OllamaConfig, DEFAULT_BASE_URL, DEFAULT_BINARY, DEFAULT_INSTALL_SCRIPT_URL,
};
