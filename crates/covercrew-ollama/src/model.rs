//! Model references
//!
//! Ollama names models `name:tag` and treats a missing tag as `latest`,
//! so `qwen3` and `qwen3:latest` are the same registry entry.

use std::fmt;

/// Tag assumed when a reference has none
pub const DEFAULT_TAG: &str = "latest";

/// A parsed `name[:tag]` model reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelRef {
    name: String,
    tag: String,
}

impl ModelRef {
    /// Parse a model reference.
    ///
    /// The tag separator is the last `:` after the last `/`, so a
    /// registry host with a port (`host:5000/ns/model`) is not mistaken
    /// for a tag. Names compare case-insensitively, like the registry.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let name_start = raw.rfind('/').map(|i| i + 1).unwrap_or(0);

        let (name, tag) = match raw[name_start..].rfind(':') {
            Some(idx) => {
                let split = name_start + idx;
                (&raw[..split], &raw[split + 1..])
            }
            None => (raw, ""),
        };

        let tag = if tag.is_empty() { DEFAULT_TAG } else { tag };

        Self {
            name: name.to_ascii_lowercase(),
            tag: tag.to_ascii_lowercase(),
        }
    }

    /// Model name without tag
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag (`latest` when none was given)
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Whether an installed registry entry is this model
    pub fn matches(&self, installed: &str) -> bool {
        *self == Self::parse(installed)
    }

    /// Whether any of the installed entries is this model
    pub fn is_present_in<S: AsRef<str>>(&self, installed: &[S]) -> bool {
        installed.iter().any(|m| self.matches(m.as_ref()))
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}

impl From<&str> for ModelRef {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}
