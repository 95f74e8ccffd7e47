//! Configuration and API types

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default Ollama API URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default runtime binary name
pub const DEFAULT_BINARY: &str = "ollama";

/// Official install script (Linux)
pub const DEFAULT_INSTALL_SCRIPT_URL: &str = "https://ollama.com/install.sh";

/// Port the runtime listens on when `OLLAMA_HOST` names only a host
const DEFAULT_PORT: u16 = 11434;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Binary name or path (default: `ollama`)
    pub binary: String,
    /// API base URL (default: http://localhost:11434)
    pub base_url: String,
    /// Per-request HTTP timeout
    pub timeout: Duration,
    /// Install script used on Linux
    pub install_script_url: String,
    /// Where `ollama serve` output goes; discarded when unset
    pub log_file: Option<PathBuf>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(5),
            install_script_url: DEFAULT_INSTALL_SCRIPT_URL.to_string(),
            log_file: None,
        }
    }
}

impl OllamaConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the binary name or path
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(url.as_ref());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the install script URL
    #[must_use]
    pub fn with_install_script_url(mut self, url: impl Into<String>) -> Self {
        self.install_script_url = url.into();
        self
    }

    /// Send `ollama serve` output to a file
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }
}

/// Turn an `OLLAMA_HOST`-style value into a base URL.
///
/// Accepts `host`, `host:port` or a full URL and strips trailing slashes.
/// A bare host gets `http://` and port 11434, the way the runtime reads
/// `OLLAMA_HOST`; a URL with a scheme but no port keeps the scheme's own
/// port (80 for `http`, 443 for `https`).
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let (scheme, rest, default_port) = match trimmed.split_once("://") {
        Some((scheme, rest)) => {
            let port = if scheme.eq_ignore_ascii_case("https") {
                443
            } else {
                80
            };
            (scheme, rest, port)
        }
        None => ("http", trimmed, DEFAULT_PORT),
    };

    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    // Skip the bracketed part of an IPv6 literal before looking for a port
    let port_search_from = authority.rfind(']').unwrap_or(0);
    let has_port = authority[port_search_from..].contains(':');

    if has_port || authority.is_empty() {
        format!("{}://{}{}", scheme, authority, path)
    } else {
        format!("{}://{}:{}{}", scheme, authority, default_port, path)
    }
}

// ============================================================================
// API Types
// ============================================================================

/// `GET /api/version`
#[derive(Debug, Deserialize)]
pub struct VersionResponse {
    /// Server version string
    pub version: String,
}

/// `GET /api/tags`
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    /// Locally available models
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

/// One entry of the local model registry
#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    /// Model name including tag (e.g. `qwen3:latest`)
    pub name: String,
    /// Size on disk in bytes
    #[serde(default)]
    pub size: u64,
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OllamaConfig::default();

        assert_eq!(config.binary, "ollama");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.install_script_url, DEFAULT_INSTALL_SCRIPT_URL);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = OllamaConfig::new()
            .with_binary("/opt/ollama/bin/ollama")
            .with_base_url("http://10.0.0.5:11434/")
            .with_timeout(Duration::from_secs(2))
            .with_log_file("ollama.log");

        assert_eq!(config.binary, "/opt/ollama/bin/ollama");
        assert_eq!(config.base_url, "http://10.0.0.5:11434");
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.log_file, Some(PathBuf::from("ollama.log")));
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("127.0.0.1"), "http://127.0.0.1:11434");
        assert_eq!(normalize_base_url("0.0.0.0:8080"), "http://0.0.0.0:8080");
        assert_eq!(
            normalize_base_url("https://ollama.internal/"),
            "https://ollama.internal:443"
        );
        assert_eq!(normalize_base_url("http://gpu-box"), "http://gpu-box:80");
        assert_eq!(
            normalize_base_url("http://gpu-box/ollama/"),
            "http://gpu-box:80/ollama"
        );
        assert_eq!(
            normalize_base_url("http://localhost:11434"),
            "http://localhost:11434"
        );
        assert_eq!(normalize_base_url("[::1]"), "http://[::1]:11434");
        assert_eq!(normalize_base_url("[::1]:9000"), "http://[::1]:9000");
    }

    #[test]
    fn test_tags_response_parsing() {
        let body = r#"{"models":[{"name":"qwen3:latest","size":5200000000,"digest":"abc"},{"name":"mxbai-embed-large:latest"}]}"#;
        let tags: TagsResponse = serde_json::from_str(body).unwrap();

        assert_eq!(tags.models.len(), 2);
        assert_eq!(tags.models[0].name, "qwen3:latest");
        assert_eq!(tags.models[0].size, 5_200_000_000);
        assert_eq!(tags.models[1].size, 0);
    }

    #[test]
    fn test_empty_tags_response() {
        let tags: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(tags.models.is_empty());
    }
}
