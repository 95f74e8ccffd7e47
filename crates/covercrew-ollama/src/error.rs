//! Error types for covercrew-ollama

use thiserror::Error;

/// Runtime error type
#[derive(Debug, Error)]
pub enum Error {
    /// Runtime binary could not be found
    #[error("runtime binary not found: {0}")]
    NotInstalled(String),

    /// Could not reach the runtime server
    #[error("network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("api error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error text reported by the server
        message: String,
    },

    /// Base URL cannot be used for requests
    #[error("invalid base url: {0}")]
    InvalidUrl(String),

    /// Response body did not match the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Request timed out
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// External command could not be run or exited unsuccessfully
    #[error("`{command}` failed: {reason}")]
    Command {
        /// Command line that was run
        command: String,
        /// Exit status or spawn error
        reason: String,
    },

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the same request may succeed if retried later.
    ///
    /// Connection failures and timeouts are expected while the server is
    /// still starting; 5xx answers are treated the same way.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network(_) | Error::Timeout(_) => true,
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::Network("connection refused".to_string()).is_transient());
        assert!(Error::Timeout(2000).is_transient());
        assert!(Error::Api {
            status: 503,
            message: "starting".to_string()
        }
        .is_transient());

        assert!(!Error::Api {
            status: 404,
            message: "not found".to_string()
        }
        .is_transient());
        assert!(!Error::InvalidResponse("eof".to_string()).is_transient());
        assert!(!Error::InvalidUrl("http://".to_string()).is_transient());
        assert!(!Error::NotInstalled("ollama".to_string()).is_transient());
    }

    #[test]
    fn test_command_error_display() {
        let err = Error::Command {
            command: "ollama pull qwen3:latest".to_string(),
            reason: "exit status: 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`ollama pull qwen3:latest` failed: exit status: 1"
        );
    }
}
