//! Ollama-backed [`Runtime`]

use super::{Runtime, ServeHandle};
use crate::error::{Error, Result};
use crate::platform::Platform;
use async_trait::async_trait;
use covercrew_ollama::{OllamaCli, OllamaClient, OllamaConfig, ServeProcess};
use std::time::Duration;

/// Runtime driven through the `ollama` binary and its HTTP API
#[derive(Debug, Clone)]
pub struct OllamaRuntime {
    cli: OllamaCli,
    client: OllamaClient,
    install_script_url: String,
}

impl OllamaRuntime {
    /// Create from configuration
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        Ok(Self {
            cli: OllamaCli::new(config),
            client: OllamaClient::new(config)?,
            install_script_url: config.install_script_url.clone(),
        })
    }

    /// HTTP client for read-only diagnostics
    pub fn client(&self) -> &OllamaClient {
        &self.client
    }

    /// Command wrapper
    pub fn cli(&self) -> &OllamaCli {
        &self.cli
    }
}

#[async_trait]
impl Runtime for OllamaRuntime {
    fn binary(&self) -> String {
        self.cli.binary().to_string()
    }

    async fn is_installed(&self) -> bool {
        self.cli.locate().await.is_some()
    }

    async fn install(&self, platform: &Platform) -> Result<()> {
        let method = platform.install_method(&self.install_script_url)?;
        method
            .run()
            .await
            .map_err(|e| Error::command_failed("install Ollama", e))
    }

    async fn is_running(&self) -> bool {
        self.cli.is_running().await
    }

    fn spawn(&self) -> Result<Box<dyn ServeHandle>> {
        let process = self.cli.serve()?;
        Ok(Box::new(process))
    }

    async fn probe(&self) -> Result<String> {
        Ok(self.client.version().await?)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(self.client.list_models().await?)
    }

    async fn pull_model(&self, model: &str) -> Result<()> {
        self.cli
            .pull(model)
            .await
            .map_err(|e| Error::command_failed(format!("pull {}", model), e))
    }

    fn base_url(&self) -> String {
        self.client.base_url().to_string()
    }
}

#[async_trait]
impl ServeHandle for ServeProcess {
    fn pid(&self) -> Option<u32> {
        ServeProcess::pid(self)
    }

    async fn terminate(&mut self, grace: Duration) -> Result<()> {
        Ok(ServeProcess::terminate(self, grace).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_runtime() -> OllamaRuntime {
        let config = OllamaConfig::new()
            .with_binary("no-such-ollama-7c1f")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));
        OllamaRuntime::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_missing_binary_is_not_installed() {
        let runtime = missing_runtime();
        assert!(!runtime.is_installed().await);
        assert!(!runtime.is_running().await);
        assert_eq!(runtime.base_url(), "http://127.0.0.1:9");
        assert_eq!(runtime.binary(), "no-such-ollama-7c1f");
    }

    #[tokio::test]
    async fn test_pull_failure_is_command_failed() {
        let err = missing_runtime().pull_model("qwen3:latest").await.unwrap_err();
        match err {
            Error::CommandFailed { step, .. } => assert_eq!(step, "pull qwen3:latest"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_probe_unreachable_is_transient() {
        let err = missing_runtime().probe().await.unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_install_on_unsupported_platform() {
        let err = missing_runtime()
            .install(&Platform::from_os("windows"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform(_)));
    }

    #[tokio::test]
    async fn test_spawn_missing_binary_fails() {
        assert!(missing_runtime().spawn().is_err());
    }
}
