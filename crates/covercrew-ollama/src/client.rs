//! Ollama HTTP API client
//!
//! Only the read-only endpoints the lifecycle needs: the version endpoint
//! doubles as the readiness probe and the tags endpoint lists the local
//! model registry.

use crate::error::{Error, Result};
use crate::types::{ApiErrorBody, OllamaConfig, TagsResponse, VersionResponse};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

/// Client for a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a new client
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        match reqwest::Url::parse(&base_url) {
            Ok(url) if url.host_str().is_some_and(|host| !host.is_empty()) => {}
            Ok(_) => return Err(Error::InvalidUrl(format!("{}: missing host", base_url))),
            Err(e) => return Err(Error::InvalidUrl(format!("{}: {}", base_url, e))),
        }

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout,
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Server version; succeeds only once the server accepts requests
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn version(&self) -> Result<String> {
        let version: VersionResponse = self.get_json("/api/version").await?;
        debug!(version = %version.version, "Runtime answered version probe");
        Ok(version.version)
    }

    /// Names (with tags) of all models in the local registry
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let tags: TagsResponse = self.get_json("/api/tags").await?;
        let models: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        debug!(count = models.len(), "Listed local models");
        Ok(models)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(format!("{}: {}", path, e)))
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout(self.timeout.as_millis() as u64)
        } else if e.is_builder() {
            Error::InvalidUrl(format!("{}: {}", self.base_url, e))
        } else if e.is_connect() {
            Error::Network(format!(
                "Failed to connect to Ollama at {}. Is it running?",
                self.base_url
            ))
        } else {
            Error::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    /// Serve `app` on an ephemeral port and return its base URL
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: &str) -> OllamaClient {
        OllamaClient::new(&OllamaConfig::new().with_base_url(base_url)).unwrap()
    }

    #[tokio::test]
    async fn test_version_and_tags() {
        let app = Router::new()
            .route("/api/version", get(|| async { Json(json!({"version": "0.6.2"})) }))
            .route(
                "/api/tags",
                get(|| async {
                    Json(json!({
                        "models": [
                            {"name": "qwen3:latest", "size": 5200000000u64},
                            {"name": "mxbai-embed-large:latest"}
                        ]
                    }))
                }),
            );
        let client = client_for(&serve(app).await);

        assert_eq!(client.version().await.unwrap(), "0.6.2");
        assert_eq!(
            client.list_models().await.unwrap(),
            vec!["qwen3:latest", "mxbai-embed-large:latest"]
        );
    }

    #[tokio::test]
    async fn test_api_error_body_is_reported() {
        let app = Router::new().route(
            "/api/tags",
            get(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"error": "server is loading"})),
                )
            }),
        );
        let client = client_for(&serve(app).await);

        let err = client.list_models().await.unwrap_err();
        match &err {
            Error::Api { status, message } => {
                assert_eq!(*status, 503);
                assert_eq!(message, "server is loading");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_unexpected_body_is_invalid_response() {
        let app = Router::new().route("/api/version", get(|| async { "not json" }));
        let client = client_for(&serve(app).await);

        let err = client.version().await.unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_client_trims_base_url() {
        let mut config = OllamaConfig::default();
        config.base_url = "http://localhost:11434/".to_string();

        let client = OllamaClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_blank_base_url_is_rejected() {
        for raw in ["", "   ", "http://"] {
            let config = OllamaConfig::new().with_base_url(raw);
            let err = OllamaClient::new(&config).unwrap_err();
            assert!(matches!(err, Error::InvalidUrl(_)), "{raw:?}: {err}");
            assert!(!err.is_transient());
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transient() {
        // Port 9 (discard) is closed on any sane test machine
        let config = OllamaConfig::new()
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));
        let client = OllamaClient::new(&config).unwrap();

        let err = client.version().await.unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err}");
    }
}
