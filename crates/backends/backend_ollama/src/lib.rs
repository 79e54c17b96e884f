//! llmapi_backend_ollama - Ollama daemon client
//!
//! Talks to a running Ollama-compatible daemon over HTTP:
//! - `GET /api/tags` for the model catalog
//! - `POST /api/chat` for non-streaming chat
//!
//! Connection pooling is owned by the inner `reqwest::Client`.

use async_trait::async_trait;
use llmapi_backend_api::{
    catalog_from_listing, BackendError, ChatBackend, ChatMessage, ChatReply, ModelCatalogEntry,
};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Default address of a local Ollama daemon.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Connection settings for [`OllamaBackend`]
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

pub struct OllamaBackend {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaBackend {
    pub fn new(config: OllamaConfig) -> Result<Self, BackendError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BackendError::Connection {
                endpoint: base_url.clone(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self, err: reqwest::Error) -> BackendError {
        if err.is_decode() {
            BackendError::Decode {
                endpoint: self.base_url.clone(),
                reason: err.to_string(),
            }
        } else {
            BackendError::Connection {
                endpoint: self.base_url.clone(),
                reason: err.to_string(),
            }
        }
    }

    async fn read_json(&self, request: reqwest::RequestBuilder) -> Result<Value, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                endpoint: self.base_url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| self.transport_error(e))
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn list_models(&self) -> Result<Vec<ModelCatalogEntry>, BackendError> {
        let listing = self.read_json(self.http.get(self.url("/api/tags"))).await?;
        tracing::debug!("Model listing from {}: {}", self.base_url, listing);

        Ok(catalog_from_listing(&listing))
    }

    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<ChatReply, BackendError> {
        let request = OllamaChatRequest {
            model,
            messages,
            stream: false,
        };

        let reply = self
            .read_json(self.http.post(self.url("/api/chat")).json(&request))
            .await?;
        tracing::debug!("Chat reply from {}: {}", self.base_url, reply);

        Ok(ChatReply::decode(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let backend = OllamaBackend::new(OllamaConfig {
            base_url: "http://localhost:11434/".to_string(),
            ..OllamaConfig::default()
        })
        .unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:11434");
        assert_eq!(backend.url("/api/tags"), "http://localhost:11434/api/tags");
    }

    #[test]
    fn chat_request_is_non_streaming() {
        let messages = [ChatMessage::user("hello")];
        let body = serde_json::to_value(OllamaChatRequest {
            model: "llama3",
            messages: &messages,
            stream: false,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "llama3",
                "messages": [{"role": "user", "content": "hello"}],
                "stream": false
            })
        );
    }
}
