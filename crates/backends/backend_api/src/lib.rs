//! llmapi_backend_api - Backend client traits and wire types
//!
//! This crate defines the contract for inference daemon clients.
//! Each backend (ollama, test doubles, etc.) implements [`ChatBackend`].
//! It knows nothing about HTTP status policy or the service error taxonomy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Chat message sent to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One model identifier as reported by the backend catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelCatalogEntry {
    pub raw_name: String,
}

impl ModelCatalogEntry {
    pub fn new(raw_name: impl Into<String>) -> Self {
        Self {
            raw_name: raw_name.into(),
        }
    }

    /// The identifier with its `:tag` suffix removed.
    pub fn base_name(&self) -> &str {
        self.raw_name
            .split_once(':')
            .map_or(self.raw_name.as_str(), |(base, _)| base)
    }
}

/// Build catalog entries from a model listing document.
///
/// Accepts `{"models": [...]}` or a bare array. Entries may be plain strings
/// or objects named by the first non-empty of `name`, `model`, `digest`.
/// Anything else yields an empty catalog.
pub fn catalog_from_listing(listing: &Value) -> Vec<ModelCatalogEntry> {
    let entries = match listing {
        Value::Object(map) => map.get("models").and_then(Value::as_array),
        Value::Array(items) => Some(items),
        _ => None,
    };

    entries
        .into_iter()
        .flatten()
        .filter_map(entry_name)
        .map(ModelCatalogEntry::new)
        .collect()
}

fn entry_name(entry: &Value) -> Option<String> {
    match entry {
        Value::String(name) if !name.is_empty() => Some(name.clone()),
        Value::Object(map) => ["name", "model", "digest"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(Value::as_str))
            .find(|name| !name.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Assistant message decoded into its typed form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssistantMessage {
    pub role: String,
    pub content: String,
}

/// The `message` part of a typed reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReplyMessage {
    Typed(AssistantMessage),
    Mapping(Map<String, Value>),
}

/// Chat reply decoded into typed fields
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TypedChatReply {
    #[serde(default)]
    pub model: Option<String>,
    pub message: ReplyMessage,
    #[serde(default)]
    pub done: Option<bool>,
}

/// Raw result of a chat call.
///
/// Backends hand back whatever shape they received; extracting the assistant
/// text is the caller's job.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    /// The JSON document as it came off the wire.
    Document(Value),
    /// A reply that decoded into typed fields.
    Typed(TypedChatReply),
}

impl ChatReply {
    /// Decode into the typed shape when possible, keeping the raw document otherwise.
    pub fn decode(value: Value) -> Self {
        match TypedChatReply::deserialize(&value) {
            Ok(typed) => ChatReply::Typed(typed),
            Err(_) => ChatReply::Document(value),
        }
    }
}

/// Errors a backend client can report
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connect, transport or timeout failure.
    #[error("connection failed to {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    /// Non-2xx response.
    #[error("HTTP {status} from {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Body could not be decoded.
    #[error("invalid response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl BackendError {
    pub fn is_connection(&self) -> bool {
        matches!(self, BackendError::Connection { .. })
    }
}

/// The contract every inference daemon client implements
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Base URL of the daemon
    fn endpoint(&self) -> &str;

    /// List the models the daemon currently serves
    async fn list_models(&self) -> Result<Vec<ModelCatalogEntry>, BackendError>;

    /// Run a non-streaming chat call
    async fn chat(&self, model: &str, messages: &[ChatMessage])
        -> Result<ChatReply, BackendError>;
}
