//! Lifecycle of the one backend model this process serves.

use llmapi_backend_api::{BackendError, ChatBackend, ChatMessage, ModelCatalogEntry};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ServiceError;
use crate::normalize::{normalize, ChatResult};

pub struct ModelSession {
    model_name: String,
    backend: Arc<dyn ChatBackend>,
    loaded: AtomicBool,
}

impl ModelSession {
    pub fn new(model_name: impl Into<String>, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            model_name: model_name.into(),
            backend,
            loaded: AtomicBool::new(false),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn backend_endpoint(&self) -> &str {
        self.backend.endpoint()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Verify the configured model against the daemon catalog and mark the
    /// session loaded. An empty catalog is accepted.
    pub async fn initialize(&self) -> Result<(), ServiceError> {
        let catalog = self.backend.list_models().await.map_err(|e| match e {
            BackendError::Connection { .. } => {
                tracing::error!("Backend unreachable during initialization: {}", e);
                ServiceError::BackendUnreachable {
                    endpoint: self.backend_endpoint().to_string(),
                }
            }
            other => {
                tracing::error!("Unexpected failure during initialization: {}", other);
                ServiceError::GenerationFailed {
                    details: format!("Client initialization failed: {}", other),
                }
            }
        })?;

        let names = expanded_names(&catalog);
        tracing::info!("Available models: {:?}", names);

        if !names.is_empty() && !catalog_matches(&self.model_name, &names) {
            return Err(ServiceError::ModelNotFound {
                model_name: self.model_name.clone(),
            });
        }

        self.loaded.store(true, Ordering::Release);
        tracing::info!("Model {} initialized", self.model_name);
        Ok(())
    }

    /// Run one chat turn with `prompt` as the only user message.
    pub async fn generate(&self, prompt: &str) -> Result<ChatResult, ServiceError> {
        if !self.is_loaded() {
            return Err(ServiceError::ModelNotLoaded {
                model_name: self.model_name.clone(),
            });
        }

        let reply = self
            .backend
            .chat(&self.model_name, &[ChatMessage::user(prompt)])
            .await
            .map_err(|e| {
                tracing::error!("Chat call failed: {}", e);
                ServiceError::GenerationFailed {
                    details: e.to_string(),
                }
            })?;

        normalize(&reply).map_err(|e| {
            tracing::error!("{}", e);
            ServiceError::GenerationFailed {
                details: e.to_string(),
            }
        })
    }
}

/// Raw names plus their base names.
fn expanded_names(catalog: &[ModelCatalogEntry]) -> HashSet<&str> {
    catalog
        .iter()
        .flat_map(|entry| [entry.raw_name.as_str(), entry.base_name()])
        .collect()
}

fn catalog_matches(model_name: &str, names: &HashSet<&str>) -> bool {
    names.contains(model_name) || names.contains(format!("{}:latest", model_name).as_str())
}

/// Whether `model_name` is served by a daemon reporting `catalog`.
pub fn catalog_accepts(model_name: &str, catalog: &[ModelCatalogEntry]) -> bool {
    let names = expanded_names(catalog);
    names.is_empty() || catalog_matches(model_name, &names)
}
