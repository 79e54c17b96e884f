//! Service error taxonomy.
//!
//! Every failure the core can surface is one of the [`ServiceError`] kinds.
//! [`ServiceError::render`] is the single place that decides the status class
//! and the structured payload for each kind.

use serde::Serialize;
use thiserror::Error;

use crate::health::HealthSnapshot;

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("Model '{model_name}' was not found.")]
    ModelNotFound { model_name: String },

    #[error("Model '{model_name}' is not loaded or ready for use.")]
    ModelNotLoaded { model_name: String },

    #[error(
        "Failed to connect to the backend at URL: {endpoint}. Please check if the server is running."
    )]
    BackendUnreachable { endpoint: String },

    #[error("Error during model response generation. {details}")]
    GenerationFailed { details: String },

    /// Health check on an unready model. Carries the full snapshot so the
    /// response body can still report uptime and telemetry.
    #[error("{}", not_ready_message(.model_name.as_deref()))]
    ModelNotReady {
        model_name: Option<String>,
        snapshot: Box<HealthSnapshot>,
    },

    #[error("Unable to retrieve GPU status. {details}")]
    GpuStatusUnavailable { details: String },

    #[error("Service failure: {details}")]
    ServiceFailure { details: String },
}

fn not_ready_message(model_name: Option<&str>) -> String {
    match model_name {
        Some(name) => format!("Model '{}' is not ready or not loaded.", name),
        None => "The model is not ready or not loaded.".to_string(),
    }
}

/// Externally visible outcome class of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    NotFound,
    Unavailable,
    BadGateway,
    Internal,
    /// Non-fatal, still reported as success
    Informational,
}

impl StatusClass {
    pub fn http_status(self) -> u16 {
        match self {
            StatusClass::NotFound => 404,
            StatusClass::Unavailable => 503,
            StatusClass::BadGateway => 502,
            StatusClass::Internal => 500,
            StatusClass::Informational => 200,
        }
    }
}

/// Wire body for an error response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub detail: String,
    pub error_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthSnapshot>,
}

impl ErrorPayload {
    fn new(detail: String, error_type: &'static str) -> Self {
        Self {
            detail,
            error_type,
            model_name: None,
            endpoint: None,
            error_details: None,
            gpu_status: None,
            health: None,
        }
    }
}

impl ServiceError {
    pub fn error_type(&self) -> &'static str {
        match self {
            ServiceError::ModelNotFound { .. } => "model_not_found",
            ServiceError::ModelNotLoaded { .. } => "model_not_loaded",
            ServiceError::BackendUnreachable { .. } => "connection_error",
            ServiceError::GenerationFailed { .. } => "generation_error",
            ServiceError::ModelNotReady { .. } => "model_not_ready",
            ServiceError::GpuStatusUnavailable { .. } => "gpu_status_error",
            ServiceError::ServiceFailure { .. } => "llm_service_error",
        }
    }

    pub fn status_class(&self) -> StatusClass {
        match self {
            ServiceError::ModelNotFound { .. } => StatusClass::NotFound,
            ServiceError::ModelNotLoaded { .. } | ServiceError::ModelNotReady { .. } => {
                StatusClass::Unavailable
            }
            ServiceError::BackendUnreachable { .. } => StatusClass::BadGateway,
            ServiceError::GenerationFailed { .. } | ServiceError::ServiceFailure { .. } => {
                StatusClass::Internal
            }
            ServiceError::GpuStatusUnavailable { .. } => StatusClass::Informational,
        }
    }

    /// Status class and payload for this error.
    pub fn render(&self) -> (StatusClass, ErrorPayload) {
        let mut payload = ErrorPayload::new(self.to_string(), self.error_type());

        match self {
            ServiceError::ModelNotFound { model_name }
            | ServiceError::ModelNotLoaded { model_name } => {
                payload.model_name = Some(model_name.clone());
            }
            ServiceError::BackendUnreachable { endpoint } => {
                payload.endpoint = Some(endpoint.clone());
            }
            ServiceError::GenerationFailed { details } => {
                payload.error_details = Some(details.clone());
            }
            ServiceError::ModelNotReady {
                model_name,
                snapshot,
            } => {
                payload.model_name = model_name.clone();
                payload.health = Some((**snapshot).clone());
            }
            ServiceError::GpuStatusUnavailable { .. } => {
                payload.gpu_status = Some("unavailable");
            }
            ServiceError::ServiceFailure { .. } => {}
        }

        (self.status_class(), payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{HealthSnapshot, HealthStatus};
    use std::collections::HashSet;

    fn snapshot() -> HealthSnapshot {
        HealthSnapshot {
            status: HealthStatus::Degraded,
            uptime_seconds: 1.5,
            model_ready: false,
            model_name: Some("llama3".to_string()),
            device: "cpu".to_string(),
            gpu: None,
        }
    }

    fn every_kind() -> Vec<ServiceError> {
        vec![
            ServiceError::ModelNotFound {
                model_name: "llama3".to_string(),
            },
            ServiceError::ModelNotLoaded {
                model_name: "llama3".to_string(),
            },
            ServiceError::BackendUnreachable {
                endpoint: "http://localhost:11434".to_string(),
            },
            ServiceError::GenerationFailed {
                details: "boom".to_string(),
            },
            ServiceError::ModelNotReady {
                model_name: Some("llama3".to_string()),
                snapshot: Box::new(snapshot()),
            },
            ServiceError::GpuStatusUnavailable {
                details: "nvidia-smi not found".to_string(),
            },
            ServiceError::ServiceFailure {
                details: "task panicked".to_string(),
            },
        ]
    }

    #[test]
    fn every_kind_has_distinct_error_type() {
        let kinds = every_kind();
        let types: HashSet<_> = kinds.iter().map(ServiceError::error_type).collect();
        assert_eq!(types.len(), kinds.len());
    }

    #[test]
    fn status_mapping() {
        let statuses: Vec<u16> = every_kind()
            .iter()
            .map(|e| e.status_class().http_status())
            .collect();
        assert_eq!(statuses, vec![404, 503, 502, 500, 503, 200, 500]);
    }

    #[test]
    fn model_kinds_carry_model_name() {
        for err in every_kind() {
            let (_, payload) = err.render();
            match err {
                ServiceError::ModelNotFound { .. }
                | ServiceError::ModelNotLoaded { .. }
                | ServiceError::ModelNotReady { .. } => {
                    assert_eq!(payload.model_name.as_deref(), Some("llama3"))
                }
                _ => assert!(payload.model_name.is_none()),
            }
        }
    }

    #[test]
    fn connection_payload_has_endpoint() {
        let err = ServiceError::BackendUnreachable {
            endpoint: "http://daemon:11434".to_string(),
        };
        let (class, payload) = err.render();
        assert_eq!(class, StatusClass::BadGateway);
        assert_eq!(payload.endpoint.as_deref(), Some("http://daemon:11434"));
        assert!(payload.detail.contains("http://daemon:11434"));
    }

    #[test]
    fn payload_serializes_without_empty_fields() {
        let (_, payload) = ServiceError::GenerationFailed {
            details: "bad shape".to_string(),
        }
        .render();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "detail": "Error during model response generation. bad shape",
                "error_type": "generation_error",
                "error_details": "bad shape"
            })
        );
    }

    #[test]
    fn not_ready_payload_embeds_snapshot() {
        let (_, payload) = every_kind()[4].render();
        let health = payload.health.unwrap();
        assert_eq!(health.uptime_seconds, 1.5);
        assert!(!health.model_ready);
    }

    #[test]
    fn not_ready_message_without_name() {
        let err = ServiceError::ModelNotReady {
            model_name: None,
            snapshot: Box::new(snapshot()),
        };
        assert_eq!(err.to_string(), "The model is not ready or not loaded.");
    }

    #[test]
    fn gpu_failure_is_informational() {
        let (class, payload) = ServiceError::GpuStatusUnavailable {
            details: "no device".to_string(),
        }
        .render();
        assert_eq!(class.http_status(), 200);
        assert_eq!(payload.gpu_status, Some("unavailable"));
    }
}
