use axum::{extract::State, Json};
use llmapi_core::HealthSnapshot;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub model_ready: bool,
}

/// Liveness: always 200, reports readiness as a field.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        model_ready: state.session.is_loaded(),
    })
}

/// Readiness: 503 with the snapshot in the body while the model is not loaded.
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthSnapshot>, ApiError> {
    Ok(Json(state.health.get_status().await?))
}
