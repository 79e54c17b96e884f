use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use llmapi_core::ServiceError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(alias = "mensagem")]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    if request.message.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "message must not be empty".to_string(),
        ));
    }

    // Detached from the connection: a client hanging up does not cancel the
    // call or its metrics.
    let result = tokio::spawn(async move {
        let started = Instant::now();
        let result = state.session.generate(&request.message).await;
        state.metrics.observe_request(started.elapsed());
        state.refresh_system_metrics();
        result
    })
    .await
    .map_err(|e| ServiceError::ServiceFailure {
        details: format!("generation task failed: {}", e),
    })??;

    Ok(Json(ChatResponse {
        response: result.into_text(),
    }))
}
