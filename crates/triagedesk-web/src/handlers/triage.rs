//! The classification service endpoint, backed by the configured LLM.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use triagedesk_llm::{ClassifyRequest, ClassifyResponse};

use crate::error::ApiError;
use crate::state::SharedState;

/// POST /triage
pub async fn triage(
    State(state): State<SharedState>,
    body: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let Json(req) = body?;
    if req.complaint.trim().is_empty() {
        return Err(ApiError::Validation("complaint must not be empty".to_string()));
    }
    let service = state
        .triage_service
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("no LLM backend configured".to_string()))?;

    Ok(Json(service.classify(&req).await?))
}
