//! Liveness check.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::SharedState;

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "classifier": state.classifier_mode.as_str(),
        "patients": state.desk.store().len().await,
    }))
}
