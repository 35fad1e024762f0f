//! Axum router: maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};

use crate::state::SharedState;
use crate::handlers::{
    health::health,
    queue::api_queue,
    patients::{create_patient, get_patient, retriage_patient, mark_seen, set_profile},
    prompt::prompt,
    triage::triage,
};
use crate::sse::sse_handler;

/// Build and return the full Axum router.
pub fn router_with_state(shared: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))

        // Classification service
        .route("/triage", post(triage))
        .route("/llm/prompt", post(prompt))

        // SSE streaming
        .route("/api/events", get(sse_handler))

        // Desk API
        .route("/api/queue",                   get(api_queue))
        .route("/api/patients",                post(create_patient))
        .route("/api/patients/{id}",           get(get_patient))
        .route("/api/patients/{id}/retriage",  post(retriage_patient))
        .route("/api/patients/{id}/seen",      post(mark_seen))
        .route("/api/patients/{id}/profile",   put(set_profile))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
